use std::{fs::File, io::Read, path::Path};

use anyhow::{bail, Context, Result};

/// Reads the payload into memory, refusing early when the path is missing so
/// the caller never opens a connection for nothing.
pub fn read_payload(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        bail!("{} not found", path.display());
    }

    let mut content = Vec::new();
    File::open(path)
        .and_then(|mut file| file.read_to_end(&mut content))
        .with_context(|| format!("could not read {}", path.display()))?;

    Ok(content)
}
