use std::path::Path;

use anyhow::Result;
use dropship::{fs::read_payload, progress::ProgressView, shell::RemoteShell};

const DESTINATION: &str = "root@192.168.0.125";
const LOCAL_ARCHIVE: &str = "dist.zip";
const REMOTE_ARCHIVE: &str = "/tmp/dist.zip";

fn main() {
    // Failures are reported on stderr, the exit status stays 0.
    if let Err(err) = transfer() {
        eprintln!("An error occurred: {err:#}");
    }
}

fn transfer() -> Result<()> {
    if !Path::new(LOCAL_ARCHIVE).exists() {
        eprintln!("{LOCAL_ARCHIVE} not found, nothing to transfer");
        return Ok(());
    }

    let data = read_payload(Path::new(LOCAL_ARCHIVE))?;

    let mut progress = ProgressView::new(format!(
        "Transferring {} bytes to {DESTINATION}:{REMOTE_ARCHIVE}",
        data.len()
    ));

    let shell = RemoteShell::new(DESTINATION);
    match shell.pipe(&format!("cat > {REMOTE_ARCHIVE}"), &data) {
        Ok(0) => progress.success(None),
        Ok(code) => progress.failure(Some(&format!("exit code {code}"))),
        Err(err) => {
            progress.failure(None);
            return Err(err);
        }
    }

    Ok(())
}
