use std::{fs::File, io, path::Path};

use anyhow::{Context, Result};
use ssh2::{OpenFlags, OpenType};

use super::SSHSession;

const REMOTE_MODE: i32 = 0o644;

/// Uploads one local file over SFTP, truncating whatever already sits at the
/// destination. Returns the number of bytes written.
pub fn sftp_put(session: &SSHSession, local_source: &Path, remote_dest: &Path) -> Result<u64> {
    let mut local = File::open(local_source)
        .with_context(|| format!("could not open {}", local_source.display()))?;

    let sftp = session
        .raw()
        .sftp()
        .context("could not open an SFTP channel")?;
    let mut remote = sftp
        .open_mode(
            remote_dest,
            OpenFlags::CREATE | OpenFlags::WRITE | OpenFlags::TRUNCATE,
            REMOTE_MODE,
            OpenType::File,
        )
        .with_context(|| format!("could not create {}", remote_dest.display()))?;

    let written = io::copy(&mut local, &mut remote)
        .with_context(|| format!("upload to {} interrupted", remote_dest.display()))?;

    Ok(written)
}
