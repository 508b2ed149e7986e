use std::{path::Path, process};

use anyhow::{bail, Result};
use dropship::ssh::{host_params, transfer::sftp_put, SSHSession};

const HOST: &str = "192.168.0.125";
const USER: &str = "root";
const LOCAL_SOURCE: &str = "../server/src/routes/mongodb.js";
const REMOTE_DEST: &str = "/usr/local/hestia/web_v2/server/src/routes/mongodb.js";

fn main() {
    if let Err(err) = upload() {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn upload() -> Result<()> {
    let local = Path::new(LOCAL_SOURCE);
    if !local.exists() {
        bail!("{LOCAL_SOURCE} not found");
    }

    let params = host_params(HOST)?;
    let session = SSHSession::open(HOST, USER, &params)?;

    println!("Uploading {LOCAL_SOURCE} to {HOST}:{REMOTE_DEST}");
    let written = sftp_put(&session, local, Path::new(REMOTE_DEST))?;
    println!("Upload successful ({written} bytes)");

    Ok(())
}
