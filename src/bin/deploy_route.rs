use std::{path::Path, process};

use anyhow::{bail, Result};
use dropship::{
    chunk::{decode_command, encode_chunks, push_chunks},
    fs::read_payload,
    progress::ProgressView,
    shell::RemoteShell,
};

const DESTINATION: &str = "root@192.168.0.125";
const LOCAL_SOURCE: &str = "../server/src/routes/mongodb.js";
const REMOTE_DEST: &str = "/usr/local/hestia/web_v2/server/src/routes/mongodb.js";
const STAGING: &str = "/tmp/mongodb_b64.txt";

fn main() {
    if let Err(err) = deploy() {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn deploy() -> Result<()> {
    let content = read_payload(Path::new(LOCAL_SOURCE))?;
    println!("Read {LOCAL_SOURCE} ({} bytes)", content.len());

    let chunks = encode_chunks(&content);
    let shell = RemoteShell::new(DESTINATION);

    let total = chunks.len();
    let mut progress = ProgressView::new(format!("Transferring {total} chunks"));
    let mut sent = 0;

    let staged = push_chunks(&chunks, STAGING, |command| {
        let output = shell.run(command);
        if output.as_ref().is_ok_and(|output| output.ok()) {
            sent += 1;
            progress.report((sent, total), None);
        }
        output
    });

    match &staged {
        Ok(()) => progress.success(Some("all chunks staged")),
        Err(err) => progress.failure(Some(&err.to_string())),
    }
    staged?;

    let decoded = shell.run(&decode_command(STAGING, REMOTE_DEST))?;
    if !decoded.ok() {
        bail!(
            "remote decode failed with exit code {}: {}",
            decoded.exit_code,
            decoded.stderr.trim()
        );
    }

    println!("Transfer success");
    Ok(())
}
