use std::{
    io::Write,
    process::{Command, Stdio},
};

use anyhow::{Context, Result};

/// Captured result of one remote command.
#[derive(Debug)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn ok(&self) -> bool {
        self.exit_code == 0
    }
}

/// The system `ssh` client, pointed at one fixed `user@host` destination.
/// Authentication and host configuration are whatever the client is already
/// set up with.
pub struct RemoteShell {
    program: String,
    destination: String,
}

impl RemoteShell {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            program: "ssh".into(),
            destination: destination.into(),
        }
    }

    /// Runs `ssh <destination> <command>` to completion and captures its
    /// output. The command line is a single argv entry; quoting inside it is
    /// the remote shell's problem.
    pub fn run(&self, command: &str) -> Result<ExecOutput> {
        let output = Command::new(&self.program)
            .arg(&self.destination)
            .arg(command)
            .output()
            .with_context(|| format!("could not spawn {}", self.program))?;

        Ok(ExecOutput {
            // None means the child was killed by a signal
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Runs `ssh <destination> <command>` with `data` streamed to its stdin,
    /// returning the exit code once the remote side is done reading.
    pub fn pipe(&self, command: &str, data: &[u8]) -> Result<i32> {
        let mut child = Command::new(&self.program)
            .arg(&self.destination)
            .arg(command)
            .stdin(Stdio::piped())
            .spawn()
            .with_context(|| format!("could not spawn {}", self.program))?;

        let mut stdin = child.stdin.take().context("child stdin was not piped")?;
        stdin
            .write_all(data)
            .context("writing to the remote stdin")?;
        // the remote command only finishes once it sees EOF
        drop(stdin);

        let status = child.wait().context("waiting for the transfer")?;
        Ok(status.code().unwrap_or(-1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{decode_command, encode_chunks, push_chunks};
    use std::fs;
    use tempfile::TempDir;

    // `sh -c <command>` has the same argv shape as `ssh <dest> <command>`,
    // so the transport can be exercised against the local filesystem.
    fn local_shell() -> RemoteShell {
        RemoteShell {
            program: "sh".into(),
            destination: "-c".into(),
        }
    }

    #[test]
    fn run_reports_exit_code_and_output() {
        let output = local_shell().run("echo out; echo err >&2; exit 3").unwrap();

        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert!(!output.ok());
    }

    #[test]
    fn missing_program_is_an_error() {
        let shell = RemoteShell {
            program: "dropship-test-no-such-program".into(),
            destination: "-c".into(),
        };

        assert!(shell.run("true").is_err());
    }

    #[test]
    fn pipe_writes_stdin_byte_identical() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("blob");
        let data: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();

        let code = local_shell()
            .pipe(&format!("cat > {}", dest.display()), &data)
            .unwrap();

        assert_eq!(code, 0);
        assert_eq!(fs::read(&dest).unwrap(), data);
    }

    #[test]
    fn chunked_staging_round_trips() {
        let dir = TempDir::new().unwrap();
        let staging = dir.path().join("staged.b64").display().to_string();
        let dest = dir.path().join("payload.js");
        let content: Vec<u8> = (0..120_000u32).map(|i| (i * 31 % 256) as u8).collect();

        let shell = local_shell();
        let chunks = encode_chunks(&content);
        assert!(chunks.len() > 1);

        push_chunks(&chunks, &staging, |command| shell.run(command)).unwrap();

        let decoded = shell
            .run(&decode_command(&staging, &dest.display().to_string()))
            .unwrap();

        assert_eq!(decoded.exit_code, 0, "stderr: {}", decoded.stderr);
        assert_eq!(decoded.stdout, "OK\n");
        assert_eq!(fs::read(&dest).unwrap(), content);
        assert!(
            !std::path::Path::new(&staging).exists(),
            "staging file should be gone"
        );
    }
}
