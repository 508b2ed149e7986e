use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use ssh2::Session;
use ssh2_config::{HostParams, ParseRule, SshConfig};

use crate::{check, progress::ProgressView};

mod connect;
pub mod transfer;

/// Looks the host up in `~/.ssh/config`. A missing config just yields the
/// defaults; the session then behaves like a plain `ssh <host>` would.
pub fn host_params(hostname: &str) -> Result<HostParams> {
    let Some(home) = std::env::var_os("HOME") else {
        return Ok(SshConfig::default().query(hostname));
    };

    let path = Path::new(&home).join(".ssh").join("config");
    if !path.exists() {
        return Ok(SshConfig::default().query(hostname));
    }

    let file =
        File::open(&path).with_context(|| format!("could not open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let config = SshConfig::default()
        .parse(&mut reader, ParseRule::STRICT)
        .with_context(|| format!("could not parse {}", path.display()))?;

    Ok(config.query(hostname))
}

pub struct SSHSession(Session);

impl SSHSession {
    pub fn open(hostname: &str, user: &str, params: &HostParams) -> Result<Self> {
        let host = params.host_name.as_deref().unwrap_or(hostname);
        let addr = if host.contains(':') {
            check!(
                params.port.is_none(),
                "Port {} is ignored, the hostname already carries one",
                params.port.unwrap_or_default()
            );
            host.to_string()
        } else {
            format!("{}:{}", host, params.port.unwrap_or(22))
        };

        let mut progress = ProgressView::new(format!("Connecting to {addr}"));
        let stream = match connect::try_connection(&addr) {
            Ok(stream) => {
                let peer = stream
                    .peer_addr()
                    .map(|peer| peer.to_string())
                    .unwrap_or_else(|_| addr.clone());
                progress.success(Some(&peer));
                stream
            }
            Err(err) => {
                progress.failure(None);
                return Err(err);
            }
        };

        let mut session = Session::new().context("could not create a session")?;
        connect::configure_session(&mut session, params);
        session.set_tcp_stream(stream);
        session.handshake().context("handshake failed")?;

        connect::authenticate(&session, user, params)?;

        if let Some(banner) = session.banner() {
            println!("{banner}");
        }

        Ok(Self(session))
    }

    pub(crate) fn raw(&self) -> &Session {
        &self.0
    }
}
