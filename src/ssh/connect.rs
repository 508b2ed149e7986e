use std::{
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use ssh2::{MethodType, Session};
use ssh2_config::HostParams;

use crate::{check, util::ask_password};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

pub(super) fn try_connection(host: &str) -> Result<TcpStream> {
    let addrs = host
        .to_socket_addrs()
        .with_context(|| format!("could not resolve {host}"))?;

    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_error = Some(err),
        }
    }

    match last_error {
        Some(err) => Err(err).with_context(|| format!("could not connect to {host}")),
        None => bail!("{host} did not resolve to any address"),
    }
}

pub(super) fn configure_session(session: &mut Session, params: &HostParams) {
    if let Some(compress) = params.compression {
        session.set_compress(compress);
    }
    if params.tcp_keep_alive.unwrap_or(false) {
        if let Some(interval) = params.server_alive_interval {
            session.set_keepalive(true, interval.as_secs() as u32);
        }
    }

    // Preference failures are not fatal; the handshake falls back to the
    // library defaults.
    if let Some(algos) = params.kex_algorithms.as_deref() {
        let set = session.method_pref(MethodType::Kex, algos.join(",").as_str());
        check!(set.is_ok(), "Could not set KEX algorithms: {}", set.unwrap_err());
    }
    if let Some(algos) = params.host_key_algorithms.as_deref() {
        let set = session.method_pref(MethodType::HostKey, algos.join(",").as_str());
        check!(set.is_ok(), "Could not set host key algorithms: {}", set.unwrap_err());
    }
}

/// Key material first, matching a host that is already set up for
/// non-interactive pushes: the agent, then the config's identity files. The
/// password prompt only appears when both fall through.
pub(super) fn authenticate(session: &Session, user: &str, params: &HostParams) -> Result<()> {
    if session.userauth_agent(user).is_ok() && session.authenticated() {
        return Ok(());
    }

    if let Some(identities) = params.identity_file.as_deref() {
        for identity in identities {
            let tried = session.userauth_pubkey_file(user, None, identity, None);
            if tried.is_ok() && session.authenticated() {
                return Ok(());
            }
        }
    }

    let password = ask_password(&format!("[{user}] Password: "))?;
    session
        .userauth_password(user, &password)
        .context("authentication failed")?;

    Ok(())
}
