//! Toxide echo bot: loads or creates a profile, bootstraps into the DHT,
//! auto-accepts friend requests, and echoes every message back.

mod config;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use toxide_core::{Event, Options, PublicKey, Session, Tox};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    for arg in std::env::args().skip(1) {
        if arg == "--version" || arg == "-V" {
            println!("toxide {}", VERSION);
            return Ok(());
        }
    }

    let cfg = config::load();
    let save_path = cfg.save_path();

    match toxide_core::version() {
        Ok(v) => log::info!("libtoxcore {v}"),
        Err(e) => anyhow::bail!("libtoxcore unavailable: {e}"),
    }

    let mut tox = create_tox(&save_path)?;
    tox.set_name(&cfg.name)?;
    tox.set_status_message(&cfg.status)?;
    persist(&save_path, &tox)?;

    println!("Tox ID: {}", tox.address());

    for node in &cfg.bootstrap {
        let key: PublicKey = match node.public_key.parse() {
            Ok(k) => k,
            Err(e) => {
                log::warn!("bad public key for {}: {e}", node.host);
                continue;
            }
        };
        match tox.bootstrap(&node.host, node.port, &key) {
            Ok(()) => log::info!("bootstrapping from {}:{}", node.host, node.port),
            Err(e) => log::warn!("bootstrap {}:{} failed: {e}", node.host, node.port),
        }
    }

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::Release))
            .context("install signal handler")?;
    }

    let session = Session::spawn(tox);
    let handle = session.handle();

    while running.load(Ordering::Acquire) {
        let event = match session.events().recv_timeout(Duration::from_millis(500)) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        match event {
            Event::ConnectionStatus(status) => {
                log::info!("DHT connection: {status:?}");
            }
            Event::FriendRequest { public_key, message } => {
                log::info!("friend request from {public_key}: {message:?}");
                let mut tox = handle.lock().unwrap();
                match tox.friend_add_norequest(&public_key) {
                    Ok(friend) => {
                        log::info!("accepted as friend {friend}");
                        if let Err(e) = persist(&save_path, &tox) {
                            log::warn!("could not persist profile: {e}");
                        }
                    }
                    Err(e) => log::warn!("could not accept {public_key}: {e}"),
                }
            }
            Event::FriendConnectionStatus { friend, status } => {
                log::info!("friend {friend} connection: {status:?}");
            }
            Event::FriendMessage { friend, kind, message } => {
                log::info!("friend {friend}: {message:?}");
                let mut tox = handle.lock().unwrap();
                if let Err(e) = tox.send_message(friend, kind, &message) {
                    log::warn!("echo to {friend} failed: {e}");
                }
            }
        }
    }

    log::info!("shutting down");
    drop(handle);
    if let Some(tox) = session.stop() {
        persist(&save_path, &tox)?;
    }
    Ok(())
}

/// Resume from the saved profile if one exists, else create a fresh identity.
fn create_tox(save_path: &Path) -> anyhow::Result<Tox> {
    let options = match std::fs::read(save_path) {
        Ok(savedata) => {
            log::info!("resuming profile from {}", save_path.display());
            Options::with_savedata(savedata)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Options::default(),
        Err(e) => {
            return Err(e).with_context(|| format!("read profile {}", save_path.display()));
        }
    };
    Tox::new(&options).context("create tox instance")
}

/// Write the serialized instance state next to the config.
fn persist(save_path: &Path, tox: &Tox) -> anyhow::Result<()> {
    if let Some(parent) = save_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    std::fs::write(save_path, tox.savedata())
        .with_context(|| format!("write profile {}", save_path.display()))
}
