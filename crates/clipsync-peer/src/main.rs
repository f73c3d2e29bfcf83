//! clipsync peer: entry point.
//!
//! Run one of these on each of two machines, each pointed at the other.
//! Text copied on either machine shows up in the other machine's clipboard.
//!
//! # Usage
//!
//! ```text
//! clipsync --peer <HOST[:PORT]> [OPTIONS]
//!
//! Options:
//!   --peer <HOST[:PORT]>     The other machine [env: CLIPSYNC_PEER]
//!   --port <PORT>            Local listen port [default: 9999]
//!   --bind <IP>              Local bind address [default: 0.0.0.0]
//!   --interval <DURATION>    Clipboard poll interval [default: 500ms]
//!   --keepalive <DURATION>   Idle keepalive interval [default: 10s]
//!   --config <PATH>          Config file [default: platform config dir]
//!   --sync-on-start          Send the clipboard found at startup
//! ```
//!
//! # Precedence
//!
//! Command-line flags (or their `CLIPSYNC_*` environment variables) win over
//! the config file, which wins over the built-in defaults.  When `--peer`
//! has no port, the local listen port is used.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use clipsync_peer::domain::{normalize_peer_addr, parse_duration, PeerSettings};
use clipsync_peer::infrastructure::clipboard::create_clipboard;
use clipsync_peer::infrastructure::run_peer;
use clipsync_peer::infrastructure::storage::{load_config, load_config_from, AppConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Two-peer text clipboard synchronization.
///
/// Every option is optional on the command line so that an unset flag falls
/// through to the config file instead of overriding it with a default.
#[derive(Debug, Parser)]
#[command(
    name = "clipsync",
    about = "Keeps the text clipboard of two machines in sync over TCP",
    version
)]
struct Cli {
    /// The other machine: `host`, `host:port`, `[v6]:port`, or a bare IPv6
    /// address.
    #[arg(long, env = "CLIPSYNC_PEER")]
    peer: Option<String>,

    /// TCP port to accept the other peer's connection on.
    #[arg(
        long,
        env = "CLIPSYNC_PORT",
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    port: Option<u16>,

    /// Local IP address to bind.  `0.0.0.0` accepts on every interface.
    #[arg(long, env = "CLIPSYNC_BIND")]
    bind: Option<IpAddr>,

    /// How often to check the local clipboard, e.g. `250ms` or `1s`.
    #[arg(long, env = "CLIPSYNC_INTERVAL", value_parser = parse_duration)]
    interval: Option<Duration>,

    /// Idle time after which the connection is probed with an empty frame.
    #[arg(long, env = "CLIPSYNC_KEEPALIVE", value_parser = parse_duration)]
    keepalive: Option<Duration>,

    /// Path to the TOML config file.
    #[arg(long, env = "CLIPSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Send the clipboard content found at startup to the peer.
    #[arg(long, env = "CLIPSYNC_SYNC_ON_START")]
    sync_on_start: bool,
}

impl Cli {
    /// Loads the config file named by `--config`, or the platform default.
    ///
    /// An explicitly named file must exist; the platform default may not.
    fn load_file_config(&self) -> anyhow::Result<AppConfig> {
        match &self.config {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("config file not found: {}", path.display());
                }
                load_config_from(path)
                    .with_context(|| format!("failed to load config from {}", path.display()))
            }
            None => load_config().context("failed to load config"),
        }
    }

    /// Merges the flags over `file` into [`PeerSettings`].
    ///
    /// # Errors
    ///
    /// Returns an error if no peer address is given anywhere, if the peer
    /// address is malformed, or if the config file's bind address is not an
    /// IP address.
    fn into_settings(self, file: &AppConfig) -> anyhow::Result<PeerSettings> {
        let port = self.port.unwrap_or(file.peer.listen_port);

        let bind = match self.bind {
            Some(ip) => ip,
            None => file.peer.bind_address.parse().with_context(|| {
                format!(
                    "invalid peer.bind_address '{}' in config file",
                    file.peer.bind_address
                )
            })?,
        };

        let raw_peer = self.peer.or_else(|| file.peer.address.clone()).context(
            "no peer address: pass --peer <HOST[:PORT]>, set CLIPSYNC_PEER, \
             or set peer.address in the config file",
        )?;
        let peer = normalize_peer_addr(&raw_peer, port)
            .with_context(|| format!("invalid peer address '{raw_peer}'"))?;

        let mut connector = file.sync.connector_settings();
        if let Some(keepalive) = self.keepalive {
            connector.keepalive_interval = keepalive;
        }

        Ok(PeerSettings {
            peer,
            listen_addr: SocketAddr::new(bind, port),
            poll_interval: self.interval.unwrap_or_else(|| file.sync.poll_interval()),
            sync_on_start: self.sync_on_start || file.sync.sync_on_start,
            connector,
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// 1. Parse the command line and load the config file.
/// 2. Install the `tracing` subscriber; `RUST_LOG` wins over `log.level`.
/// 3. Build [`PeerSettings`]; a missing or malformed peer address stops here.
/// 4. Spawn the signal watcher, which cancels the shared token.
/// 5. Run the peer until the token is cancelled.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let file = cli.load_file_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&file.log.level)),
        )
        .init();

    let settings = cli.into_settings(&file)?;

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown requested");
        signal_cancel.cancel();
    });

    run_peer(settings, create_clipboard(), cancel)
        .await
        .context("failed to start peer")?;

    info!("clipsync stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or on SIGTERM where the platform has it.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
