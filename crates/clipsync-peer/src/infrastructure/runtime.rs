//! Peer runtime: wires the use cases to real sockets and runs them.
//!
//! ```text
//!               ┌───────────── TrackingCell ─────────────┐
//!               │ (read)                        (write)  │
//!   ClipboardWatcher ──► Outbox ──► OutboundConnector ──►│── TCP ──► other peer
//!                                                        │
//!   other peer ── TCP ──► run_listener ──► ApplyRemoteUseCase ──► clipboard
//! ```
//!
//! The three long-running tasks share only the tracking cell, the outbox,
//! and the cancellation token.

use std::sync::Arc;

use clipsync_core::{Outbox, TrackingCell};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::application::apply_remote::ApplyRemoteUseCase;
use crate::application::clipboard::ClipboardAccess;
use crate::application::sync_outbound::OutboundConnector;
use crate::application::watch_clipboard::ClipboardWatcher;
use crate::domain::settings::PeerSettings;
use crate::infrastructure::network::{bind_listener, run_listener, NetworkError, TcpDialer};

/// Binds the listen address and runs the peer until `cancel` fires.
///
/// # Errors
///
/// Returns [`NetworkError::BindFailed`] if the listener cannot be bound.
/// Nothing else is fatal once the peer is running.
pub async fn run_peer(
    settings: PeerSettings,
    clipboard: Arc<dyn ClipboardAccess>,
    cancel: CancellationToken,
) -> Result<(), NetworkError> {
    let listener = bind_listener(settings.listen_addr).await?;
    serve(listener, settings, clipboard, cancel).await;
    Ok(())
}

/// Runs the peer on an already bound listener until `cancel` fires, then
/// waits for every task to finish.
///
/// `settings.listen_addr` is ignored in favour of the listener's address.
pub async fn serve(
    listener: TcpListener,
    settings: PeerSettings,
    clipboard: Arc<dyn ClipboardAccess>,
    cancel: CancellationToken,
) {
    match listener.local_addr() {
        Ok(addr) => info!("peer started: listening on {addr}, peer={}", settings.peer),
        Err(_) => info!("peer started: peer={}", settings.peer),
    }

    let tracking = TrackingCell::new();
    let outbox = Arc::new(Outbox::new());

    let watcher = ClipboardWatcher::new(
        Arc::clone(&clipboard),
        tracking.clone(),
        Arc::clone(&outbox),
        settings.poll_interval,
    )
    .with_sync_on_start(settings.sync_on_start);
    let apply = Arc::new(ApplyRemoteUseCase::new(clipboard, tracking));
    let idle_timeout = settings.inbound_idle_timeout();
    let connector = OutboundConnector::new(
        TcpDialer::new(settings.peer.clone()),
        outbox,
        settings.connector.clone(),
    );

    let tasks = [
        ("listener", tokio::spawn(run_listener(listener, apply, idle_timeout, cancel.clone()))),
        ("watcher", tokio::spawn(watcher.run(cancel.clone()))),
        ("connector", tokio::spawn(connector.run(cancel.clone()))),
    ];

    for (name, task) in tasks {
        if let Err(e) = task.await {
            error!("{name} task failed: {e}");
        }
    }
    info!("peer stopped");
}
