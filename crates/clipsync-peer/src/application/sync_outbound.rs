//! OutboundConnector: owns the single connection towards the peer.
//!
//! # State machine
//!
//! ```text
//!            connect ok (backoff reset)
//!   ┌──────────────┐ ─────────────────────────► ┌──────────────┐
//!   │ Disconnected │                            │  Connected   │
//!   └──────────────┘ ◄───────────────────────── └──────────────┘
//!     │  ▲            send / keepalive failed      │  send pending
//!     │  │                                         │  then wait for:
//!     ▼  │ connect failed:                         │   - outbox value
//!   wait backoff, still accepting                  │   - keepalive tick
//!   outbox values into `pending`                   │   - cancellation
//! ```
//!
//! `pending` holds the newest local value not yet confirmed written to a
//! connection.  It is cleared only after a successful send, so a value whose
//! send failed goes out again on the next connection.  Later outbox values
//! simply overwrite it.
//!
//! The transport sits behind [`PeerDialer`] / [`PeerConnection`]; the TCP
//! implementation lives in `infrastructure::network`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clipsync_core::{Backoff, FrameError, Outbox, MAX_FRAME_SIZE};
use thiserror::Error;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::settings::ConnectorSettings;

/// Errors on the outbound link.  All of them are transient.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The connection attempt was refused or failed.
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The connection attempt did not finish in time.
    #[error("connect to {addr} timed out after {timeout:?}")]
    ConnectTimeout { addr: String, timeout: Duration },

    /// Writing a frame failed.
    #[error("send failed: {0}")]
    Send(#[from] FrameError),

    /// Writing a frame did not finish in time.
    #[error("send timed out after {0:?}")]
    SendTimeout(Duration),
}

/// Opens connections to the peer.
#[async_trait]
pub trait PeerDialer: Send + Sync {
    /// Human-readable dial target, used in log lines.
    fn target(&self) -> String;

    /// Opens a new connection.
    async fn connect(&self) -> Result<Box<dyn PeerConnection>, LinkError>;
}

/// One open outbound connection.
#[async_trait]
pub trait PeerConnection: Send {
    /// Writes one frame; an empty `content` is a keepalive.
    async fn send_frame(&mut self, content: &str) -> Result<(), LinkError>;
}

/// Drains the outbox to the peer, reconnecting as needed.
pub struct OutboundConnector<D> {
    dialer: D,
    outbox: Arc<Outbox>,
    settings: ConnectorSettings,
    backoff: Backoff,
    pending: Option<String>,
}

impl<D: PeerDialer> OutboundConnector<D> {
    pub fn new(dialer: D, outbox: Arc<Outbox>, settings: ConnectorSettings) -> Self {
        let backoff = Backoff::new(settings.backoff_floor, settings.backoff_cap);
        Self {
            dialer,
            outbox,
            settings,
            backoff,
            pending: None,
        }
    }

    /// Runs until `cancel` fires.  Any open connection is closed on return.
    pub async fn run(mut self, cancel: CancellationToken) {
        let target = self.dialer.target();
        let mut conn: Option<Box<dyn PeerConnection>> = None;

        let keepalive = time::sleep(self.settings.keepalive_interval);
        tokio::pin!(keepalive);

        loop {
            if cancel.is_cancelled() {
                break;
            }

            // ── Disconnected ──────────────────────────────────────────────────
            let connection = match conn.as_mut() {
                Some(c) => c,
                None => {
                    match self.connect(&cancel).await {
                        None => break,
                        Some(Ok(c)) => {
                            info!("connected to peer: {target}");
                            self.backoff.reset();
                            keepalive
                                .as_mut()
                                .reset(Instant::now() + self.settings.keepalive_interval);
                            conn = Some(c);
                        }
                        Some(Err(e)) => {
                            let delay = self.backoff.on_failure();
                            warn!("{e} (retry in {delay:?})");
                            if !self.wait_backoff(delay, &cancel).await {
                                break;
                            }
                        }
                    }
                    continue;
                }
            };

            // ── Connected: flush pending ──────────────────────────────────────
            if let Some(content) = self.pending.as_deref() {
                if content.len() > MAX_FRAME_SIZE {
                    warn!(
                        "clipboard content too large to send: {} bytes (maximum {MAX_FRAME_SIZE}); dropped",
                        content.len()
                    );
                    self.pending = None;
                } else {
                    match self.send(&mut **connection, content, &cancel).await {
                        None => break,
                        Some(Ok(())) => {
                            info!("sent {} bytes to {target}", content.len());
                            self.pending = None;
                            keepalive
                                .as_mut()
                                .reset(Instant::now() + self.settings.keepalive_interval);
                        }
                        Some(Err(e)) => {
                            warn!("send failed (reconnect): {e}");
                            conn = None;
                            continue;
                        }
                    }
                }
            }

            // ── Connected: idle ───────────────────────────────────────────────
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                value = self.outbox.take(&cancel) => {
                    if let Some(v) = value {
                        self.pending = Some(v);
                    }
                }
                _ = keepalive.as_mut() => {
                    match self.send(&mut **connection, "", &cancel).await {
                        None => break,
                        Some(Ok(())) => {
                            debug!("keepalive sent to {target}");
                            keepalive
                                .as_mut()
                                .reset(Instant::now() + self.settings.keepalive_interval);
                        }
                        Some(Err(e)) => {
                            warn!("keepalive failed (reconnect): {e}");
                            conn = None;
                        }
                    }
                }
            }
        }

        debug!("outbound connector stopped");
    }

    /// One connect attempt bounded by the connect timeout.
    ///
    /// Returns `None` if cancelled first.
    async fn connect(
        &self,
        cancel: &CancellationToken,
    ) -> Option<Result<Box<dyn PeerConnection>, LinkError>> {
        let timeout = self.settings.connect_timeout;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = time::timeout(timeout, self.dialer.connect()) => Some(match result {
                Ok(r) => r,
                Err(_) => Err(LinkError::ConnectTimeout {
                    addr: self.dialer.target(),
                    timeout,
                }),
            }),
        }
    }

    /// Sleeps for `delay`, moving any outbox values into `pending`
    /// meanwhile.  Returns `false` if cancelled.
    async fn wait_backoff(&mut self, delay: Duration, cancel: &CancellationToken) -> bool {
        let expired = time::sleep(delay);
        tokio::pin!(expired);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return false,
                _ = expired.as_mut() => return true,
                value = self.outbox.take(cancel) => {
                    if let Some(v) = value {
                        debug!("pending value updated while disconnected: {} bytes", v.len());
                        self.pending = Some(v);
                    }
                }
            }
        }
    }

    /// One frame write bounded by the send timeout.
    ///
    /// Returns `None` if cancelled first.
    async fn send(
        &self,
        connection: &mut dyn PeerConnection,
        content: &str,
        cancel: &CancellationToken,
    ) -> Option<Result<(), LinkError>> {
        let timeout = self.settings.send_timeout;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = time::timeout(timeout, connection.send_frame(content)) => Some(match result {
                Ok(r) => r,
                Err(_) => Err(LinkError::SendTimeout(timeout)),
            }),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
