//! ClipboardWatcher: detects genuine local clipboard changes.
//!
//! Most clipboards offer no portable change notification, so the watcher
//! polls at a fixed interval.  Each tick classifies what it saw:
//!
//! ```text
//! read failed ─────────────────────────────► ReadFailed (log, retry next tick)
//! ""  ─────────────────────────────────────► Empty
//! same as last observed ───────────────────► Unchanged
//! equal to the tracking cell ──────────────► Echo      (value came from the peer)
//! anything else ───────────────────────────► Deposited (into the outbox)
//! ```
//!
//! "Last observed" is updated before the echo check, so a received value
//! is classified as an echo exactly once and then reads as unchanged.
//!
//! At startup the current clipboard is read once and recorded as the
//! baseline.  It is not sent unless `sync_on_start` is enabled.

use std::sync::Arc;
use std::time::Duration;

use clipsync_core::{DepositOutcome, Outbox, TrackingCell};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::clipboard::ClipboardAccess;

/// Classification of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    ReadFailed,
    Empty,
    Unchanged,
    Echo,
    Deposited(DepositOutcome),
}

/// Polls the clipboard and feeds local changes to the outbox.
pub struct ClipboardWatcher {
    clipboard: Arc<dyn ClipboardAccess>,
    tracking: TrackingCell,
    outbox: Arc<Outbox>,
    interval: Duration,
    sync_on_start: bool,
    last_observed: String,
}

impl ClipboardWatcher {
    /// Creates a watcher polling every `interval`.
    ///
    /// `interval` must be non-zero.
    pub fn new(
        clipboard: Arc<dyn ClipboardAccess>,
        tracking: TrackingCell,
        outbox: Arc<Outbox>,
        interval: Duration,
    ) -> Self {
        Self {
            clipboard,
            tracking,
            outbox,
            interval,
            sync_on_start: false,
            last_observed: String::new(),
        }
    }

    /// Sends whatever is on the clipboard at startup instead of only using it
    /// as the baseline.
    pub fn with_sync_on_start(mut self, enabled: bool) -> Self {
        self.sync_on_start = enabled;
        self
    }

    /// The most recent non-empty value this watcher has seen.
    pub fn last_observed(&self) -> &str {
        &self.last_observed
    }

    /// Records the clipboard's current content as the change-detection
    /// baseline.
    ///
    /// Returns the deposit outcome when `sync_on_start` is enabled and there
    /// was something to send.  A read failure leaves the baseline empty.
    pub async fn prime(&mut self) -> Option<DepositOutcome> {
        let initial = match self.clipboard.read_text().await {
            Ok(text) => text,
            Err(e) => {
                warn!("initial clipboard read failed: {e}");
                return None;
            }
        };
        self.last_observed = initial;

        if self.sync_on_start
            && !self.last_observed.is_empty()
            && !self.tracking.matches(&self.last_observed)
        {
            let outcome = self.outbox.deposit(self.last_observed.clone());
            info!(
                "syncing initial clipboard: {} bytes",
                self.last_observed.len()
            );
            return Some(outcome);
        }
        None
    }

    /// Reads the clipboard once and acts on what it finds.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let content = match self.clipboard.read_text().await {
            Ok(text) => text,
            Err(e) => {
                warn!("clipboard read error: {e}");
                return PollOutcome::ReadFailed;
            }
        };

        if content.is_empty() {
            return PollOutcome::Empty;
        }
        if content == self.last_observed {
            return PollOutcome::Unchanged;
        }
        self.last_observed = content;

        if self.tracking.matches(&self.last_observed) {
            debug!(
                "clipboard matches last received value ({} bytes); not sending back",
                self.last_observed.len()
            );
            return PollOutcome::Echo;
        }

        let bytes = self.last_observed.len();
        let outcome = self.outbox.deposit(self.last_observed.clone());
        match outcome {
            DepositOutcome::Queued => debug!("clipboard changed: {bytes} bytes (queued)"),
            DepositOutcome::Replaced => debug!("clipboard changed: {bytes} bytes (replaced)"),
        }
        PollOutcome::Deposited(outcome)
    }

    /// Primes the baseline, then polls every interval until `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) {
        self.prime().await;

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
            }
        }
        debug!("clipboard watcher stopped");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
