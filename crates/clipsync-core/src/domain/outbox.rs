//! Capacity-one coalescing hand-off between the clipboard watcher and the
//! outbound connector.
//!
//! Under bursty local edits only the newest value matters.  The outbox holds
//! at most one pending string: a deposit into an occupied slot discards the
//! stale value and keeps the new one.  Depositing never waits, so a slow or
//! disconnected peer can never stall clipboard polling, and the backlog can
//! never grow beyond one value.
//!
//! The slot is a `Mutex<Option<String>>`; availability is signalled with a
//! `tokio::sync::Notify`.  `notify_one` stores a single permit when nobody is
//! waiting, so a deposit that lands between a consumer's empty-check and its
//! wait is never missed.

use std::sync::{Mutex, PoisonError};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// What a [`Outbox::deposit`] call did to the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositOutcome {
    /// The slot was empty; the value is now pending.
    Queued,
    /// An undelivered value was discarded in favour of the new one.
    Replaced,
}

/// Single-slot, last-writer-wins mailbox.
#[derive(Debug, Default)]
pub struct Outbox {
    slot: Mutex<Option<String>>,
    available: Notify,
}

impl Outbox {
    /// Creates an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `value` in the slot, replacing any value not yet taken.
    ///
    /// Never blocks on the consumer.
    pub fn deposit(&self, value: impl Into<String>) -> DepositOutcome {
        let previous = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(value.into());
        self.available.notify_one();
        match previous {
            Some(_) => DepositOutcome::Replaced,
            None => DepositOutcome::Queued,
        }
    }

    /// Removes and returns the pending value, if any, without waiting.
    pub fn try_take(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    /// Returns `true` if a value is waiting.
    pub fn is_pending(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Waits for a value and removes it from the slot.
    ///
    /// Returns `None` once `cancel` fires.  The future is cancel-safe: the
    /// value only leaves the slot in the same poll that returns it, so
    /// dropping a pending `take` (for example as the losing branch of a
    /// `tokio::select!`) never loses a deposit.
    pub async fn take(&self, cancel: &CancellationToken) -> Option<String> {
        loop {
            if let Some(value) = self.try_take() {
                return Some(value);
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return None,
                _ = self.available.notified() => {}
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
