//! Echo-suppression cell.
//!
//! When a value arrives from the peer and is written to the local clipboard,
//! the next clipboard poll will observe that value and, without help, would
//! mistake it for a fresh local copy and send it straight back.  The
//! [`TrackingCell`] records the last value attributable to the peer so the
//! watcher can recognise and skip that echo.
//!
//! # Concurrency
//!
//! The cell is read by the watcher and written by every inbound handler.
//! The value sits behind a `std::sync::RwLock`; a read always observes a
//! fully written string.  Critical sections are a clone or a swap and never
//! span an `.await`, so a blocking lock is appropriate even inside async
//! tasks.  Concurrent writers resolve as last-writer-wins.

use std::sync::{Arc, PoisonError, RwLock};

/// Shared handle to the last value received from (or confirmed to) the peer.
///
/// Cloning the handle is cheap and every clone refers to the same value.
#[derive(Debug, Clone, Default)]
pub struct TrackingCell {
    inner: Arc<RwLock<String>>,
}

impl TrackingCell {
    /// Creates an empty cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> String {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the value unconditionally.
    pub fn set(&self, value: impl Into<String>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = value.into();
    }

    /// Replaces the value and returns the previous one in a single critical
    /// section.
    pub fn replace(&self, value: impl Into<String>) -> String {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, value.into())
    }

    /// Rolls the cell back to `previous`, but only if it still holds
    /// `expected`.
    ///
    /// Returns `true` if the rollback happened.  If another writer has
    /// stored a newer value in the meantime, that value is kept.
    pub fn restore_if(&self, expected: &str, previous: impl Into<String>) -> bool {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if *guard == expected {
            *guard = previous.into();
            true
        } else {
            false
        }
    }

    /// Returns `true` if the current value equals `candidate`, without cloning.
    pub fn matches(&self, candidate: &str) -> bool {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner) == candidate
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
