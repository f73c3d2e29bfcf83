//! ApplyRemoteUseCase: writes a value received from the peer to the local
//! clipboard.
//!
//! The tracking cell is updated *before* the clipboard write.  Once the
//! write lands, the watcher's next poll sees the new value, finds it equal to
//! the tracking cell, and treats it as an echo instead of a local change.
//! Doing it the other way round leaves a window where the watcher observes
//! the value before it is marked and sends it back to the peer.
//!
//! If the write fails the cell is rolled back, but only when it still holds
//! the value this call stored; a newer value from another connection is left
//! alone.

use std::sync::Arc;

use clipsync_core::TrackingCell;
use tracing::debug;

use crate::application::clipboard::{ClipboardAccess, ClipboardError};

/// What happened to one received frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Empty frame: nothing to apply.
    Keepalive,
    /// The clipboard now holds the received text.
    Applied { bytes: usize },
}

/// Applies received content to the clipboard while keeping the tracking
/// cell consistent.
///
/// Shared by every inbound connection handler.
pub struct ApplyRemoteUseCase {
    clipboard: Arc<dyn ClipboardAccess>,
    tracking: TrackingCell,
}

impl ApplyRemoteUseCase {
    /// Creates the use case around a clipboard adapter and the shared cell.
    pub fn new(clipboard: Arc<dyn ClipboardAccess>, tracking: TrackingCell) -> Self {
        Self {
            clipboard,
            tracking,
        }
    }

    /// Applies one decoded frame.
    ///
    /// An empty string is a keepalive and never touches the clipboard.
    ///
    /// # Errors
    ///
    /// Returns the adapter's [`ClipboardError`] if the write fails.  The
    /// tracking cell has been rolled back by then.
    pub async fn apply(&self, content: &str) -> Result<ApplyOutcome, ClipboardError> {
        if content.is_empty() {
            return Ok(ApplyOutcome::Keepalive);
        }

        let previous = self.tracking.replace(content);
        if let Err(e) = self.clipboard.write_text(content).await {
            if !self.tracking.restore_if(content, previous) {
                debug!("tracking value superseded during failed write; not rolled back");
            }
            return Err(e);
        }

        Ok(ApplyOutcome::Applied {
            bytes: content.len(),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
