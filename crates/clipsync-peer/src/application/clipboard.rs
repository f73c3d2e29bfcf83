//! Clipboard port.
//!
//! The use cases only need two operations on the OS clipboard: read the
//! current text and replace it.  Infrastructure supplies the real adapter
//! (`arboard`) and an in-memory one for tests.

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a clipboard adapter.
///
/// None of these are fatal: the watcher logs and retries on the next tick,
/// and an inbound handler logs and keeps its connection open.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClipboardError {
    /// The clipboard could not be opened at all (no display, locked by
    /// another process, ...).
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    /// Reading the text content failed.
    #[error("clipboard read failed: {0}")]
    ReadFailed(String),

    /// Writing the text content failed.
    #[error("clipboard write failed: {0}")]
    WriteFailed(String),
}

/// Read/write access to the local text clipboard.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClipboardAccess: Send + Sync {
    /// Returns the clipboard's current text.
    ///
    /// A clipboard holding no text (or non-text content) reads as `""`.
    async fn read_text(&self) -> Result<String, ClipboardError>;

    /// Replaces the clipboard's content with `text`.
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}
