//! In-memory clipboard for tests.
//!
//! The real adapter needs a desktop session and changes the clipboard of the
//! machine running the tests.  `MockClipboard` keeps the content in a
//! `Mutex<String>` instead and records every write, so tests can run two
//! peers in one process and inspect exactly what each one applied.
//!
//! # Usage in tests
//!
//! ```ignore
//! let clipboard = Arc::new(MockClipboard::with_content("initial"));
//! clipboard.set_content("copied by the user");
//!
//! // ... run a peer against it ...
//!
//! assert_eq!(clipboard.writes(), vec!["from the other peer"]);
//! ```
//!
//! # Failure flags
//!
//! `fail_reads` / `fail_writes` make the next calls return errors, which
//! exercises the watcher's and handler's recovery paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::clipboard::{ClipboardAccess, ClipboardError};

/// A clipboard that lives in memory and records every write.
#[derive(Debug, Default)]
pub struct MockClipboard {
    content: Mutex<String>,
    writes: Mutex<Vec<String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MockClipboard {
    /// Creates an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clipboard already holding `content`.
    pub fn with_content(content: &str) -> Self {
        let clipboard = Self::new();
        clipboard.set_content(content);
        clipboard
    }

    /// Simulates the user copying `content` locally.  Not recorded as a write.
    pub fn set_content(&self, content: &str) {
        *self.content.lock().unwrap_or_else(|e| e.into_inner()) = content.to_string();
    }

    /// Current content.
    pub fn content(&self) -> String {
        self.content
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Every value written through [`ClipboardAccess::write_text`], in order.
    pub fn writes(&self) -> Vec<String> {
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Makes subsequent reads fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent writes fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClipboardAccess for MockClipboard {
    async fn read_text(&self) -> Result<String, ClipboardError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ClipboardError::ReadFailed("mock read failure".to_string()));
        }
        Ok(self.content())
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClipboardError::WriteFailed("mock write failure".to_string()));
        }
        self.set_content(text);
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_updates_content_and_is_recorded() {
        // Arrange
        let clipboard = MockClipboard::with_content("before");

        // Act
        clipboard.write_text("after").await.unwrap();

        // Assert
        assert_eq!(clipboard.read_text().await.unwrap(), "after");
        assert_eq!(clipboard.writes(), vec!["after"]);
    }

    #[tokio::test]
    async fn test_local_copy_is_not_recorded_as_write() {
        let clipboard = MockClipboard::new();
        clipboard.set_content("typed locally");
        assert_eq!(clipboard.content(), "typed locally");
        assert!(clipboard.writes().is_empty());
    }

    #[tokio::test]
    async fn test_failure_flags_produce_errors() {
        let clipboard = MockClipboard::with_content("kept");
        clipboard.fail_reads(true);
        clipboard.fail_writes(true);

        assert!(matches!(
            clipboard.read_text().await,
            Err(ClipboardError::ReadFailed(_))
        ));
        assert!(matches!(
            clipboard.write_text("lost").await,
            Err(ClipboardError::WriteFailed(_))
        ));
        assert_eq!(clipboard.content(), "kept");
    }
}
