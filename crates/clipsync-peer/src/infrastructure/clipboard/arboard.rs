//! System clipboard adapter backed by `arboard`.
//!
//! Works on Windows, macOS, and Linux (X11, and Wayland through the data
//! control protocol where the compositor offers it).
//!
//! # One handle for the whole process
//!
//! On Linux the clipboard owner must stay alive to keep serving what it
//! wrote: dropping the last `arboard::Clipboard` hands the data to a
//! clipboard manager if one is running and otherwise discards it.  A value
//! received from the peer must therefore outlive the write call.
//!
//! The adapter starts one worker thread named `clipboard` that opens a
//! single `arboard::Clipboard` on first use and keeps it until the adapter
//! is dropped.  `read_text` / `write_text` send requests to that thread and
//! await the reply, so the async tasks never block on the clipboard.  If
//! opening fails (no display yet), the request fails and the next request
//! tries again.

use std::thread;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::application::clipboard::{ClipboardAccess, ClipboardError};

/// The blocking operations the worker performs on its open handle.
trait TextHandle {
    fn read(&mut self) -> Result<String, ClipboardError>;
    fn write(&mut self, text: String) -> Result<(), ClipboardError>;
}

impl TextHandle for arboard::Clipboard {
    fn read(&mut self) -> Result<String, ClipboardError> {
        match self.get_text() {
            Ok(text) => Ok(text),
            // Nothing on the clipboard, or only non-text content.
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(ClipboardError::ReadFailed(e.to_string())),
        }
    }

    fn write(&mut self, text: String) -> Result<(), ClipboardError> {
        self.set_text(text)
            .map_err(|e| ClipboardError::WriteFailed(e.to_string()))
    }
}

enum Request {
    Read(oneshot::Sender<Result<String, ClipboardError>>),
    Write(String, oneshot::Sender<Result<(), ClipboardError>>),
}

impl Request {
    fn serve<H: TextHandle>(self, handle: &mut H) {
        // A dropped receiver means the caller stopped waiting; nothing to do.
        match self {
            Request::Read(reply) => {
                let _ = reply.send(handle.read());
            }
            Request::Write(text, reply) => {
                let _ = reply.send(handle.write(text));
            }
        }
    }

    fn fail(self, err: ClipboardError) {
        match self {
            Request::Read(reply) => {
                let _ = reply.send(Err(err));
            }
            Request::Write(_, reply) => {
                let _ = reply.send(Err(err));
            }
        }
    }
}

/// Worker loop: runs until every sender is dropped.
fn serve_requests<H, F>(mut requests: mpsc::UnboundedReceiver<Request>, mut open: F)
where
    H: TextHandle,
    F: FnMut() -> Result<H, ClipboardError>,
{
    let mut handle: Option<H> = None;

    while let Some(request) = requests.blocking_recv() {
        if handle.is_none() {
            match open() {
                Ok(opened) => {
                    debug!("system clipboard opened");
                    handle = Some(opened);
                }
                Err(e) => {
                    request.fail(e);
                    continue;
                }
            }
        }
        if let Some(clipboard) = handle.as_mut() {
            request.serve(clipboard);
        }
    }

    debug!("clipboard worker stopped");
}

/// Clipboard adapter for the local desktop session.
#[derive(Debug)]
pub struct ArboardClipboard {
    requests: mpsc::UnboundedSender<Request>,
}

impl ArboardClipboard {
    /// Starts the worker thread.  The desktop clipboard is not touched until
    /// the first read or write.
    pub fn new() -> Self {
        Self::with_opener(|| {
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))
        })
    }

    fn with_opener<H, F>(open: F) -> Self
    where
        H: TextHandle,
        F: FnMut() -> Result<H, ClipboardError> + Send + 'static,
    {
        let (requests, inbox) = mpsc::unbounded_channel();
        let spawned = thread::Builder::new()
            .name("clipboard".to_string())
            .spawn(move || serve_requests(inbox, open));
        if let Err(e) = spawned {
            // The receiver went down with the closure; every call reports it.
            error!("failed to start clipboard thread: {e}");
        }
        Self { requests }
    }

    fn worker_gone() -> ClipboardError {
        ClipboardError::Unavailable("clipboard thread is not running".to_string())
    }
}

impl Default for ArboardClipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClipboardAccess for ArboardClipboard {
    async fn read_text(&self) -> Result<String, ClipboardError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Read(reply))
            .map_err(|_| Self::worker_gone())?;
        response.await.map_err(|_| Self::worker_gone())?
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Write(text.to_owned(), reply))
            .map_err(|_| Self::worker_gone())?;
        response.await.map_err(|_| Self::worker_gone())?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// A handle whose content lives and dies with the handle itself.
    struct OwnedContent {
        content: String,
    }

    impl TextHandle for OwnedContent {
        fn read(&mut self) -> Result<String, ClipboardError> {
            Ok(self.content.clone())
        }

        fn write(&mut self, text: String) -> Result<(), ClipboardError> {
            self.content = text;
            Ok(())
        }
    }

    fn counting_opener(
        opens: Arc<AtomicUsize>,
        failures_first: usize,
    ) -> impl FnMut() -> Result<OwnedContent, ClipboardError> + Send + 'static {
        move || {
            let attempt = opens.fetch_add(1, Ordering::SeqCst);
            if attempt < failures_first {
                return Err(ClipboardError::Unavailable("no display".to_string()));
            }
            Ok(OwnedContent {
                content: String::new(),
            })
        }
    }

    #[test]
    fn test_adapter_constructs_without_touching_the_desktop() {
        let _clipboard = ArboardClipboard::new();
        let _default = ArboardClipboard::default();
    }

    #[tokio::test]
    async fn test_written_value_is_still_readable_from_the_same_handle() {
        // Arrange
        let opens = Arc::new(AtomicUsize::new(0));
        let clipboard = ArboardClipboard::with_opener(counting_opener(Arc::clone(&opens), 0));

        // Act
        clipboard.write_text("from peer").await.unwrap();
        let first = clipboard.read_text().await.unwrap();
        let second = clipboard.read_text().await.unwrap();

        // Assert: the handle that wrote the value is the one still serving it
        assert_eq!(first, "from peer");
        assert_eq!(second, "from peer");
        assert_eq!(opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_polling_reuses_one_handle() {
        let opens = Arc::new(AtomicUsize::new(0));
        let clipboard = ArboardClipboard::with_opener(counting_opener(Arc::clone(&opens), 0));

        for _ in 0..20 {
            clipboard.read_text().await.unwrap();
        }

        assert_eq!(opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_open_is_reported_and_retried_on_next_call() {
        // Arrange: the first open fails
        let opens = Arc::new(AtomicUsize::new(0));
        let clipboard = ArboardClipboard::with_opener(counting_opener(Arc::clone(&opens), 1));

        // Act
        let first = clipboard.read_text().await;
        let second = clipboard.write_text("later").await;

        // Assert
        assert!(matches!(first, Err(ClipboardError::Unavailable(_))));
        assert_eq!(second, Ok(()));
        assert_eq!(clipboard.read_text().await.unwrap(), "later");
        assert_eq!(opens.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_are_served_in_turn() {
        let opens = Arc::new(AtomicUsize::new(0));
        let clipboard = Arc::new(ArboardClipboard::with_opener(counting_opener(
            Arc::clone(&opens),
            0,
        )));

        let writers: Vec<_> = (0..8)
            .map(|i| {
                let clipboard = Arc::clone(&clipboard);
                tokio::spawn(async move { clipboard.write_text(&format!("v{i}")).await })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        let last = clipboard.read_text().await.unwrap();
        assert!(last.starts_with('v'));
        assert_eq!(opens.load(Ordering::SeqCst), 1);
    }
}
