//! Inbound side: accept loop and per-connection frame handling.
//!
//! The listener accepts until cancellation and hands each connection to its
//! own task, so a slow or misbehaving peer connection never delays the
//! others.  Every handler gets a child of the shared cancellation token and
//! is tracked, so [`run_listener`] returns only after all handlers have
//! closed.
//!
//! Per connection:
//!
//! - empty frame: keepalive, ignored
//! - text frame: applied through [`ApplyRemoteUseCase`]; a clipboard write
//!   failure is logged and the connection stays open
//! - any decode error (oversized, truncated, invalid UTF-8, I/O): the
//!   connection is closed; the listener keeps accepting
//! - no frame at all for the idle timeout: the connection is closed.  A peer
//!   that vanished without FIN/RST would otherwise hold its handler until
//!   shutdown.
//!
//! A failed `accept` (e.g. out of file descriptors) is retried after a
//! short pause instead of immediately.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clipsync_core::{read_frame, FrameError};
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::application::apply_remote::{ApplyOutcome, ApplyRemoteUseCase};

/// Pause after a failed `accept` before trying again.
const ACCEPT_ERROR_PAUSE: Duration = Duration::from_millis(100);

/// Errors starting the inbound listener.  These are fatal at startup.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("failed to bind listener on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Binds the TCP listener.
///
/// # Errors
///
/// Returns [`NetworkError::BindFailed`] if the address is in use or not
/// available on this host.
pub async fn bind_listener(addr: SocketAddr) -> Result<TcpListener, NetworkError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| NetworkError::BindFailed { addr, source })
}

/// Accepts connections until `cancel` fires, then waits for every open
/// handler to close.
///
/// A connection that delivers no frame for `idle_timeout` is closed.
pub async fn run_listener(
    listener: TcpListener,
    apply: Arc<ApplyRemoteUseCase>,
    idle_timeout: Duration,
    cancel: CancellationToken,
) {
    let handlers = TaskTracker::new();

    loop {
        let accepted = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((stream, remote)) => {
                info!("incoming connection: {remote}");
                handlers.spawn(handle_inbound(
                    stream,
                    remote,
                    Arc::clone(&apply),
                    idle_timeout,
                    cancel.child_token(),
                ));
            }
            Err(e) => {
                warn!("accept error: {e}");
                if !pause_after_accept_error(&cancel).await {
                    break;
                }
            }
        }
    }

    drop(listener);
    handlers.close();
    handlers.wait().await;
    debug!("listener stopped");
}

/// Waits out [`ACCEPT_ERROR_PAUSE`].  Returns `false` if cancelled first.
async fn pause_after_accept_error(cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = time::sleep(ACCEPT_ERROR_PAUSE) => true,
    }
}

// ── Per-connection handler ────────────────────────────────────────────────────

/// Why an inbound connection stopped before shutdown.
#[derive(Debug, Error)]
enum ConnectionEnd {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("no frame received for {0:?}")]
    Idle(Duration),
}

/// Serves one inbound connection and logs how it ended.
async fn handle_inbound(
    stream: TcpStream,
    remote: SocketAddr,
    apply: Arc<ApplyRemoteUseCase>,
    idle_timeout: Duration,
    cancel: CancellationToken,
) {
    match serve_connection(stream, remote, &apply, idle_timeout, &cancel).await {
        Ok(()) => debug!("closing connection from {remote} on shutdown"),
        Err(ConnectionEnd::Frame(FrameError::ConnectionClosed)) => {
            info!("connection closed: {remote}")
        }
        Err(e @ ConnectionEnd::Idle(_)) => info!("closing idle connection from {remote}: {e}"),
        Err(e) => warn!("read error from {remote}: {e}"),
    }
}

/// Reads and applies frames until the stream fails, stays silent for
/// `idle_timeout`, or `cancel` fires.
///
/// Returns `Ok(())` only on cancellation.
async fn serve_connection(
    mut stream: TcpStream,
    remote: SocketAddr,
    apply: &ApplyRemoteUseCase,
    idle_timeout: Duration,
    cancel: &CancellationToken,
) -> Result<(), ConnectionEnd> {
    loop {
        let content = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            frame = time::timeout(idle_timeout, read_frame(&mut stream)) => match frame {
                Ok(frame) => frame?,
                Err(_) => return Err(ConnectionEnd::Idle(idle_timeout)),
            },
        };

        match apply.apply(&content).await {
            Ok(ApplyOutcome::Keepalive) => {}
            Ok(ApplyOutcome::Applied { bytes }) => info!("received {bytes} bytes from {remote}"),
            Err(e) => warn!("clipboard write error: {e}"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use clipsync_core::{encode_frame, TrackingCell, MAX_FRAME_SIZE};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::task::JoinHandle;

    use crate::application::clipboard::ClipboardAccess;
    use crate::infrastructure::clipboard::MockClipboard;

    struct Running {
        addr: SocketAddr,
        clipboard: Arc<MockClipboard>,
        tracking: TrackingCell,
        cancel: CancellationToken,
        handle: JoinHandle<()>,
    }

    async fn start() -> Running {
        start_with_idle_timeout(Duration::from_secs(30)).await
    }

    async fn start_with_idle_timeout(idle_timeout: Duration) -> Running {
        let listener = bind_listener("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let clipboard = Arc::new(MockClipboard::new());
        let tracking = TrackingCell::new();
        let apply = Arc::new(ApplyRemoteUseCase::new(
            Arc::clone(&clipboard) as Arc<dyn ClipboardAccess>,
            tracking.clone(),
        ));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_listener(listener, apply, idle_timeout, cancel.clone()));
        Running {
            addr,
            clipboard,
            tracking,
            cancel,
            handle,
        }
    }

    /// Polls `check` until it holds or two seconds pass.
    async fn eventually(mut check: impl FnMut() -> bool) -> bool {
        for _ in 0..200 {
            if check() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        check()
    }

    /// Reads from `stream` until EOF or error; true if the server closed it.
    async fn closed_by_server(stream: &mut TcpStream) -> bool {
        let mut buf = [0u8; 16];
        matches!(
            tokio::time::timeout(Duration::from_secs(2), stream.read(&mut buf)).await,
            Ok(Ok(0)) | Ok(Err(_))
        )
    }

    #[tokio::test]
    async fn test_text_frame_is_applied_and_tracked() {
        // Arrange
        let server = start().await;
        let mut client = TcpStream::connect(server.addr).await.unwrap();

        // Act
        client.write_all(&encode_frame("from peer").unwrap()).await.unwrap();

        // Assert
        assert!(eventually(|| server.clipboard.writes() == vec!["from peer"]).await);
        assert_eq!(server.tracking.get(), "from peer");
        server.cancel.cancel();
        server.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_keepalive_frames_are_not_applied() {
        // Arrange
        let server = start().await;
        let mut client = TcpStream::connect(server.addr).await.unwrap();

        // Act: two keepalives followed by real content
        client.write_all(&encode_frame("").unwrap()).await.unwrap();
        client.write_all(&encode_frame("").unwrap()).await.unwrap();
        client.write_all(&encode_frame("after").unwrap()).await.unwrap();

        // Assert: the clipboard was never cleared
        assert!(eventually(|| !server.clipboard.writes().is_empty()).await);
        assert_eq!(server.clipboard.writes(), vec!["after"]);
        server.cancel.cancel();
        server.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_oversized_frame_closes_connection_but_listener_keeps_accepting() {
        // Arrange
        let server = start().await;
        let mut bad = TcpStream::connect(server.addr).await.unwrap();

        // Act
        bad.write_all(&((MAX_FRAME_SIZE as u32) + 1).to_be_bytes())
            .await
            .unwrap();

        // Assert
        assert!(closed_by_server(&mut bad).await);
        assert!(server.clipboard.writes().is_empty());

        let mut good = TcpStream::connect(server.addr).await.unwrap();
        good.write_all(&encode_frame("still works").unwrap()).await.unwrap();
        assert!(eventually(|| server.clipboard.writes() == vec!["still works"]).await);

        server.cancel.cancel();
        server.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_utf8_closes_connection() {
        let server = start().await;
        let mut client = TcpStream::connect(server.addr).await.unwrap();

        client.write_all(&2u32.to_be_bytes()).await.unwrap();
        client.write_all(&[0xC3, 0x28]).await.unwrap();

        assert!(closed_by_server(&mut client).await);
        assert!(server.clipboard.writes().is_empty());
        server.cancel.cancel();
        server.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_clipboard_failure_keeps_connection_open() {
        // Arrange
        let server = start().await;
        server.clipboard.fail_writes(true);
        let mut client = TcpStream::connect(server.addr).await.unwrap();

        // Act: first value fails to apply
        client.write_all(&encode_frame("lost").unwrap()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        server.clipboard.fail_writes(false);
        client.write_all(&encode_frame("kept").unwrap()).await.unwrap();

        // Assert: the same connection delivered the second value
        assert!(eventually(|| server.clipboard.writes() == vec!["kept"]).await);
        assert_eq!(server.tracking.get(), "kept");
        server.cancel.cancel();
        server.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_connections_are_served_independently() {
        let server = start().await;
        let mut idle = TcpStream::connect(server.addr).await.unwrap();
        let mut active = TcpStream::connect(server.addr).await.unwrap();

        // A half-written frame on one connection must not block the other.
        idle.write_all(&[0, 0]).await.unwrap();
        active.write_all(&encode_frame("independent").unwrap()).await.unwrap();

        assert!(eventually(|| server.clipboard.writes() == vec!["independent"]).await);
        server.cancel.cancel();
        server.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_cancellation_stops_listener_and_closes_open_connections() {
        // Arrange
        let server = start().await;
        let mut client = TcpStream::connect(server.addr).await.unwrap();
        client.write_all(&encode_frame("hi").unwrap()).await.unwrap();
        assert!(eventually(|| server.clipboard.writes().len() == 1).await);

        // Act
        server.cancel.cancel();

        // Assert
        tokio::time::timeout(Duration::from_secs(2), server.handle)
            .await
            .expect("listener must stop after cancellation")
            .unwrap();
        assert!(closed_by_server(&mut client).await);
    }

    #[tokio::test]
    async fn test_silent_connection_is_closed_after_idle_timeout() {
        // Arrange
        let server = start_with_idle_timeout(Duration::from_millis(200)).await;
        let mut silent = TcpStream::connect(server.addr).await.unwrap();

        // Act: send nothing at all

        // Assert: the handler gave up on it; the listener still accepts
        assert!(closed_by_server(&mut silent).await);
        let mut fresh = TcpStream::connect(server.addr).await.unwrap();
        fresh.write_all(&encode_frame("after idle").unwrap()).await.unwrap();
        assert!(eventually(|| server.clipboard.writes() == vec!["after idle"]).await);

        server.cancel.cancel();
        server.handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_keepalives_hold_connection_open_past_idle_timeout() {
        // Arrange
        let server = start_with_idle_timeout(Duration::from_millis(200)).await;
        let mut client = TcpStream::connect(server.addr).await.unwrap();

        // Act: keepalives every 50ms for well over the idle timeout
        for _ in 0..10 {
            client.write_all(&encode_frame("").unwrap()).await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        client.write_all(&encode_frame("still open").unwrap()).await.unwrap();

        // Assert
        assert!(eventually(|| server.clipboard.writes() == vec!["still open"]).await);
        server.cancel.cancel();
        server.handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_error_pause_waits_before_retrying() {
        let cancel = CancellationToken::new();
        let started = time::Instant::now();

        let resumed = pause_after_accept_error(&cancel).await;

        assert!(resumed);
        assert!(started.elapsed() >= ACCEPT_ERROR_PAUSE);
        assert!(started.elapsed() < ACCEPT_ERROR_PAUSE * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_error_pause_ends_on_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let started = time::Instant::now();

        let resumed = pause_after_accept_error(&cancel).await;

        assert!(!resumed);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_bind_on_used_port_fails() {
        let first = bind_listener("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = first.local_addr().unwrap();

        let second = bind_listener(addr).await;

        assert!(matches!(second, Err(NetworkError::BindFailed { .. })));
    }
}
