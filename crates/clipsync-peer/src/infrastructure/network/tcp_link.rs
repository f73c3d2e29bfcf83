//! TCP implementation of the outbound link.
//!
//! [`TcpDialer`] resolves and connects to the peer on every attempt, so a
//! host name whose address changes is followed without a restart.
//! [`TcpPeerConnection`] writes frames with the shared codec.

use async_trait::async_trait;
use clipsync_core::write_frame;
use tokio::net::TcpStream;
use tracing::debug;

use crate::application::sync_outbound::{LinkError, PeerConnection, PeerDialer};
use crate::domain::address::PeerAddress;

/// Dials the configured peer over TCP.
#[derive(Debug, Clone)]
pub struct TcpDialer {
    peer: PeerAddress,
}

impl TcpDialer {
    pub fn new(peer: PeerAddress) -> Self {
        Self { peer }
    }
}

#[async_trait]
impl PeerDialer for TcpDialer {
    fn target(&self) -> String {
        self.peer.to_string()
    }

    async fn connect(&self) -> Result<Box<dyn PeerConnection>, LinkError> {
        let stream = TcpStream::connect((self.peer.host.as_str(), self.peer.port))
            .await
            .map_err(|source| LinkError::Connect {
                addr: self.target(),
                source,
            })?;

        // Frames are small and latency matters more than packet count.
        if let Err(e) = stream.set_nodelay(true) {
            debug!("could not set TCP_NODELAY: {e}");
        }

        Ok(Box::new(TcpPeerConnection { stream }))
    }
}

/// One outbound TCP connection.  Dropping it closes the socket.
#[derive(Debug)]
pub struct TcpPeerConnection {
    stream: TcpStream,
}

#[async_trait]
impl PeerConnection for TcpPeerConnection {
    async fn send_frame(&mut self, content: &str) -> Result<(), LinkError> {
        write_frame(&mut self.stream, content).await?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clipsync_core::read_frame;
    use tokio::net::TcpListener;

    fn loopback(port: u16) -> PeerAddress {
        PeerAddress {
            host: "127.0.0.1".to_string(),
            port,
        }
    }

    #[tokio::test]
    async fn test_dialer_connects_and_sends_frames() {
        // Arrange
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let dialer = TcpDialer::new(loopback(port));

        // Act
        let mut conn = dialer.connect().await.unwrap();
        let (mut accepted, _) = listener.accept().await.unwrap();
        conn.send_frame("over tcp").await.unwrap();
        conn.send_frame("").await.unwrap();

        // Assert
        assert_eq!(read_frame(&mut accepted).await.unwrap(), "over tcp");
        assert_eq!(read_frame(&mut accepted).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_dialer_reports_refused_connection() {
        // Arrange: bind then drop to get a port nobody listens on
        let port = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap().port()
        };
        let dialer = TcpDialer::new(loopback(port));

        // Act
        let result = dialer.connect().await;

        // Assert
        assert!(matches!(result, Err(LinkError::Connect { .. })));
    }

    #[test]
    fn test_target_formats_ipv6_with_brackets() {
        let dialer = TcpDialer::new(PeerAddress {
            host: "::1".to_string(),
            port: 9999,
        });
        assert_eq!(dialer.target(), "[::1]:9999");
    }
}
