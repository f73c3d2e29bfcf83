//! TCP networking.
//!
//! - **`listener`** – binds the local port, accepts connections from the
//!   peer, and applies every received frame.
//! - **`tcp_link`** – the outbound [`PeerDialer`](crate::application::sync_outbound::PeerDialer)
//!   used by the connector.

pub mod listener;
pub mod tcp_link;

pub use listener::{bind_listener, run_listener, NetworkError};
pub use tcp_link::{TcpDialer, TcpPeerConnection};
