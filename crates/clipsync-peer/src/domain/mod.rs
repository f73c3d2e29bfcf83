//! Domain layer for clipsync-peer.
//!
//! Pure types with no I/O: the dial target for the other peer and the
//! runtime settings every task is built from.
//!
//! # What does NOT belong here?
//!
//! - Sockets, clipboards, or anything that awaits
//! - Reading files or environment variables (that is `infrastructure::storage`
//!   and `main.rs`)

pub mod address;
pub mod settings;

pub use address::{normalize_peer_addr, AddressError, PeerAddress};
pub use settings::{
    parse_duration, ConnectorSettings, PeerSettings, DEFAULT_LISTEN_PORT, INBOUND_IDLE_KEEPALIVES,
};
