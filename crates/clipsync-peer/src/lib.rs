//! clipsync-peer library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does a peer do?
//!
//! Two machines each run one peer pointed at the other.  Each peer:
//!
//! 1. Polls its local clipboard and notices when the user copies new text.
//! 2. Pushes that text to the other peer over a TCP connection it keeps open,
//!    reconnecting with backoff when the network drops.
//! 3. Accepts the other peer's connection and writes whatever arrives into
//!    the local clipboard.
//! 4. Remembers the last value it received so that, when step 1 sees that
//!    value appear locally, it is not sent straight back.  Without this the
//!    two peers would bounce every value between them forever.
//!
//! # Layers
//!
//! ```text
//! [clipsync-peer]
//!   ├── domain/           Peer address, runtime settings
//!   ├── application/      Watcher, apply-remote, outbound connector
//!   └── infrastructure/
//!         ├── clipboard/  arboard adapter, in-memory mock
//!         ├── network/    TCP listener and dialer
//!         ├── storage/    TOML config file
//!         └── runtime     wires everything together
//! ```

/// Domain layer: pure types (no I/O).
pub mod domain;

/// Application layer: the peer's use cases.
pub mod application;

/// Infrastructure layer: clipboard, network, and config adapters.
pub mod infrastructure;
