//! Infrastructure layer for clipsync-peer.
//!
//! Contains everything that touches the outside world: the OS clipboard,
//! TCP sockets, and the configuration file.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain`, and
//! `clipsync_core`, but MUST NOT be imported by the `application` or domain
//! layers.
//!
//! # Sub-modules
//!
//! - **`clipboard`** – `arboard`-backed system clipboard plus an in-memory
//!   `MockClipboard` for tests.
//! - **`network`** – the inbound listener and the outbound TCP dialer.
//! - **`storage`** – TOML configuration file loading.
//! - **`runtime`** – binds the listener and runs the watcher, listener, and
//!   connector tasks together.

pub mod clipboard;
pub mod network;
pub mod runtime;
pub mod storage;

pub use runtime::{run_peer, serve};
