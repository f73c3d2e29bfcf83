//! Application layer use cases for a clipsync peer.
//!
//! # What use cases does a peer have?
//!
//! - **`watch_clipboard`** – Polls the local clipboard, ignores values that
//!   merely reflect what the peer just sent, and drops genuine local changes
//!   into the outbox.
//!
//! - **`apply_remote`** – Applies a value received from the peer to the
//!   local clipboard, marking it in the tracking cell first so the watcher
//!   does not send it straight back.
//!
//! - **`sync_outbound`** – Owns the single outbound connection: connects,
//!   reconnects with backoff, drains the outbox, and sends keepalives.
//!
//! The OS clipboard and the network are reached only through the traits in
//! `clipboard` and `sync_outbound`, so every use case runs against fakes in
//! tests.

pub mod apply_remote;
pub mod clipboard;
pub mod sync_outbound;
pub mod watch_clipboard;
