//! # clipsync-core
//!
//! Shared library for clipsync containing the wire codec and the small
//! concurrency primitives the peer engine is built from.
//!
//! This crate has no dependencies on OS clipboards, sockets, or configuration
//! files.  It only relies on tokio's I/O traits and synchronisation types, so
//! every piece can be exercised with in-memory streams and a paused clock.
//!
//! # Architecture overview
//!
//! clipsync keeps one text clipboard value in sync between exactly two peers.
//! Each peer polls its local clipboard, pushes genuine local changes to the
//! other side, and applies whatever the other side pushes to it.
//!
//! - **`protocol`** – How bytes travel over the network.  Every frame is a
//!   4-byte big-endian length followed by that many bytes of UTF-8 text.  A
//!   zero-length frame is a keepalive.
//!
//! - **`domain`** – The shared state that ties the peer's tasks together:
//!   the [`TrackingCell`] that suppresses echoes, the [`Outbox`] that
//!   coalesces bursts of local edits into one pending value, and the
//!   [`Backoff`] policy used between failed connection attempts.

pub mod domain;
pub mod protocol;

pub use domain::backoff::{Backoff, DEFAULT_BACKOFF_CAP, DEFAULT_BACKOFF_FLOOR};
pub use domain::outbox::{DepositOutcome, Outbox};
pub use domain::tracking::TrackingCell;
pub use protocol::frame::{decode_frame, encode_frame, FrameError, MAX_FRAME_SIZE};
pub use protocol::stream::{read_frame, write_frame};
