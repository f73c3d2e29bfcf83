//! Shared state and policies for the peer engine.
//!
//! Everything here is pure in-process logic: no sockets, no clipboard, no
//! configuration files.  The peer's tasks (watcher, inbound handlers,
//! outbound connector) only ever share the types in this module.
//!
//! # Sub-modules
//!
//! - **`tracking`** – The echo-suppression cell written by inbound handlers
//!   and read by the clipboard watcher.
//! - **`outbox`** – The capacity-one, last-writer-wins hand-off between the
//!   watcher and the outbound connector.
//! - **`backoff`** – Exponential reconnect delay with a floor and a cap.

pub mod backoff;
pub mod outbox;
pub mod tracking;
