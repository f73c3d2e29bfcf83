//! Clipboard adapters.
//!
//! - **`arboard`** – the system clipboard, used by the binary.
//! - **`mock`** – an in-memory clipboard for tests.

mod arboard;
pub mod mock;

pub use self::arboard::ArboardClipboard;
pub use mock::MockClipboard;

use std::sync::Arc;

use crate::application::clipboard::ClipboardAccess;

/// Creates the system clipboard adapter.
pub fn create_clipboard() -> Arc<dyn ClipboardAccess> {
    Arc::new(ArboardClipboard::new())
}
