pub mod memory;
pub mod system;

use crate::error::Result;
use std::sync::Arc;

/// OS clipboard access. Both methods may fail with a capability error; the
/// monitor loops log those and continue.
pub trait ClipboardAccess: Send + Sync {
    /// Returns `None` when the clipboard holds no text format.
    fn read_text(&self) -> Result<Option<String>>;

    fn write_text(&self, text: &str) -> Result<()>;
}

/// Keystroke injection towards the focused application.
pub trait TextInjector: Send + Sync {
    /// Types the given text literally (including control characters such as
    /// backspace).
    fn write_text(&self, text: &str) -> Result<()>;

    /// Presses the platform paste shortcut.
    fn press_paste(&self) -> Result<()>;
}

/// Creates a clipboard adapter appropriate for the run mode.
pub fn create_clipboard(dry_run: bool) -> Result<Arc<dyn ClipboardAccess>> {
    if dry_run {
        Ok(Arc::new(memory::MemoryClipboard::new()))
    } else {
        Ok(Arc::new(system::SystemClipboard::new()?))
    }
}

/// Creates a text injector appropriate for the run mode.
pub fn create_injector(dry_run: bool) -> Result<Arc<dyn TextInjector>> {
    if dry_run {
        Ok(Arc::new(memory::RecordingInjector::new()))
    } else {
        Ok(Arc::new(system::SystemInjector::new()?))
    }
}
