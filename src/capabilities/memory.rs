use super::{ClipboardAccess, TextInjector};
use crate::error::{Result, RetextError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// In-memory clipboard used by dry-run mode and tests.
#[derive(Default)]
pub struct MemoryClipboard {
    content: Mutex<Option<String>>,
    fail: AtomicBool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn with_text(text: impl Into<String>) -> Self {
        let clipboard = Self::new();
        *clipboard.content.lock() = Some(text.into());
        clipboard
    }

    /// Makes every subsequent access fail, to exercise the capability-error
    /// paths.
    #[allow(dead_code)]
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RetextError::Clipboard("simulated clipboard failure".into()));
        }
        Ok(())
    }
}

impl ClipboardAccess for MemoryClipboard {
    fn read_text(&self) -> Result<Option<String>> {
        self.check()?;
        Ok(self.content.lock().clone())
    }

    fn write_text(&self, text: &str) -> Result<()> {
        self.check()?;
        *self.content.lock() = Some(text.to_string());
        Ok(())
    }
}

/// One step of an injected replacement action, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectedOp {
    Text(String),
    Paste,
}

/// Injector that records every operation instead of touching the OS.
#[derive(Default)]
pub struct RecordingInjector {
    ops: Mutex<Vec<InjectedOp>>,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn ops(&self) -> Vec<InjectedOp> {
        self.ops.lock().clone()
    }

    #[allow(dead_code)]
    pub fn paste_count(&self) -> usize {
        self.ops
            .lock()
            .iter()
            .filter(|op| matches!(op, InjectedOp::Paste))
            .count()
    }
}

impl TextInjector for RecordingInjector {
    fn write_text(&self, text: &str) -> Result<()> {
        info!("[dry-run] type {:?}", text);
        self.ops.lock().push(InjectedOp::Text(text.to_string()));
        Ok(())
    }

    fn press_paste(&self) -> Result<()> {
        info!("[dry-run] paste");
        self.ops.lock().push(InjectedOp::Paste);
        Ok(())
    }
}
