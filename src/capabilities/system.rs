use super::{ClipboardAccess, TextInjector};
use crate::error::{Result, RetextError};
use arboard::Clipboard;
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use parking_lot::Mutex;
use tracing::{debug, info};

/// Clipboard adapter backed by `arboard`.
pub struct SystemClipboard {
    // arboard needs &mut self; the engine shares the adapter between loops.
    inner: Mutex<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        info!("Initializing system clipboard adapter");
        let clipboard = Clipboard::new()
            .map_err(|e| RetextError::Clipboard(format!("Failed to open clipboard: {}", e)))?;
        Ok(Self {
            inner: Mutex::new(clipboard),
        })
    }
}

impl ClipboardAccess for SystemClipboard {
    fn read_text(&self) -> Result<Option<String>> {
        match self.inner.lock().get_text() {
            Ok(text) => Ok(Some(text)),
            // No text format on the clipboard is a normal condition, not an error.
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(RetextError::Clipboard(format!(
                "Failed to read clipboard: {}",
                e
            ))),
        }
    }

    fn write_text(&self, text: &str) -> Result<()> {
        self.inner.lock().set_text(text).map_err(|e| {
            RetextError::Clipboard(format!("Failed to write clipboard: {}", e))
        })
    }
}

/// Text injector backed by `enigo`.
pub struct SystemInjector {
    inner: Mutex<Enigo>,
}

impl SystemInjector {
    pub fn new() -> Result<Self> {
        info!("Initializing system text injector");
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| RetextError::Injection(format!("Failed to initialize enigo: {}", e)))?;
        Ok(Self {
            inner: Mutex::new(enigo),
        })
    }
}

impl TextInjector for SystemInjector {
    fn write_text(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        debug!("Injecting {} character(s)", text.chars().count());
        self.inner
            .lock()
            .text(text)
            .map_err(|e| RetextError::Injection(format!("Failed to type text: {}", e)))
    }

    fn press_paste(&self) -> Result<()> {
        let mut enigo = self.inner.lock();
        enigo
            .key(Key::Control, Direction::Press)
            .map_err(|e| RetextError::Injection(format!("Failed to press ctrl: {}", e)))?;
        let result = enigo
            .key(Key::Unicode('v'), Direction::Click)
            .map_err(|e| RetextError::Injection(format!("Failed to press v: {}", e)));
        // Release ctrl even when the click failed, otherwise the modifier
        // stays latched in the focused application.
        enigo
            .key(Key::Control, Direction::Release)
            .map_err(|e| RetextError::Injection(format!("Failed to release ctrl: {}", e)))?;
        result
    }
}
