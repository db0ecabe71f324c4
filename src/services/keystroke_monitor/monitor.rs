use crate::error::Result;
use crate::events::{KeyClass, KeyInput};
use crate::services::engine::EngineShared;
use crate::services::{MonitorTask, Replacer};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::buffer::KeystrokeBuffer;

/// Event-driven loop over raw key events: accumulates typed characters and
/// runs the commit algorithm on `space`/`enter`.
pub struct KeystrokeMonitor {
    shared: Arc<EngineShared>,
    replacer: Arc<Replacer>,
    buffer: KeystrokeBuffer,
    events: mpsc::Receiver<KeyInput>,
}

impl KeystrokeMonitor {
    pub fn new(
        shared: Arc<EngineShared>,
        replacer: Arc<Replacer>,
        events: mpsc::Receiver<KeyInput>,
    ) -> Self {
        Self {
            shared,
            replacer,
            buffer: KeystrokeBuffer::new(),
            events,
        }
    }

    pub async fn run(mut self, token: CancellationToken) {
        info!("Keystroke monitor started");

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                event = self.events.recv() => match event {
                    Some(event) => {
                        // A single bad event must never terminate the monitor.
                        if let Err(e) = self.handle_event(&event) {
                            error!("Failed to handle key event {}: {}", event, e);
                        }
                    }
                    None => {
                        debug!("Key event source closed");
                        break;
                    }
                }
            }
        }

        info!("Keystroke monitor stopped");
    }

    fn handle_event(&mut self, event: &KeyInput) -> Result<()> {
        if !event.is_down {
            return Ok(());
        }
        if self.shared.is_paused() {
            return Ok(());
        }

        match event.classify() {
            KeyClass::Commit => self.commit()?,
            KeyClass::Backspace => {
                self.buffer.pop();
            }
            KeyClass::Text(c) => self.buffer.push(c),
            KeyClass::Ignored => {}
        }

        Ok(())
    }

    /// Commit algorithm, in priority order: clipboard selection, pointer
    /// invalidation, typed word. The buffer is cleared on every path.
    fn commit(&mut self) -> Result<()> {
        let dictionary = self.shared.dictionary();

        // 1. A clipboard selection that is itself a trigger wins over the
        //    typed buffer.
        match self.replacer.try_replace_selection(&dictionary) {
            Ok(true) => {
                self.buffer.clear();
                return Ok(());
            }
            Ok(false) => {}
            // Capability error: skip the selection path, the typed word can
            // still be evaluated.
            Err(e) => warn!("Clipboard selection check failed: {}", e),
        }

        // 2. Significant pointer movement since the last commit means the
        //    accumulated text is no longer one contiguous typed word.
        if self.shared.take_pointer_moved() {
            debug!("Discarding buffer after significant pointer movement");
            self.buffer.clear();
            return Ok(());
        }

        // 3. Typed word lookup.
        let word = self.buffer.word();
        let result = match dictionary.get(&word) {
            Some(expansion) => self.replacer.replace_word(&word, expansion),
            None => Ok(()),
        };
        self.buffer.clear();
        result
    }
}

#[async_trait::async_trait]
impl MonitorTask for KeystrokeMonitor {
    async fn run(self: Box<Self>, token: CancellationToken) {
        (*self).run(token).await;
    }
}
