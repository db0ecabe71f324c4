use crate::capabilities::{ClipboardAccess, TextInjector};
use crate::dictionary::ReplacementDictionary;
use crate::error::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

/// Executes replacement actions and serializes every clipboard-touching
/// sequence behind a single gate, so the keystroke-commit path and the
/// clipboard poll tick can never interleave mid-operation.
pub struct Replacer {
    clipboard: Arc<dyn ClipboardAccess>,
    injector: Arc<dyn TextInjector>,
    before: String,
    after: String,
    gate: Mutex<()>,
}

impl Replacer {
    pub fn new(
        clipboard: Arc<dyn ClipboardAccess>,
        injector: Arc<dyn TextInjector>,
        before: String,
        after: String,
    ) -> Self {
        Self {
            clipboard,
            injector,
            before,
            after,
            gate: Mutex::new(()),
        }
    }

    /// Replaces a typed word: erases the word plus the trigger key, types the
    /// before-literal, pastes the expansion via the clipboard and types the
    /// after-literal.
    pub fn replace_word(&self, word: &str, expansion: &str) -> Result<()> {
        let _gate = self.gate.lock();
        self.perform(word, expansion)
    }

    /// Commit step for a clipboard selection: if the trimmed clipboard text
    /// is a trigger, replaces it and clears the clipboard. Returns whether
    /// the replacement fired.
    pub fn try_replace_selection(&self, dictionary: &ReplacementDictionary) -> Result<bool> {
        let _gate = self.gate.lock();

        let Some(text) = self.clipboard.read_text()? else {
            return Ok(false);
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }
        let Some(expansion) = dictionary.get(trimmed) else {
            return Ok(false);
        };

        self.perform(trimmed, expansion)?;
        self.clipboard.write_text("")?;
        Ok(true)
    }

    /// Poll-tick replacement: if the trimmed clipboard text is a trigger,
    /// overwrites the clipboard with the expansion and presses paste.
    /// Returns whether the replacement fired.
    pub fn try_replace_clipboard(&self, dictionary: &ReplacementDictionary) -> Result<bool> {
        let _gate = self.gate.lock();

        let Some(text) = self.clipboard.read_text()? else {
            return Ok(false);
        };
        let Some(expansion) = dictionary.get(text.trim()) else {
            return Ok(false);
        };

        info!("Clipboard trigger '{}' matched, pasting expansion", text.trim());
        self.clipboard.write_text(expansion)?;
        self.injector.press_paste()?;
        Ok(true)
    }

    fn perform(&self, word: &str, expansion: &str) -> Result<()> {
        info!("Replacing '{}' with {} character(s)", word, expansion.chars().count());

        // The word itself plus the commit key that was just pressed.
        let erase = "\u{8}".repeat(word.chars().count() + 1);
        self.injector.write_text(&erase)?;
        self.injector.write_text(&self.before)?;

        // Multi-line expansions go through the clipboard, not literal typing.
        self.clipboard.write_text(expansion)?;
        self.injector.press_paste()?;

        self.injector.write_text(&self.after)?;
        debug!("Replacement of '{}' complete", word);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::memory::{InjectedOp, MemoryClipboard, RecordingInjector};

    fn replacer_with(
        clipboard: Arc<MemoryClipboard>,
        injector: Arc<RecordingInjector>,
    ) -> Replacer {
        Replacer::new(clipboard, injector, "".to_string(), " ".to_string())
    }

    #[test]
    fn test_replace_word_action_sequence() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let injector = Arc::new(RecordingInjector::new());
        let replacer = replacer_with(clipboard.clone(), injector.clone());

        replacer.replace_word("brb", "be right back").unwrap();

        assert_eq!(
            injector.ops(),
            vec![
                // Three word characters plus the commit key.
                InjectedOp::Text("\u{8}".repeat(4)),
                InjectedOp::Text("".to_string()),
                InjectedOp::Paste,
                InjectedOp::Text(" ".to_string()),
            ]
        );
        assert_eq!(
            clipboard.read_text().unwrap(),
            Some("be right back".to_string())
        );
    }

    #[test]
    fn test_before_after_literals() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let injector = Arc::new(RecordingInjector::new());
        let replacer = Replacer::new(
            clipboard,
            injector.clone(),
            ">>".to_string(),
            "<<".to_string(),
        );

        replacer.replace_word("x", "y").unwrap();

        let ops = injector.ops();
        assert_eq!(ops[1], InjectedOp::Text(">>".to_string()));
        assert_eq!(ops[3], InjectedOp::Text("<<".to_string()));
    }

    #[test]
    fn test_selection_replacement_clears_clipboard() {
        let clipboard = Arc::new(MemoryClipboard::with_text("  brb  "));
        let injector = Arc::new(RecordingInjector::new());
        let replacer = replacer_with(clipboard.clone(), injector.clone());
        let dict = ReplacementDictionary::from_pairs([("brb", "be right back")]);

        assert!(replacer.try_replace_selection(&dict).unwrap());
        assert_eq!(clipboard.read_text().unwrap(), Some("".to_string()));
        assert_eq!(injector.paste_count(), 1);
    }

    #[test]
    fn test_selection_miss_leaves_clipboard_alone() {
        let clipboard = Arc::new(MemoryClipboard::with_text("nothing"));
        let injector = Arc::new(RecordingInjector::new());
        let replacer = replacer_with(clipboard.clone(), injector.clone());
        let dict = ReplacementDictionary::from_pairs([("brb", "be right back")]);

        assert!(!replacer.try_replace_selection(&dict).unwrap());
        assert_eq!(clipboard.read_text().unwrap(), Some("nothing".to_string()));
        assert_eq!(injector.paste_count(), 0);
    }

    #[test]
    fn test_empty_selection_does_not_fire() {
        let clipboard = Arc::new(MemoryClipboard::with_text("   "));
        let injector = Arc::new(RecordingInjector::new());
        let replacer = replacer_with(clipboard, injector.clone());
        let dict = ReplacementDictionary::from_pairs([("brb", "x")]);

        assert!(!replacer.try_replace_selection(&dict).unwrap());
        assert!(injector.ops().is_empty());
    }

    #[test]
    fn test_clipboard_tick_overwrites_and_pastes() {
        let clipboard = Arc::new(MemoryClipboard::with_text("brb"));
        let injector = Arc::new(RecordingInjector::new());
        let replacer = replacer_with(clipboard.clone(), injector.clone());
        let dict = ReplacementDictionary::from_pairs([("brb", "be right back")]);

        assert!(replacer.try_replace_clipboard(&dict).unwrap());
        assert_eq!(
            clipboard.read_text().unwrap(),
            Some("be right back".to_string())
        );
        assert_eq!(injector.ops(), vec![InjectedOp::Paste]);

        // The expansion now on the clipboard is not a trigger, so the next
        // tick does nothing.
        assert!(!replacer.try_replace_clipboard(&dict).unwrap());
        assert_eq!(injector.paste_count(), 1);
    }

    #[test]
    fn test_read_failure_propagates_as_capability_error() {
        let clipboard = Arc::new(MemoryClipboard::with_text("brb"));
        let injector = Arc::new(RecordingInjector::new());
        let replacer = replacer_with(clipboard.clone(), injector);
        let dict = ReplacementDictionary::from_pairs([("brb", "x")]);

        clipboard.set_failing(true);
        assert!(replacer.try_replace_clipboard(&dict).is_err());
    }
}
