use crate::services::engine::EngineShared;
use crate::services::{MonitorTask, Replacer};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Fixed-interval poll loop: inspects the clipboard each tick and, on an
/// exact trigger match, pastes the expansion.
pub struct ClipboardWatcher {
    shared: Arc<EngineShared>,
    replacer: Arc<Replacer>,
    poll_interval: Duration,
}

impl ClipboardWatcher {
    pub fn new(shared: Arc<EngineShared>, replacer: Arc<Replacer>, poll_interval: Duration) -> Self {
        Self {
            shared,
            replacer,
            poll_interval,
        }
    }

    pub async fn run(self, token: CancellationToken) {
        info!(
            "Clipboard watcher started (interval {} ms)",
            self.poll_interval.as_millis()
        );

        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => self.tick(),
            }
        }

        info!("Clipboard watcher stopped");
    }

    fn tick(&self) {
        // Pause suppresses the action only; polling keeps running.
        if self.shared.is_paused() {
            return;
        }

        let dictionary = self.shared.dictionary();
        match self.replacer.try_replace_clipboard(&dictionary) {
            Ok(true) => debug!("Clipboard replacement performed"),
            Ok(false) => {}
            // A failed tick never terminates the watcher.
            Err(e) => warn!("Clipboard tick failed: {}", e),
        }
    }
}

#[async_trait::async_trait]
impl MonitorTask for ClipboardWatcher {
    async fn run(self: Box<Self>, token: CancellationToken) {
        (*self).run(token).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::memory::{MemoryClipboard, RecordingInjector};
    use crate::capabilities::ClipboardAccess;
    use crate::dictionary::ReplacementDictionary;

    fn watcher_parts() -> (
        Arc<EngineShared>,
        Arc<MemoryClipboard>,
        Arc<RecordingInjector>,
        ClipboardWatcher,
    ) {
        let dictionary = ReplacementDictionary::from_pairs([("brb", "be right back")]);
        let shared = Arc::new(EngineShared::new(dictionary));
        let clipboard = Arc::new(MemoryClipboard::new());
        let injector = Arc::new(RecordingInjector::new());
        let replacer = Arc::new(Replacer::new(
            clipboard.clone(),
            injector.clone(),
            "".to_string(),
            " ".to_string(),
        ));
        let watcher = ClipboardWatcher::new(shared.clone(), replacer, Duration::from_millis(10));
        (shared, clipboard, injector, watcher)
    }

    #[tokio::test]
    async fn test_matching_clipboard_triggers_paste() {
        let (_shared, clipboard, injector, watcher) = watcher_parts();
        clipboard.write_text("brb").unwrap();

        let token = CancellationToken::new();
        let handle = tokio::spawn(watcher.run(token.clone()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
        handle.await.unwrap();

        // Replaced exactly once: after the first hit the clipboard holds the
        // expansion, which is not a trigger.
        assert_eq!(injector.paste_count(), 1);
        assert_eq!(
            clipboard.read_text().unwrap(),
            Some("be right back".to_string())
        );
    }

    #[tokio::test]
    async fn test_pause_suppresses_action_not_polling() {
        let (shared, clipboard, injector, watcher) = watcher_parts();
        shared.set_paused(true);
        clipboard.write_text("brb").unwrap();

        let token = CancellationToken::new();
        let handle = tokio::spawn(watcher.run(token.clone()));

        // Several ticks elapse while paused: no write may occur.
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(injector.paste_count(), 0);
        assert_eq!(clipboard.read_text().unwrap(), Some("brb".to_string()));

        // Unpausing lets the next tick fire exactly once.
        shared.set_paused(false);
        tokio::time::sleep(Duration::from_millis(60)).await;
        token.cancel();
        handle.await.unwrap();

        assert_eq!(injector.paste_count(), 1);
    }

    #[tokio::test]
    async fn test_capability_error_keeps_watcher_alive() {
        let (_shared, clipboard, injector, watcher) = watcher_parts();
        clipboard.write_text("brb").unwrap();
        clipboard.set_failing(true);

        let token = CancellationToken::new();
        let handle = tokio::spawn(watcher.run(token.clone()));

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(injector.paste_count(), 0);

        // Once the clipboard recovers, the loop is still running and fires.
        clipboard.set_failing(false);
        tokio::time::sleep(Duration::from_millis(40)).await;
        token.cancel();
        handle.await.unwrap();

        assert_eq!(injector.paste_count(), 1);
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_poll_sleep() {
        let dictionary = ReplacementDictionary::from_pairs([("k", "v")]);
        let shared = Arc::new(EngineShared::new(dictionary));
        let clipboard = Arc::new(MemoryClipboard::new());
        let injector = Arc::new(RecordingInjector::new());
        let replacer = Arc::new(Replacer::new(
            clipboard,
            injector,
            "".to_string(),
            " ".to_string(),
        ));
        // A very long interval: stop must not wait for the next tick.
        let watcher = ClipboardWatcher::new(shared, replacer, Duration::from_secs(3600));

        let token = CancellationToken::new();
        let handle = tokio::spawn(watcher.run(token.clone()));
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("watcher must stop promptly on cancellation")
            .unwrap();
    }
}
