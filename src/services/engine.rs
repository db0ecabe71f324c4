use crate::capabilities::{ClipboardAccess, TextInjector};
use crate::config::Config;
use crate::dictionary::{ReplacementDictionary, ReplacementSource};
use crate::error::{Result, RetextError};
use crate::events::{KeyInput, PointerPosition};
use crate::services::{
    ClipboardWatcher, KeystrokeMonitor, MonitorTask, PointerActivityMonitor, Replacer,
};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Bound on how long `stop()` waits for the monitor tasks to exit.
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Mutable state shared between the monitor loops and the controller.
///
/// The dictionary cell is pointer-swapped: readers clone the `Arc` at each
/// decision point and are never blocked for longer than the swap. Both flags
/// are atomics; the pointer flag is consumed with test-and-clear semantics so
/// a signal is neither lost nor consumed twice.
pub struct EngineShared {
    dictionary: RwLock<Arc<ReplacementDictionary>>,
    paused: AtomicBool,
    pointer_moved: AtomicBool,
}

impl EngineShared {
    pub fn new(dictionary: ReplacementDictionary) -> Self {
        Self {
            dictionary: RwLock::new(Arc::new(dictionary)),
            paused: AtomicBool::new(false),
            pointer_moved: AtomicBool::new(false),
        }
    }

    /// Snapshot of the current dictionary.
    pub fn dictionary(&self) -> Arc<ReplacementDictionary> {
        self.dictionary.read().clone()
    }

    /// Atomically publishes a new dictionary; in-flight readers keep their
    /// snapshot of the old one.
    pub fn publish(&self, dictionary: ReplacementDictionary) {
        *self.dictionary.write() = Arc::new(dictionary);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Returns the previous value.
    pub fn set_paused(&self, paused: bool) -> bool {
        self.paused.swap(paused, Ordering::SeqCst)
    }

    pub fn flag_pointer_moved(&self) {
        self.pointer_moved.store(true, Ordering::SeqCst);
    }

    /// Test-and-clear consumption of one significant-movement signal.
    pub fn take_pointer_moved(&self) -> bool {
        self.pointer_moved.swap(false, Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn pointer_moved(&self) -> bool {
        self.pointer_moved.load(Ordering::SeqCst)
    }
}

struct RunningLoops {
    token: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

/// The replacement engine controller: owns the shared state, the replacement
/// executor and the monitor lifecycles, and exposes pause/reload to the
/// controlling layer.
pub struct Engine {
    shared: Arc<EngineShared>,
    replacer: Arc<Replacer>,
    source: Arc<dyn ReplacementSource>,
    poll_interval: Duration,
    movement_threshold: i32,
    running: Mutex<Option<RunningLoops>>,
}

impl Engine {
    /// Loads the initial dictionary from the source. A load failure, or an
    /// empty dictionary, is fatal: the engine is not constructed.
    pub fn new(
        config: &Config,
        clipboard: Arc<dyn ClipboardAccess>,
        injector: Arc<dyn TextInjector>,
        source: Arc<dyn ReplacementSource>,
    ) -> Result<Self> {
        info!("Loading replacement data from {}", source.describe());
        let dictionary = source.load()?;
        if dictionary.is_empty() {
            return RetextError::data_source(format!(
                "No replacement data in {}; refusing to start",
                source.describe()
            ));
        }
        info!("Loaded {}", dictionary);

        let replacer = Arc::new(Replacer::new(
            clipboard,
            injector,
            config.replacement.before.clone(),
            config.replacement.after.clone(),
        ));

        Ok(Self {
            shared: Arc::new(EngineShared::new(dictionary)),
            replacer,
            source,
            poll_interval: Duration::from_millis(config.clipboard.poll_interval_ms),
            movement_threshold: config.pointer.movement_threshold,
            running: Mutex::new(None),
        })
    }

    /// Starts the keystroke, clipboard and pointer loops as independently
    /// cancellable tasks. Fails if the engine is already running, so hooks
    /// are never registered twice.
    pub fn start(
        &self,
        key_events: mpsc::Receiver<KeyInput>,
        pointer_events: mpsc::Receiver<PointerPosition>,
    ) -> Result<()> {
        let mut running = self.running.lock();
        if running.is_some() {
            return Err(RetextError::AlreadyRunning);
        }

        let token = CancellationToken::new();
        let keystrokes =
            KeystrokeMonitor::new(self.shared.clone(), self.replacer.clone(), key_events);
        let watcher = ClipboardWatcher::new(
            self.shared.clone(),
            self.replacer.clone(),
            self.poll_interval,
        );
        let pointer = PointerActivityMonitor::new(
            self.shared.clone(),
            pointer_events,
            self.movement_threshold,
        );

        let loops: Vec<Box<dyn MonitorTask>> =
            vec![Box::new(keystrokes), Box::new(watcher), Box::new(pointer)];
        let handles = loops
            .into_iter()
            .map(|task| tokio::spawn(task.run(token.child_token())))
            .collect();
        *running = Some(RunningLoops { token, handles });

        info!("Engine started");
        Ok(())
    }

    /// Signals every loop to exit and waits (bounded) until they have, so a
    /// subsequent `start()` cannot double-register a hook.
    pub async fn stop(&self) {
        let Some(loops) = self.running.lock().take() else {
            debug!("stop() called while engine is not running");
            return;
        };

        loops.token.cancel();
        let join_all = async {
            for handle in loops.handles {
                let _ = handle.await;
            }
        };
        match tokio::time::timeout(STOP_TIMEOUT, join_all).await {
            Ok(()) => info!("Engine stopped"),
            Err(_) => warn!("Timed out waiting for monitor loops to stop"),
        }
    }

    #[allow(dead_code)]
    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Hot-swaps the dictionary without touching the running loops.
    #[allow(dead_code)]
    pub fn reload(&self, dictionary: ReplacementDictionary) {
        info!("Reloading dictionary: {}", dictionary);
        self.shared.publish(dictionary);
    }

    /// Re-invokes the source. Failure (or an empty result) keeps the previous
    /// dictionary and is not an engine failure.
    pub fn reload_from_source(&self) {
        match self.source.load() {
            Ok(dictionary) if !dictionary.is_empty() => {
                info!(
                    "Reloaded {} from {}",
                    dictionary,
                    self.source.describe()
                );
                self.shared.publish(dictionary);
            }
            Ok(_) => warn!(
                "Reload from {} produced no data; keeping previous dictionary",
                self.source.describe()
            ),
            Err(e) => warn!(
                "Reload from {} failed: {}; keeping previous dictionary",
                self.source.describe(),
                e
            ),
        }
    }

    /// Returns the previous pause state.
    pub fn set_paused(&self, paused: bool) -> bool {
        let previous = self.shared.set_paused(paused);
        if previous != paused {
            info!("Engine {}", if paused { "paused" } else { "resumed" });
        }
        previous
    }

    pub fn is_paused(&self) -> bool {
        self.shared.is_paused()
    }

    /// Snapshot of the current dictionary.
    #[allow(dead_code)]
    pub fn dictionary(&self) -> Arc<ReplacementDictionary> {
        self.shared.dictionary()
    }
}
