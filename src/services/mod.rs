pub mod clipboard_watcher;
pub mod engine;
pub mod keystroke_monitor;
pub mod pointer_monitor;
pub mod replacer;
mod r#trait;

pub use clipboard_watcher::ClipboardWatcher;
pub use engine::Engine;
pub use keystroke_monitor::KeystrokeMonitor;
pub use pointer_monitor::PointerActivityMonitor;
pub use r#trait::MonitorTask;
pub use replacer::Replacer;
