mod buffer;
mod monitor;

pub use buffer::{BufferState, KeystrokeBuffer};
pub use monitor::KeystrokeMonitor;
