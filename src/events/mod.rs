pub mod keyboard;
pub mod pointer;

pub use keyboard::{KeyClass, KeyInput};
pub use pointer::PointerPosition;
