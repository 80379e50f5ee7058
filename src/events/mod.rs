pub mod keyboard;
pub mod window;

pub use keyboard::{parse_key_script, KeyInput};
pub use window::{RawWindow, WindowId, WindowRecord};
