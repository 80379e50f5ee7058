pub mod activation;
pub mod grab;
pub mod switcher;
pub mod window_system;

pub use switcher::{Switcher, SETUP_FAILURE_EXIT};
pub use window_system::create_window_system;
