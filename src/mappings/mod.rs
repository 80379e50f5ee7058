pub mod keysym;

pub use keysym::KeysymToInput;
