pub mod keyboard;

pub use keyboard::{KeyState, Keyboard};
