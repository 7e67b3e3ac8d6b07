//! Input events: keys and modifiers, decoupled from crossterm.

pub mod input;

pub use input::{Key, KeyEvent, Modifiers};
