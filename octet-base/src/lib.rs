pub mod font;
pub mod instruction;
mod nibble_ints;
pub mod processor;
pub mod rom;
pub mod screen;

pub use nibble_ints::{UpperBoundExceededError, U12, U4};
