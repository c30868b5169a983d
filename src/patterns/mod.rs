//! Structural heuristics: array-entry fields and section trigger controls.

pub mod array;
pub mod trigger;

pub use array::{ArrayPattern, detect_array_pattern, find_add_control};
pub use trigger::{TriggerMatcher, detect_triggers};
