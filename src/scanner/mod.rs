//! Field detection: walks the document (including encapsulated component
//! internals and the question-form page variant) into field descriptors.

pub mod custom;
pub mod question_form;
pub mod scanner;

pub use scanner::{Scanner, is_question_form, merge_passes};
