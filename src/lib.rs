//! Field detection and autofill for live documents.
//!
//! Detection walks a document (including encapsulated component subtrees
//! and question-form pages) into [`field::FieldDescriptor`]s. Application
//! writes suggested values back, simulating enough interaction for the
//! page's own reactive logic, and keeps unresolved suggestions pending until
//! their fields appear.

pub mod applicator;
pub mod cli;
pub mod component;
pub mod dom;
pub mod error;
pub mod field;
pub mod patterns;
pub mod reconciler;
pub mod scanner;
pub mod session;
pub mod timing;
pub mod trace;

pub use error::{AutofillError, FillError};
pub use session::AutofillSession;
