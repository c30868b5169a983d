//! Writing suggested values back into live fields.

pub mod applicator;
pub mod highlight;
pub mod interaction;
pub mod locator;
pub mod outcome;
pub mod question_form;

pub use applicator::Applicator;
pub use highlight::{HIGHLIGHT_CLASS, HighlightTracker};
pub use locator::{Locator, Target, resolve_target};
pub use outcome::{ApplyAllReport, ApplySummary, FillOutcome, ValueOutcome};
