pub mod field_model;
pub mod identity;
pub mod suggestion;

pub use field_model::{
    CheckboxState, DetectedFieldBatch, FieldDescriptor, FieldKind, FieldOption,
    InteractionHint, StructuralPattern, TriggerControl,
};
pub use suggestion::{NestedSection, SuggestedValue, Suggestion, load_suggestions};
