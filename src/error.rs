use serde::Serialize;
use thiserror::Error;

use crate::field::field_model::StructuralPattern;

/// Per-field failure taxonomy. None of these abort a multi-value application;
/// they are collected into the aggregate report.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FillError {
    /// Field has neither a name nor an id (or the suggestion names nothing).
    #[error("field has no usable identifier")]
    IdentifierMissing,

    /// No live element resolves for the identifier.
    #[error("field '{field}' not found")]
    TargetNotFound { field: String },

    /// Disabled or read-only.
    #[error("field '{field}' is disabled or read-only")]
    TargetUnwritable { field: String },

    #[error("trigger '{trigger}' could not be activated after {attempts} attempts")]
    TriggerActivationFailed { trigger: String, attempts: u32 },

    /// A value shaped for one structural pattern applied under another.
    #[error("{shape} value cannot be applied as a {pattern} field")]
    StructuralMismatch {
        pattern: StructuralPattern,
        shape: String,
    },

    #[error("no option of '{field}' matches '{value}'")]
    OptionNotFound { field: String, value: String },
}

/// Process-level failures: loading documents, configs and suggestion files.
#[derive(Debug, Error)]
pub enum AutofillError {
    #[error("failed to read or write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Snapshot tree does not describe a valid document.
    #[error("invalid document snapshot: {0}")]
    Snapshot(String),

    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}
