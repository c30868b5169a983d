use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    applicator::FillOutcome,
    error::FillError,
    field::{
        field_model::{InteractionHint, StructuralPattern},
        suggestion::Suggestion,
    },
};

/// One line of the fill trace: what was asked and how it went.
#[derive(Debug, Serialize)]
pub struct FillTraceEvent {
    pub timestamp_ms: u128,
    pub identifier: String,
    pub pattern: StructuralPattern,
    pub hint: InteractionHint,

    pub success: bool,
    pub pending: bool,
    pub used_shadow_scope: bool,

    pub error: Option<FillError>,
    pub message: Option<String>,
}

impl FillTraceEvent {
    pub fn now(suggestion: &Suggestion) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0),
            identifier: suggestion.identifier.clone(),
            pattern: suggestion.pattern,
            hint: suggestion.hint,
            success: false,
            pending: false,
            used_shadow_scope: false,
            error: None,
            message: None,
        }
    }

    pub fn with_outcome(mut self, outcome: &FillOutcome) -> Self {
        self.success = outcome.success;
        self.pending = outcome.pending;
        self.used_shadow_scope = outcome.used_shadow_scope;
        self.error = outcome.error.clone();
        self.message = (!outcome.message.is_empty()).then(|| outcome.message.clone());
        self
    }
}
