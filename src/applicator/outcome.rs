use serde::Serialize;

use crate::error::FillError;

/// Result of one value in an array fill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueOutcome {
    pub value: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FillError>,
}

/// Result of applying one suggestion (or one nested section).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillOutcome {
    pub field: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FillError>,
    /// Retained in the pending queue until the field appears.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub pending: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub used_shadow_scope: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ValueOutcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<FillOutcome>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl FillOutcome {
    pub fn filled(field: &str) -> Self {
        FillOutcome {
            field: field.to_string(),
            success: true,
            error: None,
            pending: false,
            used_shadow_scope: false,
            values: vec![],
            sections: vec![],
            message: String::new(),
        }
    }

    pub fn failed(field: &str, error: FillError) -> Self {
        FillOutcome {
            success: false,
            error: Some(error),
            ..FillOutcome::filled(field)
        }
    }

    /// Not found yet; kept for a later reconciliation pass.
    pub fn deferred(field: &str) -> Self {
        FillOutcome {
            pending: true,
            ..FillOutcome::failed(
                field,
                FillError::TargetNotFound {
                    field: field.to_string(),
                },
            )
        }
    }

    pub fn shadow_scope(mut self, used: bool) -> Self {
        self.used_shadow_scope = used;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Aggregate of a sequential multi-suggestion application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyAllReport {
    pub results: Vec<FillOutcome>,
    pub summary: ApplySummary,
}

impl ApplyAllReport {
    pub fn from_results(results: Vec<FillOutcome>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        ApplyAllReport {
            summary: ApplySummary {
                total: results.len(),
                succeeded,
                failed: results.len() - succeeded,
            },
            results,
        }
    }
}
