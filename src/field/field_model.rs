use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::field::identity::fingerprint;

/// Semantic kind of a detected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Custom,
}

impl FieldKind {
    /// Map a script-level control type to its semantic kind. Anything
    /// text-like (email, tel, date, ...) is `Text`.
    pub fn from_input_type(input_type: &str) -> FieldKind {
        match input_type {
            "textarea" => FieldKind::Textarea,
            "select" | "select-one" | "select-multiple" => FieldKind::Select,
            "radio" => FieldKind::Radio,
            "checkbox" => FieldKind::Checkbox,
            _ => FieldKind::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Select => "select",
            FieldKind::Radio => "radio",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Custom => "custom",
        }
    }
}

/// How a field's value must be committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralPattern {
    #[default]
    Simple,
    Array,
    NestedArray,
}

impl StructuralPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            StructuralPattern::Simple => "simple",
            StructuralPattern::Array => "array",
            StructuralPattern::NestedArray => "nested_array",
        }
    }
}

impl fmt::Display for StructuralPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a field must be located and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionHint {
    #[default]
    Direct,
    TypeAndAdd,
    #[serde(alias = "shadow_dom")]
    ShadowScope,
    #[serde(alias = "google_forms")]
    QuestionForm,
}

impl InteractionHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionHint::Direct => "direct",
            InteractionHint::TypeAndAdd => "type_and_add",
            InteractionHint::ShadowScope => "shadow_scope",
            InteractionHint::QuestionForm => "question_form",
        }
    }
}

impl fmt::Display for InteractionHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

impl FieldOption {
    pub fn new(value: &str, label: &str) -> Self {
        FieldOption {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// "On" value and current state of a checkbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckboxState {
    pub value: String,
    pub checked: bool,
}

/// One detected input surface plus its identity and interaction metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Raw control type (`email`, `select-one`, `textarea`, ...).
    pub input_type: String,
    /// Name or id; the question text on question-form pages.
    pub identifier: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub element_id: String,
    pub label: String,
    pub placeholder: String,
    pub structural_pattern: StructuralPattern,
    pub interaction_hint: InteractionHint,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkbox: Option<CheckboxState>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_encapsulated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_control_text: Option<String>,
    pub fingerprint: String,
}

impl FieldDescriptor {
    pub fn new(kind: FieldKind, input_type: &str, identifier: &str, label: &str) -> Self {
        let mut field = FieldDescriptor {
            kind,
            input_type: input_type.to_string(),
            identifier: identifier.to_string(),
            element_id: String::new(),
            label: label.to_string(),
            placeholder: String::new(),
            structural_pattern: StructuralPattern::Simple,
            interaction_hint: InteractionHint::Direct,
            options: vec![],
            checkbox: None,
            is_encapsulated: false,
            component_tag: None,
            add_control_text: None,
            fingerprint: String::new(),
        };
        field.refresh_fingerprint();
        field
    }

    pub fn element_id(mut self, id: &str) -> Self {
        self.element_id = id.to_string();
        self
    }

    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub fn interaction(mut self, pattern: StructuralPattern, hint: InteractionHint) -> Self {
        self.structural_pattern = pattern;
        self.interaction_hint = hint;
        self
    }

    pub fn options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    pub fn checkbox(mut self, value: &str, checked: bool) -> Self {
        self.checkbox = Some(CheckboxState {
            value: value.to_string(),
            checked,
        });
        self
    }

    pub fn encapsulated_in(mut self, component_tag: &str) -> Self {
        self.is_encapsulated = true;
        self.component_tag = Some(component_tag.to_string());
        self.refresh_fingerprint();
        self
    }

    pub fn add_control(mut self, text: Option<String>) -> Self {
        self.add_control_text = text;
        self
    }

    fn refresh_fingerprint(&mut self) {
        self.fingerprint = fingerprint(
            self.kind,
            &self.identifier,
            &self.label,
            self.component_tag.as_deref(),
        );
    }

    /// Key used to merge descriptors from several detection passes.
    pub fn dedup_key(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.input_type, self.identifier, self.element_id, self.placeholder
        )
    }
}

/// A control whose activation is expected to reveal more fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerControl {
    pub text: String,
    /// `#id`, else `.firstClass`, else absent.
    pub selector: Option<String>,
}

/// What detection hands to the suggestion collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedFieldBatch {
    pub url: String,
    pub timestamp: u128,
    pub fields: Vec<FieldDescriptor>,
    pub trigger_buttons: Vec<TriggerControl>,
    pub has_array_fields: bool,
    pub has_trigger_buttons: bool,
}

impl DetectedFieldBatch {
    pub fn capture(url: &str, fields: Vec<FieldDescriptor>, triggers: Vec<TriggerControl>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);

        DetectedFieldBatch {
            url: url.to_string(),
            timestamp,
            has_array_fields: fields
                .iter()
                .any(|f| f.structural_pattern == StructuralPattern::Array),
            has_trigger_buttons: !triggers.is_empty(),
            fields,
            trigger_buttons: triggers,
        }
    }
}
