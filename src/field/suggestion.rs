use serde::{Deserialize, Deserializer, Serialize};

use crate::field::field_model::{InteractionHint, StructuralPattern};

/// A value to place into a field, as produced by the suggestion collaborator.
///
/// Accepts the collaborator's wire names (`field_identifier`,
/// `suggested_value`, `field_pattern`, `interaction_hint`) and the short
/// ones. A missing or null pattern is `simple`, a missing hint `direct`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "field_identifier", alias = "identifier")]
    pub identifier: String,
    #[serde(
        rename = "suggested_value",
        alias = "value",
        default,
        deserialize_with = "null_as_default"
    )]
    pub value: SuggestedValue,
    #[serde(
        rename = "field_pattern",
        alias = "structuralPattern",
        alias = "pattern",
        default,
        deserialize_with = "null_as_default"
    )]
    pub pattern: StructuralPattern,
    #[serde(
        rename = "interaction_hint",
        alias = "interactionHint",
        alias = "hint",
        default,
        deserialize_with = "null_as_default"
    )]
    pub hint: InteractionHint,
    /// Only meaningful to the consent UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl Suggestion {
    pub fn new(identifier: &str, value: SuggestedValue) -> Self {
        Suggestion {
            identifier: identifier.to_string(),
            value,
            pattern: StructuralPattern::Simple,
            hint: InteractionHint::Direct,
            confidence: None,
        }
    }

    pub fn pattern(mut self, pattern: StructuralPattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn hint(mut self, hint: InteractionHint) -> Self {
        self.hint = hint;
        self
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Scalar, list, or nested-section value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuggestedValue {
    Flag(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<SuggestedValue>),
    Section(NestedSection),
}

impl Default for SuggestedValue {
    fn default() -> Self {
        SuggestedValue::Text(String::new())
    }
}

impl From<&str> for SuggestedValue {
    fn from(value: &str) -> Self {
        SuggestedValue::Text(value.to_string())
    }
}

impl From<bool> for SuggestedValue {
    fn from(value: bool) -> Self {
        SuggestedValue::Flag(value)
    }
}

impl SuggestedValue {
    pub fn list<'a>(items: impl IntoIterator<Item = &'a str>) -> Self {
        SuggestedValue::List(items.into_iter().map(SuggestedValue::from).collect())
    }

    /// Short name of the value's shape, for mismatch reports.
    pub fn shape(&self) -> &'static str {
        match self {
            SuggestedValue::Flag(_) | SuggestedValue::Number(_) | SuggestedValue::Text(_) => {
                "scalar"
            }
            SuggestedValue::List(_) => "list",
            SuggestedValue::Section(_) => "nested section",
        }
    }

    /// Text to write into a single field. Lists are joined with `", "`;
    /// sections have no text form.
    pub fn as_text(&self) -> Option<String> {
        match self {
            SuggestedValue::Flag(b) => Some(b.to_string()),
            SuggestedValue::Number(n) => Some(n.to_string()),
            SuggestedValue::Text(s) => Some(s.clone()),
            SuggestedValue::List(items) => {
                let parts = items
                    .iter()
                    .map(SuggestedValue::as_text)
                    .collect::<Option<Vec<_>>>()?;
                Some(parts.join(", "))
            }
            SuggestedValue::Section(_) => None,
        }
    }

    /// Whether a checkbox should end up checked.
    pub fn is_truthy(&self) -> bool {
        match self {
            SuggestedValue::Flag(b) => *b,
            SuggestedValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            SuggestedValue::Text(s) => matches!(
                s.trim().to_lowercase().as_str(),
                "true" | "yes" | "y" | "on" | "checked" | "1"
            ),
            SuggestedValue::List(items) => !items.is_empty(),
            SuggestedValue::Section(_) => true,
        }
    }

    /// Items of a list; any other value is a one-item list.
    pub fn items(&self) -> Vec<SuggestedValue> {
        match self {
            SuggestedValue::List(items) => items.clone(),
            other => vec![other.clone()],
        }
    }

    pub fn contains_section(&self) -> bool {
        match self {
            SuggestedValue::Section(_) => true,
            SuggestedValue::List(items) => items.iter().any(SuggestedValue::contains_section),
            _ => false,
        }
    }
}

/// A section revealed by activating a trigger control, plus the fields to
/// fill inside it, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedSection {
    /// Selector (`#id`, `.class`, ...) or display text of the trigger.
    pub trigger: String,
    #[serde(with = "ordered_fields")]
    pub fields: Vec<(String, SuggestedValue)>,
}

impl NestedSection {
    pub fn new(trigger: &str) -> Self {
        NestedSection {
            trigger: trigger.to_string(),
            fields: vec![],
        }
    }

    pub fn field(mut self, identifier: &str, value: SuggestedValue) -> Self {
        self.fields.push((identifier.to_string(), value));
        self
    }
}

/// Field maps keep their document order.
mod ordered_fields {
    use std::fmt;

    use serde::{
        de::{MapAccess, Visitor},
        ser::SerializeMap,
        Deserializer, Serializer,
    };

    use super::SuggestedValue;

    pub fn serialize<S: Serializer>(
        fields: &[(String, SuggestedValue)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (key, value) in fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, SuggestedValue)>, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = Vec<(String, SuggestedValue)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of field identifiers to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut fields = Vec::new();
                while let Some(entry) = access.next_entry::<String, SuggestedValue>()? {
                    fields.push(entry);
                }
                Ok(fields)
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

/// Read a JSON array of suggestions.
pub fn load_suggestions(path: &std::path::Path) -> Result<Vec<Suggestion>, crate::error::AutofillError> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::AutofillError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| crate::error::AutofillError::JsonParse {
        context: format!("suggestions {}", path.display()),
        source: e,
    })
}
