use std::collections::HashSet;

use tracing::{debug, info, warn};
use url::Url;

use crate::{
    cli::config::{DetectionConfig, QuestionFormSignature},
    dom::{Document, NodeId},
    field::{
        field_model::{
            DetectedFieldBatch, FieldDescriptor, FieldKind, FieldOption, InteractionHint,
            StructuralPattern, TriggerControl,
        },
        identity::{native_identifier, normalize_text},
    },
    patterns::{
        array::detect_array_pattern,
        trigger::{TriggerMatcher, detect_triggers},
    },
    scanner::{
        custom::{component_metadata, find_encapsulated_input},
        question_form,
    },
};

/// Control kinds that never carry user data.
const NON_DATA_TYPES: [&str; 5] = ["submit", "button", "hidden", "image", "reset"];

/// Whether the URL matches the question-form page signature.
pub fn is_question_form(url: &str, signature: &QuestionFormSignature) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            parsed.host_str().unwrap_or("").contains(&signature.host_contains)
                && parsed.path().contains(&signature.path_contains)
        }
        Err(_) => false,
    }
}

/// Merge several detection passes, keeping the first descriptor seen for
/// each `(type, identifier, element id, placeholder)`.
pub fn merge_passes(passes: Vec<Vec<FieldDescriptor>>) -> Vec<FieldDescriptor> {
    let mut seen = HashSet::new();
    passes
        .into_iter()
        .flatten()
        .filter(|field| seen.insert(field.dedup_key()))
        .collect()
}

/// Read-only field detector. Scanning never mutates the document.
#[derive(Debug, Clone)]
pub struct Scanner {
    config: DetectionConfig,
    triggers: TriggerMatcher,
}

impl Scanner {
    pub fn new(config: &DetectionConfig) -> Self {
        Scanner {
            config: config.clone(),
            triggers: TriggerMatcher::new(&config.trigger_patterns),
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detected fields in traversal order.
    pub fn scan(&self, doc: &Document) -> Vec<FieldDescriptor> {
        if is_question_form(doc.url(), &self.config.question_form) {
            let fields = question_form::extract(doc);
            info!(count = fields.len(), "question-form fields detected");
            return fields;
        }

        let forms = doc.find_all(doc.root(), |el| el.tag == "form");
        debug!(count = forms.len(), "forms found");

        let mut fields = Vec::new();
        for form in forms {
            let before = fields.len();
            self.extract_form(doc, form, &mut fields);
            debug!(?form, count = fields.len() - before, "form scanned");
        }

        for component in doc.find_all(doc.root(), |el| el.is_custom()) {
            if doc.closest(component, |el| el.tag == "form").is_some() {
                continue;
            }
            if let Some(field) = self.component_field(doc, component) {
                fields.push(field);
            }
        }

        info!(count = fields.len(), "fields detected");
        fields
    }

    pub fn detect_triggers(&self, doc: &Document) -> Vec<TriggerControl> {
        detect_triggers(doc, doc.root(), &self.triggers)
    }

    /// Fields plus trigger controls, ready for the suggestion collaborator.
    pub fn detect(&self, doc: &Document) -> DetectedFieldBatch {
        DetectedFieldBatch::capture(doc.url(), self.scan(doc), self.detect_triggers(doc))
    }

    fn extract_form(&self, doc: &Document, form: NodeId, fields: &mut Vec<FieldDescriptor>) {
        let mut seen_radio_groups = HashSet::new();

        for input in doc.find_all(form, |el| el.is_native_field()) {
            let Some(el) = doc.element(input) else {
                continue;
            };
            let input_type = el.input_type();
            if NON_DATA_TYPES.contains(&input_type.as_str()) {
                continue;
            }

            let label = derive_label(doc, input);

            let Some(identifier) = native_identifier(el) else {
                warn!(?input, tag = %el.tag, "skipping field without name or id");
                continue;
            };

            let kind = FieldKind::from_input_type(&input_type);
            if kind == FieldKind::Radio && !seen_radio_groups.insert(identifier.clone()) {
                continue;
            }

            let array = detect_array_pattern(doc, input, &self.config);
            let (pattern, hint) = if array.is_array {
                (StructuralPattern::Array, InteractionHint::TypeAndAdd)
            } else {
                (StructuralPattern::Simple, InteractionHint::Direct)
            };

            let mut field = FieldDescriptor::new(kind, &input_type, &identifier, &label)
                .element_id(el.id())
                .placeholder(el.attr("placeholder").unwrap_or(""))
                .interaction(pattern, hint)
                .add_control(array.add_control_text);

            match kind {
                FieldKind::Select => {
                    field = field.options(
                        doc.options(input)
                            .into_iter()
                            .map(|(value, label)| FieldOption { value, label })
                            .collect(),
                    );
                }
                FieldKind::Radio => {
                    field = field.options(radio_group_options(doc, form, el.name(), input));
                }
                FieldKind::Checkbox => {
                    field = field.checkbox(el.attr_nonempty("value").unwrap_or("on"), el.checked);
                }
                _ => {}
            }

            debug!(identifier = %field.identifier, kind = kind.as_str(), "field extracted");
            fields.push(field);
        }

        for component in doc.find_all(form, |el| el.is_custom()) {
            if let Some(field) = self.component_field(doc, component) {
                fields.push(field);
            }
        }
    }

    /// Descriptor for a custom component with an encapsulated input.
    fn component_field(&self, doc: &Document, component: NodeId) -> Option<FieldDescriptor> {
        let host = doc.element(component)?;
        let Some(inner) = find_encapsulated_input(doc, component) else {
            debug!(tag = %host.tag, "custom component without encapsulated input");
            return None;
        };
        let inner_el = doc.element(inner)?;

        let input_type = inner_el.input_type();
        if NON_DATA_TYPES.contains(&input_type.as_str()) {
            return None;
        }

        let meta = component_metadata(host);
        let Some(identifier) = meta.identifier.clone() else {
            warn!(tag = %meta.tag, "skipping custom component without name or id");
            return None;
        };

        let kind = if inner_el.is_native_field() {
            FieldKind::from_input_type(&input_type)
        } else {
            FieldKind::Custom
        };

        let array = detect_array_pattern(doc, component, &self.config);
        let pattern = if array.is_array {
            StructuralPattern::Array
        } else {
            StructuralPattern::Simple
        };

        let field = FieldDescriptor::new(kind, &input_type, &identifier, &meta.label)
            .element_id(&meta.id)
            .placeholder(&meta.placeholder)
            .interaction(pattern, InteractionHint::ShadowScope)
            .add_control(array.add_control_text)
            .encapsulated_in(&meta.tag);

        debug!(identifier = %field.identifier, tag = %meta.tag, "component field extracted");
        Some(field)
    }
}

fn label_text(doc: &Document, node: NodeId) -> Option<String> {
    let text = normalize_text(&doc.text_content(node));
    (!text.is_empty()).then_some(text)
}

/// Label fallback chain: explicit `label[for]`, enclosing label,
/// `aria-label`, adjacent label-like sibling, else empty.
pub fn derive_label(doc: &Document, node: NodeId) -> String {
    let Some(el) = doc.element(node) else {
        return String::new();
    };

    if let Some(id) = el.attr_nonempty("id") {
        let explicit = doc
            .find_first(doc.root(), |l| l.tag == "label" && l.attr("for") == Some(id))
            .and_then(|l| label_text(doc, l));
        if let Some(text) = explicit {
            return text;
        }
    }

    if let Some(text) = doc
        .closest(node, |e| e.tag == "label")
        .and_then(|l| label_text(doc, l))
    {
        return text;
    }

    if let Some(aria) = el.attr_nonempty("aria-label") {
        return aria.to_string();
    }

    doc.previous_element_sibling(node)
        .filter(|s| matches!(doc.tag(*s), Some("label" | "span")))
        .and_then(|s| label_text(doc, s))
        .unwrap_or_default()
}

/// Options of the radio group `name` inside `form`, labelled per radio.
fn radio_group_options(doc: &Document, form: NodeId, name: &str, first: NodeId) -> Vec<FieldOption> {
    let group = if name.is_empty() {
        vec![first]
    } else {
        doc.find_all(form, |el| {
            el.tag == "input" && el.input_type() == "radio" && el.name() == name
        })
    };

    group
        .into_iter()
        .filter_map(|radio| {
            let el = doc.element(radio)?;
            let value = el.attr("value").unwrap_or("on").to_string();
            let explicit = el.attr_nonempty("id").and_then(|id| {
                doc.find_first(doc.root(), |l| l.tag == "label" && l.attr("for") == Some(id))
                    .and_then(|l| label_text(doc, l))
            });
            let label = explicit
                .or_else(|| {
                    doc.closest(radio, |e| e.tag == "label")
                        .and_then(|l| label_text(doc, l))
                })
                .unwrap_or_else(|| value.clone());
            Some(FieldOption { value, label })
        })
        .collect()
}
