use tracing::debug;

use crate::{
    cli::config::DetectionConfig,
    dom::{Document, Element, NodeId},
    field::identity::normalize_text,
};

/// Result of probing a field for a nearby "add" control.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPattern {
    pub is_array: bool,
    pub add_control: Option<NodeId>,
    pub add_control_text: Option<String>,
}

fn is_clickable(el: &Element) -> bool {
    el.tag == "button"
        || (el.tag == "input" && matches!(el.input_type().as_str(), "button" | "submit"))
}

/// Find a clickable control near `anchor` whose text or value matches the
/// add vocabulary. Searches the anchor's container and that container's
/// parent; the control must be strictly closer than the proximity threshold.
pub fn find_add_control(doc: &Document, anchor: NodeId, config: &DetectionConfig) -> Option<NodeId> {
    let container = doc.parent_element(anchor)?;
    let search = [Some(container), doc.parent_element(container)];
    let anchor_rect = doc.rect(anchor);

    for scope in search.into_iter().flatten() {
        for button in doc.find_all(scope, is_clickable) {
            let Some(el) = doc.element(button) else {
                continue;
            };
            let text = normalize_text(&doc.text_content(button)).to_lowercase();
            let raw_value = if el.tag == "input" {
                doc.value(button)
            } else {
                el.attr("value").unwrap_or("").to_string()
            };
            let value = raw_value.to_lowercase();

            let matches_vocabulary = config
                .add_vocabulary
                .iter()
                .map(|word| word.to_lowercase())
                .filter(|word| !word.is_empty())
                .any(|word| text.contains(&word) || value.contains(&word));
            if !matches_vocabulary {
                continue;
            }

            let distance = anchor_rect.gap_to(&doc.rect(button));
            if distance < config.proximity_threshold {
                debug!(?button, distance, "add control found");
                return Some(button);
            }
        }
    }
    None
}

pub fn detect_array_pattern(doc: &Document, input: NodeId, config: &DetectionConfig) -> ArrayPattern {
    match find_add_control(doc, input, config) {
        Some(button) => ArrayPattern {
            is_array: true,
            add_control: Some(button),
            add_control_text: Some(normalize_text(&doc.text_content(button))),
        },
        None => ArrayPattern {
            is_array: false,
            add_control: None,
            add_control_text: None,
        },
    }
}
