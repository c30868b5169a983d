use tracing::{debug, warn};

use crate::{
    dom::{Document, Element, NodeId},
    field::{
        field_model::{FieldDescriptor, FieldKind, FieldOption, InteractionHint, StructuralPattern},
        identity::normalize_text,
    },
};

/// One question block of a question-form page.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub node: NodeId,
    /// Visible heading text (may be empty).
    pub text: String,
}

pub fn is_text_control(el: &Element) -> bool {
    el.tag == "textarea" || (el.tag == "input" && el.input_type() == "text")
}

pub fn is_radio(el: &Element) -> bool {
    el.tag == "input" && el.input_type() == "radio"
}

pub fn is_checkbox(el: &Element) -> bool {
    el.tag == "input" && el.input_type() == "checkbox"
}

pub fn is_select(el: &Element) -> bool {
    el.tag == "select"
}

/// Question blocks in document order.
pub fn questions(doc: &Document) -> Vec<Question> {
    doc.find_all(doc.root(), |el| el.attr("role") == Some("listitem"))
        .into_iter()
        .map(|node| {
            let text = doc
                .find_first(node, |el| el.attr("role") == Some("heading"))
                .map(|h| normalize_text(&doc.text_content(h)))
                .unwrap_or_default();
            Question { node, text }
        })
        .collect()
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

fn question_field(kind: FieldKind, input_type: &str, identifier: &str, label: &str) -> FieldDescriptor {
    FieldDescriptor::new(kind, input_type, identifier, label)
        .interaction(StructuralPattern::Simple, InteractionHint::QuestionForm)
}

/// Extract descriptors from every question. The question text is the
/// preferred identifier so application can find the same question again.
pub fn extract(doc: &Document) -> Vec<FieldDescriptor> {
    let questions = questions(doc);
    debug!(count = questions.len(), "question-form questions found");

    let mut fields = Vec::new();
    for question in &questions {
        extract_question(doc, question, &mut fields);
    }
    fields
}

fn extract_question(doc: &Document, question: &Question, fields: &mut Vec<FieldDescriptor>) {
    let qt = question.text.as_str();

    for input in doc.find_all(question.node, is_text_control) {
        let Some(el) = doc.element(input) else {
            continue;
        };
        let aria = el.attr("aria-label").unwrap_or("");
        let Some(identifier) = non_empty(qt)
            .or_else(|| non_empty(aria))
            .or_else(|| el.attr_nonempty("name"))
            .or_else(|| el.attr_nonempty("id"))
        else {
            warn!("skipping question-form text field without identifier");
            continue;
        };

        let kind = if el.tag == "textarea" {
            FieldKind::Textarea
        } else {
            FieldKind::Text
        };
        let label = non_empty(qt).unwrap_or(aria);
        fields.push(
            question_field(kind, kind.as_str(), identifier, label)
                .element_id(el.id())
                .placeholder(el.attr("placeholder").unwrap_or("")),
        );
    }

    let radios = doc.find_all(question.node, is_radio);
    if let Some(first) = radios.first().and_then(|r| doc.element(*r)) {
        match non_empty(qt).or_else(|| first.attr_nonempty("name")) {
            Some(identifier) => {
                let options = radios
                    .iter()
                    .filter_map(|r| doc.element(*r))
                    .map(|radio| {
                        let value = radio.attr("value").unwrap_or("");
                        let label = radio.attr_nonempty("aria-label").unwrap_or(value);
                        FieldOption::new(value, label)
                    })
                    .collect();
                fields.push(
                    question_field(FieldKind::Radio, "radio", identifier, qt)
                        .element_id(first.id())
                        .options(options),
                );
            }
            None => warn!("skipping question-form radio group without identifier"),
        }
    }

    for checkbox in doc.find_all(question.node, is_checkbox) {
        let Some(el) = doc.element(checkbox) else {
            continue;
        };
        let aria = el.attr("aria-label").unwrap_or("");
        let Some(identifier) = non_empty(aria)
            .or_else(|| non_empty(qt))
            .or_else(|| el.attr_nonempty("name"))
        else {
            warn!("skipping question-form checkbox without identifier");
            continue;
        };
        fields.push(
            question_field(FieldKind::Checkbox, "checkbox", identifier, non_empty(aria).unwrap_or(qt))
                .element_id(el.id())
                .checkbox(el.attr_nonempty("value").unwrap_or("on"), el.checked),
        );
    }

    for select in doc.find_all(question.node, is_select) {
        let Some(el) = doc.element(select) else {
            continue;
        };
        let Some(identifier) = non_empty(qt)
            .or_else(|| el.attr_nonempty("name"))
            .or_else(|| el.attr_nonempty("id"))
        else {
            warn!("skipping question-form dropdown without identifier");
            continue;
        };
        let options = doc
            .options(select)
            .into_iter()
            .filter(|(value, _)| !value.is_empty())
            .map(|(value, label)| FieldOption { value, label })
            .collect();
        fields.push(
            question_field(FieldKind::Select, "select", identifier, qt)
                .element_id(el.id())
                .options(options),
        );
    }
}
