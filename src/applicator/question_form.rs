//! Applying values on question-form pages. The page is assumed complete at
//! application time, so nothing here goes pending.

use tracing::{debug, info, warn};

use crate::{
    cli::config::TimingConfig,
    dom::{Document, EventKind, NodeId},
    error::FillError,
    field::suggestion::SuggestedValue,
    scanner::question_form::{Question, is_checkbox, is_radio, is_select, is_text_control, questions},
    timing::Pacer,
};

/// Exact equality, or case-insensitive containment in either direction.
/// Empty question text never matches by containment.
fn question_matches(question: &str, identifier: &str) -> bool {
    if question == identifier {
        return true;
    }
    if question.is_empty() {
        return false;
    }
    let q = question.to_lowercase();
    let id = identifier.to_lowercase();
    q.contains(&id) || id.contains(&q)
}

/// Case-insensitive containment of the wanted value against an option.
fn option_matches(label: &str, value: &str, wanted: &str) -> bool {
    let wanted = wanted.to_lowercase();
    let label = label.to_lowercase();
    let value = value.to_lowercase();
    label.contains(&wanted) || value.contains(&wanted) || (!label.is_empty() && wanted.contains(&label))
}

enum Applied {
    Done,
    /// Question matched but none of its choices did.
    NoOption,
    Skipped,
}

pub fn apply_question_value(
    doc: &mut Document,
    pacer: &dyn Pacer,
    timing: &TimingConfig,
    identifier: &str,
    value: &SuggestedValue,
) -> Result<NodeId, FillError> {
    let text = value.as_text().unwrap_or_default();
    let all = questions(doc);
    debug!(identifier, count = all.len(), "matching question-form questions");

    let mut option_missing = false;
    for question in &all {
        match apply_to_question(doc, pacer, timing, question, identifier, value, &text) {
            (Applied::Done, Some(node)) => {
                info!(identifier, question = %question.text, "question-form field filled");
                return Ok(node);
            }
            (Applied::NoOption, _) => option_missing = true,
            _ => {}
        }
    }

    if option_missing {
        return Err(FillError::OptionNotFound {
            field: identifier.to_string(),
            value: text,
        });
    }
    let available: Vec<&str> = all.iter().map(|q| q.text.as_str()).collect();
    warn!(identifier, ?available, "no question matches");
    Err(FillError::TargetNotFound {
        field: identifier.to_string(),
    })
}

fn apply_to_question(
    doc: &mut Document,
    pacer: &dyn Pacer,
    timing: &TimingConfig,
    question: &Question,
    identifier: &str,
    value: &SuggestedValue,
    text: &str,
) -> (Applied, Option<NodeId>) {
    let qt = question.text.as_str();
    let mut outcome = Applied::Skipped;

    for input in doc.find_all(question.node, is_text_control) {
        let Some(el) = doc.element(input) else {
            continue;
        };
        let direct = el.name() == identifier
            || el.id() == identifier
            || el.attr("aria-label") == Some(identifier);
        if direct || question_matches(qt, identifier) {
            doc.focus(input);
            pacer.settle(TimingConfig::ms(timing.component_focus_ms));
            doc.set_value(input, text);
            doc.set_attr(input, "value", text);
            doc.dispatch(input, EventKind::Input, false);
            doc.dispatch(input, EventKind::Change, false);
            doc.blur(input);
            return (Applied::Done, Some(input));
        }
    }

    let radios = doc.find_all(question.node, is_radio);
    if let Some(first) = radios.first().copied() {
        let group_name = doc.attr(first, "name").unwrap_or("");
        let matched = (!group_name.is_empty() && group_name == identifier) || question_matches(qt, identifier);
        if matched {
            let choice = radios.iter().copied().find(|r| {
                !text.is_empty()
                    && option_matches(
                        doc.attr(*r, "aria-label").unwrap_or(""),
                        doc.attr(*r, "value").unwrap_or(""),
                        text,
                    )
            });
            match choice {
                Some(radio) => {
                    doc.click(radio);
                    pacer.settle(TimingConfig::ms(timing.choice_ms));
                    return (Applied::Done, Some(radio));
                }
                None => outcome = Applied::NoOption,
            }
        }
    }

    for checkbox in doc.find_all(question.node, is_checkbox) {
        let Some(el) = doc.element(checkbox) else {
            continue;
        };
        let direct = (!el.name().is_empty() && el.name() == identifier)
            || el.attr("aria-label") == Some(identifier);
        if direct || question_matches(qt, identifier) {
            let want = value.is_truthy();
            if doc.checked(checkbox) != want {
                doc.click(checkbox);
                pacer.settle(TimingConfig::ms(timing.choice_ms));
            }
            return (Applied::Done, Some(checkbox));
        }
    }

    for select in doc.find_all(question.node, is_select) {
        let Some(el) = doc.element(select) else {
            continue;
        };
        let direct = (!el.name().is_empty() && el.name() == identifier)
            || (!el.id().is_empty() && el.id() == identifier);
        if !(direct || question_matches(qt, identifier)) {
            continue;
        }
        let option = doc
            .options(select)
            .into_iter()
            .find(|(value, label)| {
                !text.is_empty() && (value == text || option_matches(label, "", text))
            });
        match option {
            Some((value, _)) => {
                doc.set_value(select, &value);
                doc.dispatch(select, EventKind::Change, false);
                return (Applied::Done, Some(select));
            }
            None => outcome = Applied::NoOption,
        }
    }

    (outcome, None)
}
