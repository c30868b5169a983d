use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use crate::{
    dom::{Document, Element, NodeId, Selector},
    field::{field_model::TriggerControl, identity::normalize_text},
};

/// Case-insensitive text patterns that mark section trigger controls.
#[derive(Debug, Clone)]
pub struct TriggerMatcher {
    patterns: Vec<Regex>,
}

impl TriggerMatcher {
    /// Patterns that fail to compile are skipped with a warning.
    pub fn new(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|p| match RegexBuilder::new(p).case_insensitive(true).build() {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(pattern = %p, error = %e, "ignoring invalid trigger pattern");
                    None
                }
            })
            .collect();
        TriggerMatcher { patterns }
    }

    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(text))
    }
}

fn is_trigger_candidate(el: &Element) -> bool {
    el.tag == "button"
        || (el.tag == "a" && el.has_class("btn"))
        || (el.tag == "div" && el.attr("role") == Some("button"))
}

/// Re-locatable selector: `#id`, else `.firstClass`.
pub fn trigger_selector(el: &Element) -> Option<String> {
    if let Some(id) = el.attr_nonempty("id") {
        return Some(format!("#{}", id));
    }
    el.classes().next().map(|class| format!(".{}", class))
}

pub fn detect_triggers(doc: &Document, root: NodeId, matcher: &TriggerMatcher) -> Vec<TriggerControl> {
    let triggers: Vec<TriggerControl> = doc
        .find_all(root, is_trigger_candidate)
        .into_iter()
        .filter_map(|node| {
            let text = normalize_text(&doc.text_content(node));
            if !matcher.matches(&text) {
                return None;
            }
            Some(TriggerControl {
                selector: doc.element(node).and_then(trigger_selector),
                text,
            })
        })
        .collect();

    debug!(count = triggers.len(), "detected trigger controls");
    triggers
}

/// Resolve a trigger reference: a selector first, then display text among
/// trigger candidates (case-insensitive).
pub fn find_trigger(doc: &Document, reference: &str) -> Option<NodeId> {
    let by_selector = Selector::parse(reference)
        .ok()
        .and_then(|sel| doc.query(doc.root(), &sel));
    if by_selector.is_some() {
        return by_selector;
    }

    let wanted = normalize_text(reference).to_lowercase();
    doc.find_all(doc.root(), is_trigger_candidate)
        .into_iter()
        .find(|node| normalize_text(&doc.text_content(*node)).to_lowercase() == wanted)
}
