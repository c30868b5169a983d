use sha1::{Digest, Sha1};

use crate::{
    dom::{Document, Element, NodeId},
    field::field_model::FieldKind,
};

/// Attribute-name fragments that mark framework binding attributes
/// (`amplify-child-path`, `formcontrolname`, ...).
const BINDING_ATTR_HINTS: [&str; 3] = ["path", "name", "control"];

/// Collapse runs of whitespace and trim.
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `name`, else `id`, for native controls.
pub fn native_identifier(el: &Element) -> Option<String> {
    el.attr_nonempty("name")
        .or_else(|| el.attr_nonempty("id"))
        .map(str::to_string)
}

/// Last attribute whose name mentions a binding hint, as `(name, value)`.
pub fn binding_attribute(el: &Element) -> Option<(&str, &str)> {
    el.attrs
        .iter()
        .filter(|(name, _)| BINDING_ATTR_HINTS.iter().any(|h| name.contains(h)))
        .last()
        .map(|(name, value)| (name.as_str(), value.as_str()))
}

/// `name`, else a binding attribute's value, else `id`, for components.
pub fn component_identifier(el: &Element) -> Option<String> {
    el.attr_nonempty("name")
        .or_else(|| binding_attribute(el).map(|(_, v)| v).filter(|v| !v.is_empty()))
        .or_else(|| el.attr_nonempty("id"))
        .map(str::to_string)
}

/// Every identity a live element answers to, primary first: `name` then `id`
/// for native controls, plus the binding attribute's value for components.
/// These are the keys the locators resolve by, so the index and pending
/// replay use all of them.
pub fn element_keys(doc: &Document, node: NodeId) -> Vec<String> {
    let Some(el) = doc.element(node) else {
        return vec![];
    };
    let mut keys: Vec<String> = Vec::with_capacity(3);
    let mut push = |key: &str| {
        if !key.is_empty() && !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
    };

    if el.is_custom() {
        if let Some(primary) = component_identifier(el) {
            push(&primary);
        }
        push(el.name());
        if let Some((_, value)) = binding_attribute(el) {
            push(value);
        }
        push(el.id());
    } else {
        push(el.name());
        push(el.id());
    }
    keys
}

pub fn fingerprint(kind: FieldKind, identifier: &str, label: &str, component: Option<&str>) -> String {
    let mut hasher = Sha1::new();
    hasher.update(kind.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(identifier.as_bytes());
    hasher.update([0u8]);
    hasher.update(normalize_text(label).to_lowercase().as_bytes());
    hasher.update([0u8]);
    hasher.update(component.unwrap_or("").as_bytes());
    format!("{:x}", hasher.finalize())
}
