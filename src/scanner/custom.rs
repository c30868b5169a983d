use crate::{
    dom::{Document, Element, NodeId},
    field::identity::{binding_attribute, component_identifier},
};

/// Probe order for a component's encapsulated input.
fn matches_probe(el: &Element, probe: usize) -> bool {
    match probe {
        0 => el.tag == "input",
        1 => el.tag == "textarea",
        2 => el.tag == "select",
        3 => el.attr("role") == Some("textbox"),
        4 => el.attr("role") == Some("combobox"),
        5 => el.is_content_editable(),
        _ => false,
    }
}

const PROBE_COUNT: usize = 6;

/// First element inside the component's encapsulated subtree matching the
/// probe order: text input, text area, select, textbox role, combobox role,
/// editable content.
pub fn find_encapsulated_input(doc: &Document, component: NodeId) -> Option<NodeId> {
    let shadow = doc.shadow_root(component)?;
    let inner = doc.descendants(shadow);

    (0..PROBE_COUNT).find_map(|probe| {
        inner
            .iter()
            .copied()
            .find(|node| doc.element(*node).is_some_and(|el| matches_probe(el, probe)))
    })
}

/// Attributes read off a custom component's host element.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentMetadata {
    pub tag: String,
    pub id: String,
    pub name: String,
    pub identifier: Option<String>,
    pub placeholder: String,
    pub label: String,
    pub declared_type: String,
    pub required: bool,
    pub disabled: bool,
    pub binding_attribute: Option<(String, String)>,
}

pub fn component_metadata(el: &Element) -> ComponentMetadata {
    ComponentMetadata {
        tag: el.tag.clone(),
        id: el.id().to_string(),
        name: el.name().to_string(),
        identifier: component_identifier(el),
        placeholder: el.attr("placeholder").unwrap_or("").to_string(),
        label: el.attr("label").unwrap_or("").to_string(),
        declared_type: el.attr_nonempty("type").unwrap_or("text").to_string(),
        required: el.has_attr("required"),
        disabled: el.is_disabled(),
        binding_attribute: binding_attribute(el).map(|(k, v)| (k.to_string(), v.to_string())),
    }
}
