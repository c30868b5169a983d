//! Target resolution. Each locator tries one way of finding the live element
//! for an identifier; chains are tried in order until one resolves.

use tracing::debug;

use crate::{
    dom::{Document, Element, NodeId},
    field::{field_model::InteractionHint, identity::binding_attribute},
    reconciler::index::{FieldIndex, is_field_capable},
    scanner::custom::find_encapsulated_input,
};

/// A resolved write target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Plain(NodeId),
    /// A custom component and the input inside its encapsulated subtree.
    Encapsulated { component: NodeId, input: NodeId },
}

impl Target {
    /// The element that receives the value first.
    pub fn surface(&self) -> NodeId {
        match self {
            Target::Plain(node) => *node,
            Target::Encapsulated { input, .. } => *input,
        }
    }

    /// Node the add-control search anchors on.
    pub fn anchor(&self) -> NodeId {
        match self {
            Target::Plain(node) => *node,
            Target::Encapsulated { component, .. } => *component,
        }
    }

    pub fn is_encapsulated(&self) -> bool {
        matches!(self, Target::Encapsulated { .. })
    }

    /// Wrap a structural match, descending into custom components.
    fn from_node(doc: &Document, node: NodeId) -> Target {
        let custom = doc.element(node).is_some_and(|el| el.is_custom());
        match find_encapsulated_input(doc, node) {
            Some(input) if custom => Target::Encapsulated {
                component: node,
                input,
            },
            _ => Target::Plain(node),
        }
    }
}

pub trait Locator {
    fn name(&self) -> &'static str;

    fn try_resolve(&self, doc: &Document, index: &FieldIndex, identifier: &str) -> Option<Target>;
}

/// First field-capable element whose `name` or `id` equals the identifier.
pub struct StructuralLocator;

/// Live index maintained by the reconciler.
pub struct IndexLocator;

/// Custom component carrying the identifier in `name`, `id` or a binding
/// attribute, resolved to its encapsulated input.
pub struct ComponentLocator;

impl Locator for StructuralLocator {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn try_resolve(&self, doc: &Document, _index: &FieldIndex, identifier: &str) -> Option<Target> {
        let node = doc.find_first(doc.root(), |el| {
            is_field_capable(el) && (el.name() == identifier || el.id() == identifier)
        })?;
        Some(Target::from_node(doc, node))
    }
}

impl Locator for IndexLocator {
    fn name(&self) -> &'static str {
        "index"
    }

    fn try_resolve(&self, doc: &Document, index: &FieldIndex, identifier: &str) -> Option<Target> {
        let node = index.lookup(doc, identifier)?;
        Some(Target::from_node(doc, node))
    }
}

fn carries_identifier(el: &Element, identifier: &str) -> bool {
    el.is_custom()
        && (el.name() == identifier
            || el.id() == identifier
            || binding_attribute(el).is_some_and(|(_, value)| value == identifier))
}

impl Locator for ComponentLocator {
    fn name(&self) -> &'static str {
        "component"
    }

    fn try_resolve(&self, doc: &Document, _index: &FieldIndex, identifier: &str) -> Option<Target> {
        doc.find_all(doc.root(), |el| carries_identifier(el, identifier))
            .into_iter()
            .find_map(|component| {
                let input = find_encapsulated_input(doc, component)?;
                Some(Target::Encapsulated { component, input })
            })
    }
}

const SHADOW_CHAIN: &[&dyn Locator] = &[&ComponentLocator];
const DIRECT_CHAIN: &[&dyn Locator] = &[&StructuralLocator, &IndexLocator, &ComponentLocator];

/// Locators for a hint, in fallback order.
pub fn fallback_chain(hint: InteractionHint) -> &'static [&'static dyn Locator] {
    match hint {
        InteractionHint::ShadowScope => SHADOW_CHAIN,
        _ => DIRECT_CHAIN,
    }
}

/// Try each locator of the hint's chain; first success wins.
pub fn resolve_target(
    doc: &Document,
    index: &FieldIndex,
    identifier: &str,
    hint: InteractionHint,
) -> Option<Target> {
    for locator in fallback_chain(hint).iter() {
        if let Some(target) = locator.try_resolve(doc, index, identifier) {
            debug!(identifier, locator = locator.name(), ?target, "target resolved");
            return Some(target);
        }
        debug!(identifier, locator = locator.name(), "locator found nothing");
    }
    None
}
