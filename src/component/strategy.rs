use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::{
    dom::{Document, EventKind, NodeId},
    scanner::custom::find_encapsulated_input,
};

/// Known tag prefixes and the framework they usually belong to. Cosmetic.
const FRAMEWORK_PREFIXES: [(&str, &str); 4] = [
    ("zbk-", "Dropbox Components"),
    ("mat-", "Angular Material"),
    ("amplify-", "AWS Amplify"),
    ("ion-", "Ionic"),
];

pub fn framework_hint(tag: &str) -> Option<&'static str> {
    FRAMEWORK_PREFIXES
        .iter()
        .find(|(prefix, _)| tag.starts_with(prefix))
        .map(|(_, name)| *name)
}

/// How values can be written into one kind of custom component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStrategy {
    pub tag: String,
    pub has_shadow_root: bool,
    /// Script-level type of the encapsulated input, when one exists.
    pub encapsulated_input_kind: Option<String>,
    pub supports_value_property: bool,
    pub supports_set_value: bool,
    pub supports_update_value: bool,
    /// Raised after every write, on both layers.
    pub required_events: Vec<EventKind>,
    pub framework_hint: Option<String>,
}

impl ComponentStrategy {
    /// Probe one live instance.
    pub fn probe(doc: &Document, component: NodeId) -> Option<ComponentStrategy> {
        let el = doc.element(component)?;
        let surface = el.component.as_ref();
        let encapsulated_input_kind = find_encapsulated_input(doc, component)
            .and_then(|inner| doc.element(inner))
            .map(|inner| inner.input_type());

        Some(ComponentStrategy {
            tag: el.tag.clone(),
            has_shadow_root: el.shadow_root.is_some(),
            encapsulated_input_kind,
            supports_value_property: surface.is_some_and(|s| s.value.is_some()),
            supports_set_value: surface.is_some_and(|s| s.has_method("setValue")),
            supports_update_value: surface.is_some_and(|s| s.has_method("updateValue")),
            required_events: vec![EventKind::Input, EventKind::Change, EventKind::Blur],
            framework_hint: framework_hint(&el.tag).map(str::to_string),
        })
    }
}

/// Strategy cache keyed by tag name. Lives as long as the page.
#[derive(Debug, Default)]
pub struct StrategyResolver {
    cache: HashMap<String, ComponentStrategy>,
}

impl StrategyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strategy for the component's tag, probing the instance on first
    /// encounter only.
    pub fn resolve(&mut self, doc: &Document, component: NodeId) -> Option<&ComponentStrategy> {
        let tag = doc.tag(component)?.to_string();
        if !self.cache.contains_key(&tag) {
            let strategy = ComponentStrategy::probe(doc, component)?;
            debug!(
                tag = %tag,
                framework = strategy.framework_hint.as_deref().unwrap_or("unknown"),
                encapsulated = ?strategy.encapsulated_input_kind,
                "component strategy cached"
            );
            self.cache.insert(tag.clone(), strategy);
        }
        self.cache.get(&tag)
    }

    pub fn cached(&self, tag: &str) -> Option<&ComponentStrategy> {
        self.cache.get(tag)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
