use serde::{Deserialize, Serialize};

/// Handle into the document arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Layout box in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    /// Horizontal gap from this box's right edge to `other`'s left edge plus
    /// the vertical offset between their top edges.
    pub fn gap_to(&self, other: &Rect) -> f64 {
        (self.right() - other.left()).abs() + (self.top() - other.top()).abs()
    }
}

/// Script-visible surface of a custom component: an optional value property
/// and the names of callable methods.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentSurface {
    /// `Some` when the component exposes a settable `value` property.
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub methods: Vec<String>,
}

impl ComponentSurface {
    pub fn with_value(value: &str) -> Self {
        ComponentSurface {
            value: Some(value.to_string()),
            methods: vec![],
        }
    }

    pub fn method(mut self, name: &str) -> Self {
        self.methods.push(name.to_string());
        self
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m == name)
    }
}

/// What activating an element does to the document, beyond the click event.
/// Targets are simple selectors resolved at click time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClickAction {
    /// Clone the contents of a `<template>` into a container.
    Reveal { template: String, into: String },
    /// Turn the source field's value into a chip inside a container, then
    /// clear the field.
    CommitValue { source: String, into: String },
}

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub value: String,
    pub checked: bool,
    pub rect: Rect,
    pub shadow_root: Option<NodeId>,
    pub component: Option<ComponentSurface>,
    pub on_click: Option<ClickAction>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            value: String::new(),
            checked: false,
            rect: Rect::default(),
            shadow_root: None,
            component: None,
            on_click: None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(k, _)| k == name)
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((name, value.to_string())),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(k, _)| k != name);
    }

    /// Non-empty attribute value.
    pub fn attr_nonempty(&self, name: &str) -> Option<&str> {
        self.attr(name).filter(|v| !v.is_empty())
    }

    pub fn name(&self) -> &str {
        self.attr("name").unwrap_or("")
    }

    pub fn id(&self) -> &str {
        self.attr("id").unwrap_or("")
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Hyphenated tag names are custom components.
    pub fn is_custom(&self) -> bool {
        self.tag.contains('-')
    }

    /// Native controls that hold a value.
    pub fn is_native_field(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea" | "select")
    }

    /// Script-level `type`: lowercase input type (default `text`),
    /// `select-one`/`select-multiple`, `textarea`, else the tag name.
    pub fn input_type(&self) -> String {
        match self.tag.as_str() {
            "input" => self
                .attr_nonempty("type")
                .map(|t| t.to_ascii_lowercase())
                .unwrap_or_else(|| "text".to_string()),
            "select" if self.has_attr("multiple") => "select-multiple".to_string(),
            "select" => "select-one".to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.has_attr("disabled")
    }

    pub fn is_read_only(&self) -> bool {
        self.has_attr("readonly")
    }

    pub fn is_content_editable(&self) -> bool {
        self.attr("contenteditable") == Some("true")
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Document,
    ShadowRoot { host: NodeId },
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) kind: NodeKind,
}
