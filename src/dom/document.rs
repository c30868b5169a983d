use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::dom::{
    events::{DispatchedEvent, EventKind, MethodCall, MutationRecord, ObserverId},
    node::{ClickAction, Element, Node, NodeId, NodeKind, Rect},
    selector::Selector,
};

/// The live document. All state the engine reads and writes lives here.
#[derive(Debug, Clone)]
pub struct Document {
    url: String,
    nodes: Vec<Node>,
    root: NodeId,
    focused: Option<NodeId>,
    events: Vec<DispatchedEvent>,
    calls: Vec<MethodCall>,
    observers: BTreeMap<ObserverId, Vec<MutationRecord>>,
    next_observer: u64,
}

impl Document {
    pub fn new(url: &str) -> Self {
        Document {
            url: url.to_string(),
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
            focused: None,
            events: Vec::new(),
            calls: Vec::new(),
            observers: BTreeMap::new(),
            next_observer: 0,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    // =========================================================================
    // Tree construction
    // =========================================================================

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeKind::Element(Element::new(tag)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeKind::Text(text.to_string()))
    }

    /// Attach `child` under `parent`, moving it if it was attached elsewhere.
    /// Observers see one record when the child lands in the connected tree.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);

        if self.is_connected(child) {
            for records in self.observers.values_mut() {
                records.push(MutationRecord { added: child });
            }
        }
    }

    /// Create an element with attributes and append it.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.create_element(tag);
        for (name, value) in attrs {
            self.set_attr(id, name, value);
        }
        self.append_child(parent, id);
        id
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.create_text(text);
        self.append_child(parent, id);
        id
    }

    pub fn remove(&mut self, node: NodeId) {
        self.detach(node);
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    /// Give an element an encapsulated subtree. Idempotent.
    pub fn attach_shadow(&mut self, host: NodeId) -> NodeId {
        if let Some(existing) = self.shadow_root(host) {
            return existing;
        }
        let shadow = self.push_node(NodeKind::ShadowRoot { host });
        if let Some(el) = self.element_mut(host) {
            el.shadow_root = Some(shadow);
        }
        shadow
    }

    /// Detached copy of a subtree, including encapsulated subtrees.
    pub fn deep_clone(&mut self, node: NodeId) -> NodeId {
        let kind = self.nodes[node.0].kind.clone();
        let children = self.nodes[node.0].children.clone();

        let copy = match kind {
            NodeKind::Element(mut el) => {
                let shadow = el.shadow_root.take();
                let copy = self.push_node(NodeKind::Element(el));
                if let Some(shadow) = shadow {
                    let new_shadow = self.attach_shadow(copy);
                    for child in self.nodes[shadow.0].children.clone() {
                        let c = self.deep_clone(child);
                        self.nodes[c.0].parent = Some(new_shadow);
                        self.nodes[new_shadow.0].children.push(c);
                    }
                }
                copy
            }
            other => self.push_node(other),
        };

        for child in children {
            let c = self.deep_clone(child);
            self.nodes[c.0].parent = Some(copy);
            self.nodes[copy.0].children.push(c);
        }
        copy
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    /// Setting `value` also sets the live value of inputs and text areas;
    /// setting `checked` checks the control.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            el.set_attr(name, value);
            match name {
                "value" if matches!(el.tag.as_str(), "input" | "textarea") => {
                    el.value = value.to_string();
                }
                "checked" => el.checked = true,
                _ => {}
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.element_mut(id) {
            el.remove_attr(name);
        }
    }

    pub fn rect(&self, id: NodeId) -> Rect {
        self.element(id).map(|el| el.rect).unwrap_or_default()
    }

    pub fn set_rect(&mut self, id: NodeId, rect: Rect) {
        if let Some(el) = self.element_mut(id) {
            el.rect = rect;
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0)?.parent
    }

    /// Parent only when it is an element (a shadow root or the document is
    /// not).
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|p| self.element(*p).is_some())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn shadow_root(&self, id: NodeId) -> Option<NodeId> {
        self.element(id).and_then(|el| el.shadow_root)
    }

    /// Component owning the encapsulated subtree that contains `id`.
    pub fn host_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            match &self.nodes.get(current.0)?.kind {
                NodeKind::ShadowRoot { host } => return Some(*host),
                _ => current = self.parent(current)?,
            }
        }
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match (&self.nodes[current.0].kind, self.nodes[current.0].parent) {
                (_, Some(parent)) => current = parent,
                (NodeKind::ShadowRoot { host }, None) => current = *host,
                _ => return false,
            }
        }
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Element descendants of `scope` in document order. Does not enter
    /// encapsulated subtrees or `<template>` contents.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            let Some(el) = self.element(id) else {
                continue;
            };
            out.push(id);
            if el.tag == "template" {
                continue;
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    pub fn find_all(&self, scope: NodeId, pred: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.element(*id).map(&pred).unwrap_or(false))
            .collect()
    }

    pub fn find_first(&self, scope: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|id| self.element(*id).map(&pred).unwrap_or(false))
    }

    pub fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.find_all(scope, |el| selector.matches(el))
    }

    pub fn query(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.find_first(scope, |el| selector.matches(el))
    }

    /// Nearest inclusive ancestor matching `pred`, within the same tree.
    pub fn closest(&self, id: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            let el = self.element(node)?;
            if pred(el) {
                return Some(node);
            }
            current = self.parent_element(node);
        }
        None
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|c| *c == id)?;
        siblings[..pos]
            .iter()
            .rev()
            .copied()
            .find(|s| self.element(*s).is_some())
    }

    /// Concatenated text of the light subtree.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element(el) if el.tag == "template" => {}
            _ => {
                for child in &self.nodes[id.0].children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    fn tree_root(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    // =========================================================================
    // Values and state
    // =========================================================================

    /// `(value, label)` pairs of a select's options.
    pub fn options(&self, select: NodeId) -> Vec<(String, String)> {
        self.find_all(select, |el| el.tag == "option")
            .into_iter()
            .map(|opt| {
                let label = self.text_content(opt).trim().to_string();
                let value = self
                    .attr(opt, "value")
                    .map(str::to_string)
                    .unwrap_or_else(|| label.clone());
                (value, label)
            })
            .collect()
    }

    /// Script-level value. Selects report the chosen option, components with
    /// a value property report it, editable regions report their text.
    pub fn value(&self, id: NodeId) -> String {
        let Some(el) = self.element(id) else {
            return String::new();
        };

        if el.tag == "select" {
            if !el.value.is_empty() {
                return el.value.clone();
            }
            let selected = self
                .find_first(id, |o| o.tag == "option" && o.has_attr("selected"))
                .or_else(|| self.find_first(id, |o| o.tag == "option"));
            return match selected {
                Some(opt) => self
                    .attr(opt, "value")
                    .map(str::to_string)
                    .unwrap_or_else(|| self.text_content(opt).trim().to_string()),
                None => String::new(),
            };
        }

        if !el.is_native_field() {
            if let Some(value) = el.component.as_ref().and_then(|c| c.value.clone()) {
                return value;
            }
            if el.is_content_editable() {
                return self.text_content(id);
            }
        }
        el.value.clone()
    }

    /// Assign a value the way script assignment would. Returns false when
    /// the element cannot take it (a select without a matching option).
    pub fn set_value(&mut self, id: NodeId, value: &str) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        let is_select = el.tag == "select";
        let is_native = el.is_native_field();
        let has_value_property = el.component.as_ref().is_some_and(|c| c.value.is_some());
        let editable = el.is_content_editable();

        if is_select && !self.options(id).iter().any(|(v, _)| v == value) {
            return false;
        }

        if !is_native && has_value_property {
            if let Some(surface) = self.element_mut(id).and_then(|e| e.component.as_mut()) {
                surface.value = Some(value.to_string());
            }
            return true;
        }

        if !is_native && editable {
            for child in self.children(id).to_vec() {
                self.detach(child);
            }
            self.append_text(id, value);
            return true;
        }

        if let Some(el) = self.element_mut(id) {
            el.value = value.to_string();
        }
        true
    }

    pub fn checked(&self, id: NodeId) -> bool {
        self.element(id).map(|el| el.checked).unwrap_or(false)
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) {
        if let Some(el) = self.element_mut(id) {
            el.checked = checked;
        }
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        let Some(el) = self.element_mut(id) else {
            return;
        };
        if el.has_class(class) {
            return;
        }
        let joined = match el.attr_nonempty("class") {
            Some(existing) => format!("{} {}", existing, class),
            None => class.to_string(),
        };
        el.set_attr("class", &joined);
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        let Some(el) = self.element_mut(id) else {
            return;
        };
        let remaining: Vec<&str> = el.classes().filter(|c| *c != class).collect();
        let joined = remaining.join(" ");
        el.set_attr("class", &joined);
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_class(class))
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn focus(&mut self, id: NodeId) {
        self.focused = Some(id);
        self.dispatch(id, EventKind::Focus, false);
    }

    pub fn blur(&mut self, id: NodeId) {
        if self.focused == Some(id) {
            self.focused = None;
        }
        self.dispatch(id, EventKind::Blur, false);
    }

    pub fn dispatch(&mut self, target: NodeId, kind: EventKind, composed: bool) {
        self.events.push(DispatchedEvent {
            target,
            kind,
            composed,
        });
    }

    pub fn events(&self) -> &[DispatchedEvent] {
        &self.events
    }

    pub fn events_for(&self, target: NodeId) -> Vec<&EventKind> {
        self.events
            .iter()
            .filter(|e| e.target == target)
            .map(|e| &e.kind)
            .collect()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
        self.calls.clear();
    }

    /// Call a component method. `setValue`/`updateValue` assign the
    /// component's value property. Returns false when the method is absent.
    pub fn invoke(&mut self, target: NodeId, method: &str, argument: &str) -> bool {
        let Some(surface) = self.element_mut(target).and_then(|el| el.component.as_mut()) else {
            return false;
        };
        if !surface.has_method(method) {
            return false;
        }
        if matches!(method, "setValue" | "updateValue") {
            surface.value = Some(argument.to_string());
        }
        self.calls.push(MethodCall {
            target,
            method: method.to_string(),
            argument: argument.to_string(),
        });
        true
    }

    pub fn calls(&self) -> &[MethodCall] {
        &self.calls
    }

    /// Activate an element. Disabled elements ignore activation and return
    /// false.
    pub fn click(&mut self, id: NodeId) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        if el.is_disabled() {
            return false;
        }

        let input_type = el.input_type();
        let is_input = el.tag == "input";
        let name = el.name().to_string();
        let action = el.on_click.clone();

        self.dispatch(id, EventKind::Click, false);

        if is_input && input_type == "checkbox" {
            let now = !self.checked(id);
            self.set_checked(id, now);
            self.dispatch(id, EventKind::Input, false);
            self.dispatch(id, EventKind::Change, false);
        } else if is_input && input_type == "radio" && !self.checked(id) {
            if !name.is_empty() {
                let scope = self.tree_root(id);
                let group = self.find_all(scope, |o| {
                    o.tag == "input" && o.input_type() == "radio" && o.name() == name
                });
                for member in group {
                    self.set_checked(member, false);
                }
            }
            self.set_checked(id, true);
            self.dispatch(id, EventKind::Input, false);
            self.dispatch(id, EventKind::Change, false);
        }

        if let Some(action) = action {
            self.run_click_action(&action);
        }
        true
    }

    fn run_click_action(&mut self, action: &ClickAction) {
        match action {
            ClickAction::Reveal { template, into } => {
                let (Some(template), Some(into)) = (self.resolve(template), self.resolve(into))
                else {
                    warn!(?action, "click action targets not found");
                    return;
                };
                for child in self.children(template).to_vec() {
                    let copy = self.deep_clone(child);
                    self.append_child(into, copy);
                }
                debug!(?action, "revealed template contents");
            }
            ClickAction::CommitValue { source, into } => {
                let (Some(source), Some(into)) = (self.resolve(source), self.resolve(into)) else {
                    warn!(?action, "click action targets not found");
                    return;
                };
                let value = self.value(source);
                if value.is_empty() {
                    return;
                }
                let chip = self.append_element(into, "span", &[("class", "chip")]);
                self.append_text(chip, &value);
                self.set_value(source, "");
            }
        }
    }

    fn resolve(&self, selector: &str) -> Option<NodeId> {
        match Selector::parse(selector) {
            Ok(sel) => self.query(self.root, &sel),
            Err(e) => {
                warn!(error = %e, "invalid click action selector");
                None
            }
        }
    }

    // =========================================================================
    // Mutation observation
    // =========================================================================

    pub fn observe(&mut self) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.insert(id, Vec::new());
        id
    }

    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .get_mut(&observer)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    pub fn disconnect(&mut self, observer: ObserverId) {
        self.observers.remove(&observer);
    }

    pub fn is_observing(&self, observer: ObserverId) -> bool {
        self.observers.contains_key(&observer)
    }
}
