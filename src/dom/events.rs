use serde::Serialize;

use crate::dom::node::NodeId;

/// Notifications raised on elements, either by the engine or by activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "key", rename_all = "snake_case")]
pub enum EventKind {
    Focus,
    Blur,
    Input,
    Change,
    Click,
    KeyDown(String),
    KeyPress(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedEvent {
    pub target: NodeId,
    pub kind: EventKind,
    /// Crosses encapsulation boundaries (raised for component reactivity).
    pub composed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub target: NodeId,
    pub method: String,
    pub argument: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub(crate) u64);

/// One attachment of a node (and its subtree) to the connected tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub added: NodeId,
}
