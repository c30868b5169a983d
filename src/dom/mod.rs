//! In-memory live document: an arena tree with encapsulated (shadow) subtrees,
//! layout boxes, an event log and mutation observation.

pub mod document;
pub mod events;
pub mod node;
pub mod selector;
pub mod snapshot;

pub use document::Document;
pub use events::{DispatchedEvent, EventKind, MethodCall, MutationRecord, ObserverId};
pub use node::{ClickAction, ComponentSurface, Element, NodeId, Rect};
pub use selector::Selector;
