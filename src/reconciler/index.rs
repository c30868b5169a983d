use std::collections::HashMap;

use tracing::debug;

use crate::{
    dom::{Document, Element, NodeId},
    field::identity::element_keys,
};

/// Elements the engine can write into: native controls, custom components
/// and editable regions.
pub fn is_field_capable(el: &Element) -> bool {
    el.is_native_field() || el.is_custom() || el.is_content_editable()
}

/// Live `identifier -> element` index. An element is indexed under each of
/// its identities; the first connected element indexed under a key keeps it.
#[derive(Debug, Default)]
pub struct FieldIndex {
    entries: HashMap<String, NodeId>,
}

impl FieldIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from the whole document.
    pub fn rebuild(&mut self, doc: &Document) {
        self.entries.clear();
        let indexed = self.index_subtree(doc, doc.root());
        debug!(count = indexed.len(), "field index rebuilt");
    }

    /// Index `node` under every identity if it is field-capable. Returns the
    /// keys it answers to, empty when it was not indexed.
    pub fn index_node(&mut self, doc: &Document, node: NodeId) -> Vec<String> {
        if !doc.element(node).is_some_and(is_field_capable) {
            return vec![];
        }
        let keys = element_keys(doc, node);
        for key in &keys {
            let stale = self
                .entries
                .get(key)
                .is_none_or(|existing| !doc.is_connected(*existing));
            if stale {
                self.entries.insert(key.clone(), node);
            }
        }
        keys
    }

    /// Index `root` and its light descendants. Returns the indexed nodes in
    /// document order.
    pub fn index_subtree(&mut self, doc: &Document, root: NodeId) -> Vec<NodeId> {
        std::iter::once(root)
            .chain(doc.descendants(root))
            .filter(|node| !self.index_node(doc, *node).is_empty())
            .collect()
    }

    /// Connected element indexed under `identifier`.
    pub fn lookup(&self, doc: &Document, identifier: &str) -> Option<NodeId> {
        self.entries
            .get(identifier)
            .copied()
            .filter(|node| doc.is_connected(*node))
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
