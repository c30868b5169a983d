use std::collections::BTreeMap;

use tracing::info;

use crate::field::suggestion::Suggestion;

/// Suggestions waiting for their field to appear, keyed by identifier.
/// Entries never expire; a later suggestion for the same key replaces the
/// earlier one.
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: BTreeMap<String, Suggestion>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, suggestion: Suggestion) {
        info!(identifier = %suggestion.identifier, "suggestion pending until its field appears");
        self.entries.insert(suggestion.identifier.clone(), suggestion);
    }

    pub fn get(&self, identifier: &str) -> Option<&Suggestion> {
        self.entries.get(identifier)
    }

    pub fn remove(&mut self, identifier: &str) -> Option<Suggestion> {
        self.entries.remove(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
