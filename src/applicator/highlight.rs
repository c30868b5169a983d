use tracing::debug;

use crate::dom::{Document, NodeId};

pub const HIGHLIGHT_CLASS: &str = "autofilled";

/// Transient "autofilled" marker. Purely visual; never affects outcomes.
#[derive(Debug, Default)]
pub struct HighlightTracker {
    active: Vec<(NodeId, u64)>,
}

impl HighlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `node` until `expires_at`. Re-marking extends the deadline.
    pub fn mark(&mut self, doc: &mut Document, node: NodeId, expires_at: u64) {
        doc.add_class(node, HIGHLIGHT_CLASS);
        self.active.retain(|(n, _)| *n != node);
        self.active.push((node, expires_at));
    }

    /// Clear every marker whose deadline has passed. Returns how many.
    pub fn expire(&mut self, doc: &mut Document, now: u64) -> usize {
        let (expired, live): (Vec<_>, Vec<_>) =
            self.active.drain(..).partition(|(_, at)| *at <= now);
        self.active = live;
        for (node, _) in &expired {
            doc.remove_class(*node, HIGHLIGHT_CLASS);
        }
        if !expired.is_empty() {
            debug!(count = expired.len(), "highlights cleared");
        }
        expired.len()
    }

    pub fn active(&self) -> usize {
        self.active.len()
    }
}
