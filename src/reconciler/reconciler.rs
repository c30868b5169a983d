use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    applicator::{Applicator, FillOutcome, highlight::HighlightTracker},
    cli::config::AppConfig,
    component::StrategyResolver,
    dom::{Document, NodeId, ObserverId},
    field::identity::element_keys,
    reconciler::{index::FieldIndex, pending::PendingQueue},
    timing::Pacer,
};

/// Everything the engine remembers about one page. Discarded with it.
#[derive(Debug, Default)]
pub struct PageState {
    pub index: FieldIndex,
    pub pending: PendingQueue,
    pub strategies: StrategyResolver,
    pub highlights: HighlightTracker,
}

impl PageState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// What one debounced reconciliation pass did.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub indexed: usize,
    pub applied: Vec<FillOutcome>,
    pub still_pending: usize,
}

/// Subscribes to document mutations and replays pending suggestions once
/// their fields show up.
///
/// Mutation batches are coalesced: each batch pushes the deadline to
/// `now + debounce`, and the pass runs on the first `pump` at or after it.
#[derive(Debug, Default)]
pub struct Reconciler {
    observer: Option<ObserverId>,
    state: PageState,
    added: Vec<NodeId>,
    analysis_queue: Vec<NodeId>,
    deadline: Option<u64>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    pub fn is_installed(&self) -> bool {
        self.observer.is_some()
    }

    /// Subscribe to mutations and index the current document. Idempotent.
    pub fn install(&mut self, doc: &mut Document) {
        if self.observer.is_none() {
            self.observer = Some(doc.observe());
        }
        self.state.index.rebuild(doc);
        info!(indexed = self.state.index.len(), "reconciler installed");
    }

    /// Drop the subscription and any unflushed batch. Page state is kept.
    pub fn uninstall(&mut self, doc: &mut Document) {
        if let Some(observer) = self.observer.take() {
            doc.disconnect(observer);
        }
        self.added.clear();
        self.analysis_queue.clear();
        self.deadline = None;
        debug!("reconciler uninstalled");
    }

    /// Time of the next due pass, if a batch is waiting.
    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    /// Pull mutation records and run a pass once the debounce window has
    /// elapsed. Component analysis queued by the previous pass runs first.
    pub fn pump(
        &mut self,
        doc: &mut Document,
        pacer: &dyn Pacer,
        config: &AppConfig,
    ) -> Option<ReconcileReport> {
        self.analyze_components(doc);

        let now = pacer.now_ms();
        self.state.highlights.expire(doc, now);

        if let Some(observer) = self.observer {
            let records = doc.take_records(observer);
            if !records.is_empty() {
                debug!(count = records.len(), "mutation batch received");
                self.added.extend(records.into_iter().map(|r| r.added));
                self.deadline = Some(now + config.timing.debounce_ms);
            }
        }

        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(self.flush(doc, pacer, config))
            }
            _ => None,
        }
    }

    fn flush(&mut self, doc: &mut Document, pacer: &dyn Pacer, config: &AppConfig) -> ReconcileReport {
        let added = std::mem::take(&mut self.added);

        let mut fresh = Vec::new();
        for node in added {
            if !doc.is_connected(node) {
                continue;
            }
            fresh.extend(self.state.index.index_subtree(doc, node));
        }

        let mut keys = HashSet::new();
        for node in &fresh {
            if doc.element(*node).is_some_and(|el| el.is_custom()) {
                self.analysis_queue.push(*node);
            }
            keys.extend(element_keys(doc, *node));
        }

        let due: Vec<String> = self
            .state
            .pending
            .identifiers()
            .filter(|id| keys.contains(*id))
            .map(str::to_string)
            .collect();

        let mut applied = Vec::new();
        for identifier in due {
            let Some(suggestion) = self.state.pending.get(&identifier).cloned() else {
                continue;
            };
            let outcome = Applicator::new(doc, &mut self.state, pacer, config).apply(&suggestion, false);
            if outcome.success {
                self.state.pending.remove(&identifier);
                info!(identifier = %identifier, "pending suggestion applied");
            } else {
                debug!(identifier = %identifier, "pending suggestion still unresolved");
            }
            applied.push(outcome);
        }

        let report = ReconcileReport {
            indexed: fresh.len(),
            applied,
            still_pending: self.state.pending.len(),
        };
        info!(
            indexed = report.indexed,
            applied = report.applied.len(),
            pending = report.still_pending,
            "reconciliation pass"
        );
        report
    }

    /// Resolve strategies for components seen in earlier passes.
    fn analyze_components(&mut self, doc: &Document) {
        for component in std::mem::take(&mut self.analysis_queue) {
            self.state.strategies.resolve(doc, component);
        }
    }
}
