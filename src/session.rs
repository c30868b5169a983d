use crate::{
    applicator::{Applicator, ApplyAllReport, FillOutcome},
    cli::config::AppConfig,
    dom::Document,
    field::{DetectedFieldBatch, FieldDescriptor, Suggestion},
    reconciler::{PageState, ReconcileReport, Reconciler},
    scanner::Scanner,
    timing::{Pacer, SystemPacer},
};

/// One page's worth of engine: configuration, a clock and the reconciler
/// that owns the page state. Build one per document and drop it with the
/// page.
pub struct AutofillSession<P: Pacer = SystemPacer> {
    config: AppConfig,
    pacer: P,
    scanner: Scanner,
    reconciler: Reconciler,
}

impl AutofillSession<SystemPacer> {
    pub fn new(config: AppConfig) -> Self {
        Self::with_pacer(config, SystemPacer::new())
    }
}

impl<P: Pacer> AutofillSession<P> {
    pub fn with_pacer(config: AppConfig, pacer: P) -> Self {
        AutofillSession {
            scanner: Scanner::new(&config.detection),
            config,
            pacer,
            reconciler: Reconciler::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    pub fn state(&self) -> &PageState {
        self.reconciler.state()
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Start observing the document and index what is already there.
    pub fn install(&mut self, doc: &mut Document) {
        self.reconciler.install(doc);
    }

    pub fn teardown(&mut self, doc: &mut Document) {
        self.reconciler.uninstall(doc);
    }

    pub fn scan(&self, doc: &Document) -> Vec<FieldDescriptor> {
        self.scanner.scan(doc)
    }

    pub fn detect(&self, doc: &Document) -> DetectedFieldBatch {
        self.scanner.detect(doc)
    }

    pub fn apply(&mut self, doc: &mut Document, suggestion: &Suggestion) -> FillOutcome {
        let retry = self.config.fill.retry_on_failure;
        Applicator::new(doc, self.reconciler.state_mut(), &self.pacer, &self.config).apply(suggestion, retry)
    }

    pub fn apply_all(&mut self, doc: &mut Document, suggestions: &[Suggestion]) -> ApplyAllReport {
        let retry = self.config.fill.retry_on_failure;
        Applicator::new(doc, self.reconciler.state_mut(), &self.pacer, &self.config)
            .apply_all(suggestions, retry)
    }

    /// Feed pending mutations to the reconciler. Returns a report when a
    /// debounced pass ran.
    pub fn pump(&mut self, doc: &mut Document) -> Option<ReconcileReport> {
        self.reconciler.pump(doc, &self.pacer, &self.config)
    }
}
