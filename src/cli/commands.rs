use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::{
    applicator::ApplyAllReport,
    cli::config::AppConfig,
    dom::{
        snapshot::{load_document, write_document},
        Document,
    },
    error::AutofillError,
    field::{DetectedFieldBatch, load_suggestions},
    reconciler::ReconcileReport,
    session::AutofillSession,
    timing::{Pacer, VirtualPacer},
    trace::{FillTraceEvent, TraceLogger},
};

// ============================================================================
// detect subcommand
// ============================================================================

pub fn cmd_detect(
    document: &str,
    output: Option<&str>,
    config: &AppConfig,
) -> Result<DetectedFieldBatch, AutofillError> {
    let doc = load_document(Path::new(document))?;
    let session = AutofillSession::with_pacer(config.clone(), VirtualPacer::new());

    let batch = session.detect(&doc);
    info!(
        fields = batch.fields.len(),
        triggers = batch.trigger_buttons.len(),
        "detection complete"
    );

    emit_json(&batch, output, "detected field batch")?;
    Ok(batch)
}

// ============================================================================
// apply subcommand
// ============================================================================

/// What `apply` prints: the sequential report plus the reconciliation pass
/// that ran afterwards, and whatever is still pending.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRun {
    #[serde(flatten)]
    pub report: ApplyAllReport,
    pub reconciled: Vec<ReconcileReport>,
    pub pending: Vec<String>,
}

pub fn cmd_apply(
    document: &str,
    suggestions: &str,
    output: Option<&str>,
    trace: Option<&str>,
    no_retry: bool,
    config: &AppConfig,
) -> Result<ApplyRun, AutofillError> {
    let mut doc = load_document(Path::new(document))?;
    let suggestions = load_suggestions(Path::new(suggestions))?;
    let tracer = match trace {
        Some(path) => TraceLogger::new(Path::new(path)),
        None => TraceLogger::disabled(),
    };

    let mut config = config.clone();
    if no_retry {
        config.fill.retry_on_failure = false;
    }

    // Snapshots have no reactive logic of their own, so pauses are virtual.
    let mut session = AutofillSession::with_pacer(config, VirtualPacer::new());
    session.install(&mut doc);

    let report = session.apply_all(&mut doc, &suggestions);
    for (suggestion, outcome) in suggestions.iter().zip(&report.results) {
        tracer.log(&FillTraceEvent::now(suggestion).with_outcome(outcome));
    }

    let reconciled = drain_reconciliation(&mut session, &mut doc);
    let pending = session
        .state()
        .pending
        .identifiers()
        .map(str::to_string)
        .collect();
    session.teardown(&mut doc);

    if let Some(path) = output {
        write_document(&doc, Path::new(path))?;
        info!(path, "filled document written");
    }

    let run = ApplyRun {
        report,
        reconciled,
        pending,
    };
    emit_json(&run, None, "apply report")?;
    Ok(run)
}

// ============================================================================
// Helpers
// ============================================================================

/// Upper bound on debounce windows waited out after the sequential pass.
const MAX_RECONCILE_ROUNDS: usize = 8;

/// Pick up the mutations the sequential pass caused and wait out each
/// debounce window, so pending suggestions get their chance against
/// revealed fields.
fn drain_reconciliation(
    session: &mut AutofillSession<VirtualPacer>,
    doc: &mut Document,
) -> Vec<ReconcileReport> {
    let mut reports: Vec<ReconcileReport> = session.pump(doc).into_iter().collect();
    for _ in 0..MAX_RECONCILE_ROUNDS {
        let Some(deadline) = session.reconciler().deadline() else {
            break;
        };
        let now = session.pacer().now_ms();
        session.pacer().advance(deadline.saturating_sub(now));
        reports.extend(session.pump(doc));
    }
    reports
}

fn emit_json<T: Serialize>(value: &T, output: Option<&str>, context: &str) -> Result<(), AutofillError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| AutofillError::JsonSerialize {
        context: context.to_string(),
        source: e,
    })?;
    match output {
        Some(path) => std::fs::write(path, &json).map_err(|e| AutofillError::Io {
            path: path.to_string(),
            source: e,
        }),
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}
