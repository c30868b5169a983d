use field_autofill::{
    AutofillSession, FillError,
    cli::config::AppConfig,
    dom::ComponentSurface,
    field::{InteractionHint, SuggestedValue, Suggestion},
    reconciler::FieldIndex,
    timing::VirtualPacer,
};

use crate::common::pages::{component, email_page, form_page, session};

mod common;

fn phone() -> Suggestion {
    Suggestion::new("phone", SuggestedValue::from("555-0100"))
}

// =========================================================================
// Pending suggestions
// =========================================================================

#[test]
fn missing_field_becomes_pending() {
    let (mut doc, _) = email_page();
    let mut session = session();
    session.install(&mut doc);

    let outcome = session.apply(&mut doc, &phone());

    assert!(!outcome.success);
    assert!(outcome.pending, "Retry allowed by default");
    assert_eq!(
        outcome.error,
        Some(FillError::TargetNotFound { field: "phone".into() })
    );
    assert!(session.state().pending.contains("phone"), "Pending entry for 'phone' exists");
}

#[test]
fn missing_field_without_retry_is_plain_failure() {
    let (mut doc, _) = email_page();
    let mut config = AppConfig::default();
    config.fill.retry_on_failure = false;
    let mut session = AutofillSession::with_pacer(config, VirtualPacer::new());

    let outcome = session.apply(&mut doc, &phone());
    assert!(!outcome.success);
    assert!(!outcome.pending);
    assert!(session.state().pending.is_empty());
}

#[test]
fn pending_applied_once_field_appears_after_debounce() {
    let (mut doc, email) = email_page();
    let form = doc.parent(email).unwrap();
    let mut session = session();
    session.install(&mut doc);
    session.apply(&mut doc, &phone());

    let input = doc.append_element(form, "input", &[("name", "phone"), ("type", "tel")]);
    assert!(session.pump(&mut doc).is_none(), "Batch received, window just opened");

    session.pacer().advance(499);
    assert!(session.pump(&mut doc).is_none(), "499 units is still inside the window");
    assert_eq!(doc.value(input), "");

    session.pacer().advance(1);
    let report = session.pump(&mut doc).expect("pass due at 500");
    assert_eq!(report.applied.len(), 1);
    assert!(report.applied[0].success);
    assert_eq!(report.still_pending, 0);
    assert_eq!(doc.value(input), "555-0100");
    assert!(!session.state().pending.contains("phone"), "Removed after a successful fill");
}

#[test]
fn pending_replayed_when_field_appears_under_its_id() {
    let (mut doc, email) = email_page();
    let form = doc.parent(email).unwrap();
    let mut session = session();
    session.install(&mut doc);
    session.apply(&mut doc, &phone());

    let input = doc.append_element(form, "input", &[("name", "tel"), ("id", "phone")]);
    session.pump(&mut doc);
    session.pacer().advance(500);
    let report = session.pump(&mut doc).expect("pass due at 500");

    assert_eq!(report.applied.len(), 1, "Matched through the id, not the name");
    assert!(report.applied[0].success);
    assert_eq!(report.still_pending, 0);
    assert_eq!(doc.value(input), "555-0100");
}

#[test]
fn pending_component_replayed_by_binding_attribute() {
    let (mut doc, form) = form_page();
    let mut session = session();
    session.install(&mut doc);
    session.apply(&mut doc, &Suggestion::new("address.zip", SuggestedValue::from("75001")));
    assert!(session.state().pending.contains("address.zip"));

    let (_, inner) = component(
        &mut doc,
        form,
        "amplify-text-field",
        &[("name", "zip"), ("amplify-child-path", "address.zip")],
        ComponentSurface::default(),
    );
    session.pump(&mut doc);
    session.pacer().advance(500);
    session.pump(&mut doc).expect("pass due at 500");

    assert!(session.state().pending.is_empty());
    assert_eq!(doc.value(inner), "75001");
}

#[test]
fn bursts_extend_the_debounce_window() {
    let (mut doc, form) = form_page();
    let mut session = session();
    session.install(&mut doc);

    doc.append_element(form, "div", &[]);
    session.pump(&mut doc);
    session.pacer().advance(300);

    doc.append_element(form, "div", &[]);
    assert!(session.pump(&mut doc).is_none());
    assert_eq!(session.reconciler().deadline(), Some(800), "Second batch restarts the window");

    session.pacer().advance(300);
    assert!(session.pump(&mut doc).is_none(), "600 < 800");
    session.pacer().advance(200);
    assert!(session.pump(&mut doc).is_some(), "One coalesced pass");
    assert!(session.pump(&mut doc).is_none(), "Nothing left to flush");
}

#[test]
fn pending_kept_when_new_field_cannot_be_filled() {
    let (mut doc, form) = form_page();
    let mut session = session();
    session.install(&mut doc);
    session.apply(&mut doc, &phone());

    doc.append_element(form, "input", &[("name", "phone"), ("readonly", "")]);
    session.pump(&mut doc);
    session.pacer().advance(500);
    let report = session.pump(&mut doc).unwrap();

    assert_eq!(report.applied.len(), 1);
    assert_eq!(
        report.applied[0].error,
        Some(FillError::TargetUnwritable { field: "phone".into() })
    );
    assert!(session.state().pending.contains("phone"), "Only success removes the entry");
}

#[test]
fn unrelated_additions_leave_pending_alone() {
    let (mut doc, form) = form_page();
    let mut session = session();
    session.install(&mut doc);
    session.apply(&mut doc, &phone());

    doc.append_element(form, "input", &[("name", "fax")]);
    session.pump(&mut doc);
    session.pacer().advance(500);
    let report = session.pump(&mut doc).unwrap();

    assert!(report.applied.is_empty());
    assert_eq!(report.indexed, 1);
    assert_eq!(report.still_pending, 1);
}

#[test]
fn pending_component_filled_when_it_appears() {
    let (mut doc, form) = form_page();
    let mut session = session();
    session.install(&mut doc);
    let suggestion = Suggestion::new("city", SuggestedValue::from("Lyon"))
        .hint(InteractionHint::ShadowScope);
    assert!(session.apply(&mut doc, &suggestion).pending);

    let (host, inner) = component(
        &mut doc,
        form,
        "zbk-input",
        &[("name", "city")],
        ComponentSurface::with_value(""),
    );
    session.pump(&mut doc);
    session.pacer().advance(500);
    let report = session.pump(&mut doc).unwrap();

    assert!(report.applied[0].success);
    assert!(report.applied[0].used_shadow_scope);
    assert_eq!(doc.value(inner), "Lyon");
    assert_eq!(doc.value(host), "Lyon", "Mirrored onto the component");

    session.pump(&mut doc);
    assert!(
        session.state().strategies.cached("zbk-input").is_some(),
        "New component tags are analysed after the pass"
    );
}

#[test]
fn teardown_stops_observation() {
    let (mut doc, form) = form_page();
    let mut session = session();
    session.install(&mut doc);
    session.apply(&mut doc, &phone());
    session.teardown(&mut doc);

    doc.append_element(form, "input", &[("name", "phone")]);
    session.pacer().advance(1000);
    assert!(session.pump(&mut doc).is_none(), "No subscription, no pass");
    assert!(!session.reconciler().is_installed());
    assert!(session.state().pending.contains("phone"), "State survives until the page goes");
}

// =========================================================================
// Live index
// =========================================================================

#[test]
fn index_keeps_first_connected_element_per_key() {
    let (mut doc, form) = form_page();
    let first = doc.append_element(form, "input", &[("name", "dup")]);
    let second = doc.append_element(form, "input", &[("name", "dup")]);

    let mut index = FieldIndex::new();
    index.rebuild(&doc);
    assert_eq!(index.lookup(&doc, "dup"), Some(first), "First structural match wins");

    doc.remove(first);
    assert_eq!(index.lookup(&doc, "dup"), None, "Detached entries are not returned");
    index.index_node(&doc, second);
    assert_eq!(index.lookup(&doc, "dup"), Some(second), "Stale entry replaced");
}

#[test]
fn index_answers_to_every_identity() {
    let (mut doc, form) = form_page();
    let input = doc.append_element(form, "input", &[("name", "tel"), ("id", "phone")]);
    let (host, _) = component(
        &mut doc,
        form,
        "zbk-text-input",
        &[("formcontrolname", "city"), ("id", "city-field")],
        ComponentSurface::default(),
    );

    let mut index = FieldIndex::new();
    index.rebuild(&doc);

    assert_eq!(index.lookup(&doc, "tel"), Some(input));
    assert_eq!(index.lookup(&doc, "phone"), Some(input), "Id indexed alongside the name");
    assert_eq!(index.lookup(&doc, "city"), Some(host), "Binding attribute value");
    assert_eq!(index.lookup(&doc, "city-field"), Some(host));
    assert_eq!(index.index_node(&doc, input), vec!["tel".to_string(), "phone".to_string()]);
}
