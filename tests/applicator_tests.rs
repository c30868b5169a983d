use field_autofill::{
    FillError,
    applicator::HIGHLIGHT_CLASS,
    dom::{ClickAction, ComponentSurface, EventKind, Rect},
    field::{InteractionHint, NestedSection, StructuralPattern, SuggestedValue, Suggestion},
};

use crate::common::pages::{chips, component, email_page, form_page, session, tags_page, text_with};

mod common;

fn suggest(identifier: &str, value: &str) -> Suggestion {
    Suggestion::new(identifier, SuggestedValue::from(value))
}

// =========================================================================
// Simple fields
// =========================================================================

#[test]
fn email_scenario_fills_plain_input() {
    let (mut doc, input) = email_page();
    let mut session = session();

    let outcome = session.apply(&mut doc, &suggest("email", "a@b.com"));

    assert!(outcome.success, "Outcome: {:?}", outcome);
    assert_eq!(outcome.error, None);
    assert!(!outcome.used_shadow_scope);
    assert_eq!(doc.value(input), "a@b.com");
    assert_eq!(
        doc.events_for(input),
        vec![&EventKind::Focus, &EventKind::Input, &EventKind::Change, &EventKind::Blur],
        "Focus, input/change, then blur"
    );
    assert_eq!(session.pacer().pauses(), vec![200, 50, 150], "Scroll, focus and value settles");
}

#[test]
fn highlight_clears_after_its_duration() {
    let (mut doc, input) = email_page();
    let mut session = session();
    session.apply(&mut doc, &suggest("email", "a@b.com"));
    assert!(doc.has_class(input, HIGHLIGHT_CLASS));

    session.pacer().advance(1999);
    session.pump(&mut doc);
    assert!(doc.has_class(input, HIGHLIGHT_CLASS), "Still inside the highlight window");

    session.pacer().advance(1);
    session.pump(&mut doc);
    assert!(!doc.has_class(input, HIGHLIGHT_CLASS));
    assert_eq!(session.state().highlights.active(), 0);
}

#[test]
fn list_value_on_simple_field_is_joined() {
    let (mut doc, input) = email_page();
    let mut session = session();

    let value = SuggestedValue::list(["a@b.com", "c@d.com"]);
    let outcome = session.apply(&mut doc, &Suggestion::new("email", value));

    assert!(outcome.success);
    assert_eq!(doc.value(input), "a@b.com, c@d.com");
}

#[test]
fn empty_identifier_is_rejected_without_pending() {
    let (mut doc, _) = email_page();
    let mut session = session();

    let outcome = session.apply(&mut doc, &suggest("  ", "x"));
    assert_eq!(outcome.error, Some(FillError::IdentifierMissing));
    assert!(!outcome.pending);
    assert!(session.state().pending.is_empty());
}

#[test]
fn disabled_or_readonly_fields_are_not_mutated() {
    let (mut doc, form) = form_page();
    let locked = doc.append_element(form, "input", &[("name", "locked"), ("disabled", "")]);
    let frozen = doc.append_element(form, "input", &[("name", "frozen"), ("readonly", ""), ("value", "keep")]);
    let mut session = session();

    let first = session.apply(&mut doc, &suggest("locked", "x"));
    let second = session.apply(&mut doc, &suggest("frozen", "x"));

    assert_eq!(first.error, Some(FillError::TargetUnwritable { field: "locked".into() }));
    assert_eq!(second.error, Some(FillError::TargetUnwritable { field: "frozen".into() }));
    assert!(!first.pending && !second.pending, "Unwritable fields are not retried");
    assert_eq!(doc.value(locked), "");
    assert_eq!(doc.value(frozen), "keep");
    assert!(doc.events().is_empty(), "No interaction at all");
}

#[test]
fn first_structural_match_wins_on_duplicate_names() {
    let (mut doc, form) = form_page();
    let first = doc.append_element(form, "input", &[("name", "city")]);
    let second = doc.append_element(form, "input", &[("id", "city")]);
    let mut session = session();

    session.apply(&mut doc, &suggest("city", "Oslo"));
    assert_eq!(doc.value(first), "Oslo");
    assert_eq!(doc.value(second), "", "Later duplicates are untouched");
}

// =========================================================================
// Choice fields
// =========================================================================

#[test]
fn checkbox_follows_value_truthiness() {
    let (mut doc, form) = form_page();
    let terms = doc.append_element(form, "input", &[("type", "checkbox"), ("name", "terms")]);
    let mut session = session();

    assert!(session.apply(&mut doc, &suggest("terms", "Yes")).success);
    assert!(doc.checked(terms));

    assert!(session.apply(&mut doc, &suggest("terms", "yes")).success);
    assert!(doc.checked(terms), "Already in the wanted state");

    let off = Suggestion::new("terms", SuggestedValue::from(false));
    assert!(session.apply(&mut doc, &off).success);
    assert!(!doc.checked(terms));
}

#[test]
fn radio_group_selected_by_label() {
    let (mut doc, form) = form_page();
    doc.append_element(form, "input", &[("type", "radio"), ("name", "plan"), ("value", "basic"), ("id", "p1")]);
    text_with(&mut doc, form, "label", &[("for", "p1")], "Basic plan");
    let pro = doc.append_element(form, "input", &[("type", "radio"), ("name", "plan"), ("value", "pro"), ("id", "p2")]);
    text_with(&mut doc, form, "label", &[("for", "p2")], "Pro plan");
    let mut session = session();

    let outcome = session.apply(&mut doc, &suggest("plan", "pro plan"));
    assert!(outcome.success, "Outcome: {:?}", outcome);
    assert!(doc.checked(pro));

    let outcome = session.apply(&mut doc, &suggest("plan", "enterprise"));
    assert_eq!(
        outcome.error,
        Some(FillError::OptionNotFound {
            field: "plan".into(),
            value: "enterprise".into()
        })
    );
    assert!(doc.checked(pro), "Selection unchanged");
}

#[test]
fn select_matches_value_then_label() {
    let (mut doc, form) = form_page();
    let select = doc.append_element(form, "select", &[("name", "size")]);
    text_with(&mut doc, select, "option", &[("value", "s")], "Small");
    text_with(&mut doc, select, "option", &[("value", "l")], "Large");
    let mut session = session();

    assert!(session.apply(&mut doc, &suggest("size", "l")).success);
    assert_eq!(doc.value(select), "l");
    assert!(session.apply(&mut doc, &suggest("size", "SMALL")).success);
    assert_eq!(doc.value(select), "s");

    let outcome = session.apply(&mut doc, &suggest("size", "xl"));
    assert!(matches!(outcome.error, Some(FillError::OptionNotFound { .. })));
    assert_eq!(doc.value(select), "s");
}

// =========================================================================
// Encapsulated components
// =========================================================================

#[test]
fn encapsulated_write_reaches_both_layers() {
    let (mut doc, form) = form_page();
    let (host, inner) = component(
        &mut doc,
        form,
        "zbk-text-input",
        &[("name", "city")],
        ComponentSurface::with_value("").method("setValue").method("updateValue"),
    );
    let mut session = session();

    let outcome = session.apply(&mut doc, &suggest("city", "Lyon"));

    assert!(outcome.success);
    assert!(outcome.used_shadow_scope, "Structural match descended into the component");
    assert_eq!(doc.value(inner), "Lyon");
    assert_eq!(doc.value(host), "Lyon");
    let methods: Vec<&str> = doc.calls().iter().map(|c| c.method.as_str()).collect();
    assert_eq!(methods, vec!["setValue", "updateValue"]);

    let inner_events = doc.events_for(inner);
    assert_eq!(inner_events.first(), Some(&&EventKind::Focus));
    assert_eq!(inner_events.last(), Some(&&EventKind::Blur));
    assert!(
        doc.events().iter().filter(|e| e.target == inner).all(|e| e.kind == EventKind::Focus
            || e.kind == EventKind::Blur
            || e.composed),
        "Value notifications cross the boundary"
    );
    assert_eq!(
        doc.events_for(host),
        vec![&EventKind::Input, &EventKind::Change, &EventKind::Blur]
    );
    assert!(doc.has_class(host, HIGHLIGHT_CLASS), "Highlight lands on the component");
    assert!(session.state().strategies.cached("zbk-text-input").is_some());
}

#[test]
fn binding_attribute_resolves_through_component_fallback() {
    let (mut doc, form) = form_page();
    let (_, inner) = component(
        &mut doc,
        form,
        "amplify-text-field",
        &[("amplify-child-path", "address.zip")],
        ComponentSurface::default(),
    );
    let mut session = session();

    let outcome = session.apply(&mut doc, &suggest("address.zip", "75001"));
    assert!(outcome.success);
    assert!(outcome.used_shadow_scope);
    assert_eq!(doc.value(inner), "75001");
}

#[test]
fn shadow_hint_skips_plain_lookup() {
    let (mut doc, form) = form_page();
    let plain = doc.append_element(form, "input", &[("name", "city")]);
    let mut session = session();

    let suggestion = suggest("city", "Lyon").hint(InteractionHint::ShadowScope);
    let outcome = session.apply(&mut doc, &suggestion);

    assert!(outcome.pending, "Only components are searched under the shadow hint");
    assert_eq!(doc.value(plain), "");
}

// =========================================================================
// Array fields
// =========================================================================

#[test]
fn tags_scenario_commits_each_value() {
    let (mut doc, input, _) = tags_page(50.0);
    let mut session = session();

    let suggestion = Suggestion::new("tags", SuggestedValue::list(["x", "y"]))
        .pattern(StructuralPattern::Array)
        .hint(InteractionHint::TypeAndAdd);
    let outcome = session.apply(&mut doc, &suggestion);

    assert!(outcome.success);
    assert_eq!(outcome.message, "Added 2/2 values");
    assert_eq!(outcome.values.len(), 2);
    assert!(outcome.values.iter().all(|v| v.success));
    assert_eq!(chips(&doc), vec!["x", "y"], "Two sequential fill+commit cycles");
    assert_eq!(doc.value(input), "", "Add control consumed the last value");
    assert_eq!(
        session.pacer().pauses(),
        vec![200, 50, 150, 400, 50, 150, 400],
        "Each commit settles before the next value"
    );
}

#[test]
fn disabled_add_control_commits_nothing() {
    let (mut doc, _, button) = tags_page(50.0);
    doc.set_attr(button, "disabled", "");
    let mut session = session();

    let suggestion = Suggestion::new("tags", SuggestedValue::list(["x", "y"]))
        .pattern(StructuralPattern::Array)
        .hint(InteractionHint::TypeAndAdd);
    let outcome = session.apply(&mut doc, &suggestion);

    assert!(!outcome.success);
    assert_eq!(outcome.message, "Added 0/2 values", "Refused commits are not counted");
    assert!(outcome.values.iter().all(|v| !v.success && v.error.is_some()));
    assert!(chips(&doc).is_empty());
    assert!(!session.pacer().pauses().contains(&400), "No commit settle without a commit");
}

#[test]
fn array_without_add_control_commits_with_enter() {
    let (mut doc, form) = form_page();
    let input = doc.append_element(form, "input", &[("name", "skills")]);
    let mut session = session();

    let suggestion = Suggestion::new("skills", SuggestedValue::list(["rust", "go"]))
        .pattern(StructuralPattern::Array);
    let outcome = session.apply(&mut doc, &suggestion);

    assert_eq!(outcome.message, "Added 2/2 values");
    let enters = doc
        .events_for(input)
        .into_iter()
        .filter(|k| **k == EventKind::KeyDown("Enter".into()))
        .count();
    assert_eq!(enters, 2);
    assert_eq!(session.pacer().pauses().iter().filter(|p| **p == 300).count(), 2);
}

#[test]
fn scalar_value_on_array_field_is_one_entry() {
    let (mut doc, _, _) = tags_page(20.0);
    let mut session = session();

    let suggestion = suggest("tags", "solo").pattern(StructuralPattern::Array);
    let outcome = session.apply(&mut doc, &suggestion);

    assert_eq!(outcome.message, "Added 1/1 values");
    assert_eq!(chips(&doc), vec!["solo"]);
}

#[test]
fn encapsulated_array_anchors_add_control_on_component() {
    let (mut doc, form) = form_page();
    let row = doc.append_element(form, "div", &[]);
    let (host, _) = component(
        &mut doc,
        row,
        "zbk-tag-input",
        &[("name", "langs")],
        ComponentSurface::with_value(""),
    );
    doc.set_rect(host, Rect::new(0.0, 0.0, 100.0, 20.0));
    let add = text_with(&mut doc, row, "button", &[], "Add");
    doc.set_rect(add, Rect::new(120.0, 0.0, 40.0, 20.0));
    doc.element_mut(add).unwrap().on_click = Some(ClickAction::CommitValue {
        source: "[name=\"langs\"]".into(),
        into: "#chips".into(),
    });
    doc.append_element(form, "div", &[("id", "chips")]);
    let mut session = session();

    let suggestion = Suggestion::new("langs", SuggestedValue::list(["fr", "en"]))
        .pattern(StructuralPattern::Array)
        .hint(InteractionHint::ShadowScope);
    let outcome = session.apply(&mut doc, &suggestion);

    assert!(outcome.used_shadow_scope);
    assert_eq!(chips(&doc), vec!["fr", "en"]);
}

// =========================================================================
// Nested sections
// =========================================================================

/// Form with an "Add education" trigger that reveals school/degree inputs.
fn education_page() -> field_autofill::dom::Document {
    let (mut doc, form) = form_page();
    let template = doc.append_element(form, "template", &[("id", "edu-row")]);
    doc.append_element(template, "input", &[("name", "school")]);
    doc.append_element(template, "input", &[("name", "degree")]);
    doc.append_element(form, "div", &[("id", "edu-list")]);
    let button = text_with(&mut doc, form, "button", &[("id", "add-edu"), ("type", "button")], "Add education");
    doc.element_mut(button).unwrap().on_click = Some(ClickAction::Reveal {
        template: "#edu-row".into(),
        into: "#edu-list".into(),
    });
    doc
}

fn education(trigger: &str) -> SuggestedValue {
    SuggestedValue::Section(
        NestedSection::new(trigger)
            .field("school", SuggestedValue::from("MIT"))
            .field("degree", SuggestedValue::from("BSc")),
    )
}

#[test]
fn nested_section_activates_trigger_then_fills() {
    let mut doc = education_page();
    let mut session = session();

    let outcome = session.apply(&mut doc, &Suggestion::new("education", education("#add-edu")));

    assert!(outcome.success, "Outcome: {:?}", outcome);
    assert_eq!(outcome.field, "education");
    assert_eq!(outcome.message, "Filled 2/2 fields in section");
    let school = doc.find_first(doc.root(), |el| el.name() == "school").unwrap();
    assert_eq!(doc.value(school), "MIT");
    assert!(session.pacer().pauses().contains(&800), "Reveal settle after activation");
}

#[test]
fn trigger_referenced_by_text() {
    let mut doc = education_page();
    let mut session = session();

    let outcome = session.apply(&mut doc, &Suggestion::new("education", education("add education")));
    assert!(outcome.success);
}

#[test]
fn missing_trigger_is_retried_then_aborts_section() {
    let mut doc = education_page();
    let mut session = session();

    let outcome = session.apply(&mut doc, &Suggestion::new("education", education("#add-job")));

    assert_eq!(
        outcome.error,
        Some(FillError::TriggerActivationFailed {
            trigger: "#add-job".into(),
            attempts: 3
        })
    );
    assert_eq!(session.pacer().pauses(), vec![500, 500], "Retry settles between attempts");
    assert!(session.state().pending.is_empty(), "Section fields never attempted");
}

#[test]
fn nested_array_aggregates_sections() {
    let mut doc = education_page();
    let mut session = session();

    let value = SuggestedValue::List(vec![education("#add-edu"), education("#add-job")]);
    let suggestion = Suggestion::new("education", value).pattern(StructuralPattern::NestedArray);
    let outcome = session.apply(&mut doc, &suggestion);

    assert!(outcome.success, "One section is enough");
    assert_eq!(outcome.message, "Filled 1/2 nested sections");
    assert_eq!(outcome.sections.len(), 2);
    assert!(!outcome.sections[1].success);
}

#[test]
fn mismatched_shapes_are_reported() {
    let (mut doc, _) = email_page();
    let mut session = session();

    let scalar_sections = suggest("email", "x").pattern(StructuralPattern::NestedArray);
    assert_eq!(
        session.apply(&mut doc, &scalar_sections).error,
        Some(FillError::StructuralMismatch {
            pattern: StructuralPattern::NestedArray,
            shape: "scalar".into()
        })
    );

    let section_array = Suggestion::new("email", education("#add-edu")).pattern(StructuralPattern::Array);
    assert_eq!(
        session.apply(&mut doc, &section_array).error,
        Some(FillError::StructuralMismatch {
            pattern: StructuralPattern::Array,
            shape: "nested section".into()
        })
    );

    let list_of_sections = Suggestion::new("email", SuggestedValue::List(vec![education("#add-edu")]));
    assert_eq!(
        session.apply(&mut doc, &list_of_sections).error,
        Some(FillError::StructuralMismatch {
            pattern: StructuralPattern::Simple,
            shape: "list".into()
        })
    );
    assert!(doc.events().is_empty(), "Nothing was written");
}

// =========================================================================
// apply_all
// =========================================================================

#[test]
fn apply_all_of_nothing_is_zero() {
    let (mut doc, _) = email_page();
    let mut session = session();

    let report = session.apply_all(&mut doc, &[]);
    assert_eq!((report.summary.total, report.summary.succeeded, report.summary.failed), (0, 0, 0));
    assert!(report.results.is_empty());
    assert!(session.pacer().pauses().is_empty());
}

#[test]
fn apply_all_keeps_order_and_counts() {
    let (mut doc, _) = email_page();
    let mut session = session();

    let suggestions = vec![suggest("email", "a@b.com"), suggest("phone", "555"), suggest("", "x")];
    let report = session.apply_all(&mut doc, &suggestions);

    let fields: Vec<&str> = report.results.iter().map(|r| r.field.as_str()).collect();
    assert_eq!(fields, vec!["email", "phone", ""], "Input order preserved");
    assert_eq!(report.summary.total, suggestions.len());
    assert_eq!(report.summary.succeeded, 1);
    assert_eq!(report.summary.failed, 2);
    assert_eq!(
        report.summary.succeeded + report.summary.failed,
        report.summary.total,
        "Every item is counted once"
    );
    assert_eq!(
        session.pacer().pauses().iter().filter(|p| **p == 100).count(),
        2,
        "Settle between consecutive items"
    );
    assert!(session.state().pending.contains("phone"), "Failures do not stop the batch");
}
