use field_autofill::{
    cli::config::DetectionConfig,
    dom::Rect,
    patterns::{
        TriggerMatcher, detect_array_pattern, find_add_control,
        trigger::{find_trigger, trigger_selector},
    },
};

use crate::common::pages::{form_page, tags_page, text_with};

mod common;

// =========================================================================
// Array-pattern proximity
// =========================================================================

#[test]
fn add_control_exactly_at_threshold_is_excluded() {
    let (doc, input, _) = tags_page(200.0);
    let config = DetectionConfig::default();

    assert_eq!(find_add_control(&doc, input, &config), None, "Distance 200 is not below 200");
    assert!(!detect_array_pattern(&doc, input, &config).is_array);
}

#[test]
fn add_control_just_inside_threshold_is_included() {
    let (doc, input, button) = tags_page(199.0);
    let config = DetectionConfig::default();

    assert_eq!(find_add_control(&doc, input, &config), Some(button));
    let pattern = detect_array_pattern(&doc, input, &config);
    assert!(pattern.is_array);
    assert_eq!(pattern.add_control_text.as_deref(), Some("+ Add"));
}

#[test]
fn vertical_offset_counts_toward_distance() {
    let (mut doc, input, button) = tags_page(150.0);
    doc.set_rect(button, Rect::new(250.0, 60.0, 40.0, 20.0));

    assert_eq!(
        find_add_control(&doc, input, &DetectionConfig::default()),
        None,
        "150 horizontal + 60 vertical is out of range"
    );
}

#[test]
fn add_control_found_in_grandparent_container() {
    let (mut doc, form) = form_page();
    let group = doc.append_element(form, "div", &[("class", "group")]);
    let row = doc.append_element(group, "div", &[("class", "row")]);
    let input = doc.append_element(row, "input", &[("name", "skills")]);
    doc.set_rect(input, Rect::new(0.0, 0.0, 100.0, 20.0));
    let add = doc.append_element(group, "input", &[("type", "button"), ("value", "Insert")]);
    doc.set_rect(add, Rect::new(110.0, 30.0, 50.0, 20.0));

    assert_eq!(
        find_add_control(&doc, input, &DetectionConfig::default()),
        Some(add),
        "Input buttons match on their value"
    );
}

#[test]
fn vocabulary_is_configurable() {
    let (mut doc, form) = form_page();
    let row = doc.append_element(form, "div", &[]);
    let input = doc.append_element(row, "input", &[("name", "langs")]);
    text_with(&mut doc, row, "button", &[], "Ajouter");

    let default = DetectionConfig::default();
    assert_eq!(find_add_control(&doc, input, &default), None);

    let french = DetectionConfig {
        add_vocabulary: vec!["ajouter".into()],
        ..DetectionConfig::default()
    };
    assert!(find_add_control(&doc, input, &french).is_some());
}

// =========================================================================
// Trigger controls
// =========================================================================

#[test]
fn trigger_patterns_are_case_insensitive() {
    let matcher = TriggerMatcher::new(&DetectionConfig::default().trigger_patterns);

    assert!(matcher.matches("+ Add"));
    assert!(matcher.matches("ADD EXPERIENCE"));
    assert!(matcher.matches("Another reference"));
    assert!(matcher.matches("New project"));
    assert!(!matcher.matches("Submit"));
    assert!(!matcher.matches("Add"), "Bare 'Add' needs a following word or a plus");
}

#[test]
fn invalid_trigger_patterns_are_skipped() {
    let matcher = TriggerMatcher::new(&["(unclosed".to_string(), "extra".to_string()]);
    assert!(matcher.matches("Extra section"));
    assert!(!matcher.matches("(unclosed"));
}

#[test]
fn trigger_selector_prefers_id_then_class() {
    let (mut doc, form) = form_page();
    let with_id = doc.append_element(form, "button", &[("id", "add-job"), ("class", "btn")]);
    let with_class = doc.append_element(form, "button", &[("class", "btn primary")]);
    let bare = doc.append_element(form, "button", &[]);

    assert_eq!(trigger_selector(doc.element(with_id).unwrap()).as_deref(), Some("#add-job"));
    assert_eq!(trigger_selector(doc.element(with_class).unwrap()).as_deref(), Some(".btn"));
    assert_eq!(trigger_selector(doc.element(bare).unwrap()), None);
}

#[test]
fn find_trigger_by_selector_or_text() {
    let (mut doc, form) = form_page();
    let by_id = text_with(&mut doc, form, "button", &[("id", "add-edu")], "Add education");
    let by_text = text_with(&mut doc, form, "div", &[("role", "button")], "  Another   Reference ");

    assert_eq!(find_trigger(&doc, "#add-edu"), Some(by_id));
    assert_eq!(find_trigger(&doc, "another reference"), Some(by_text), "Whitespace and case ignored");
    assert_eq!(find_trigger(&doc, "Add skills"), None);
}
