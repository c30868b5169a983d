use field_autofill::{
    cli::config::AppConfig,
    dom::{ClickAction, ComponentSurface, Document, NodeId, Rect},
    timing::VirtualPacer,
    AutofillSession,
};

pub const PAGE_URL: &str = "https://example.com/signup";
pub const QUESTION_FORM_URL: &str = "https://docs.google.com/forms/d/e/abc/viewform";

pub fn session() -> AutofillSession<VirtualPacer> {
    AutofillSession::with_pacer(AppConfig::default(), VirtualPacer::new())
}

/// `<form>` appended to the document root.
pub fn form_page() -> (Document, NodeId) {
    let mut doc = Document::new(PAGE_URL);
    let root = doc.root();
    let form = doc.append_element(root, "form", &[("id", "signup")]);
    (doc, form)
}

pub fn text_with(doc: &mut Document, parent: NodeId, tag: &str, attrs: &[(&str, &str)], text: &str) -> NodeId {
    let node = doc.append_element(parent, tag, attrs);
    doc.append_text(node, text);
    node
}

/// One text input named `email`, no label.
pub fn email_page() -> (Document, NodeId) {
    let (mut doc, form) = form_page();
    let input = doc.append_element(form, "input", &[("type", "email"), ("name", "email")]);
    (doc, input)
}

/// Tag entry field with an add button placed `gap` units away. The button
/// turns the typed value into a chip under `#chips`.
pub fn tags_page(gap: f64) -> (Document, NodeId, NodeId) {
    let (mut doc, form) = form_page();
    let row = doc.append_element(form, "div", &[("class", "tag-row")]);
    let input = doc.append_element(row, "input", &[("type", "text"), ("name", "tags")]);
    doc.set_rect(input, Rect::new(0.0, 0.0, 100.0, 20.0));

    let button = text_with(&mut doc, row, "button", &[("type", "button"), ("id", "add-tag")], "+ Add");
    doc.set_rect(button, Rect::new(100.0 + gap, 0.0, 40.0, 20.0));
    doc.element_mut(button).unwrap().on_click = Some(ClickAction::CommitValue {
        source: "[name=\"tags\"]".into(),
        into: "#chips".into(),
    });

    doc.append_element(form, "div", &[("id", "chips")]);
    (doc, input, button)
}

/// Text of every chip committed under `#chips`.
pub fn chips(doc: &Document) -> Vec<String> {
    doc.find_all(doc.root(), |el| el.has_class("chip"))
        .into_iter()
        .map(|chip| doc.text_content(chip))
        .collect()
}

/// Custom component `<tag name=...>` with an encapsulated text input.
/// Returns `(component, inner input)`.
pub fn component(
    doc: &mut Document,
    parent: NodeId,
    tag: &str,
    attrs: &[(&str, &str)],
    surface: ComponentSurface,
) -> (NodeId, NodeId) {
    let host = doc.append_element(parent, tag, attrs);
    doc.element_mut(host).unwrap().component = Some(surface);
    let shadow = doc.attach_shadow(host);
    let wrapper = doc.append_element(shadow, "div", &[("class", "control")]);
    let inner = doc.append_element(wrapper, "input", &[("type", "text")]);
    (host, inner)
}

/// Question-form page with a name question, a radio question and a
/// dropdown question.
pub fn question_page() -> Document {
    let mut doc = Document::new(QUESTION_FORM_URL);
    let root = doc.root();
    let list = doc.append_element(root, "div", &[("role", "list")]);

    let q1 = doc.append_element(list, "div", &[("role", "listitem")]);
    text_with(&mut doc, q1, "div", &[("role", "heading")], "What is your name?");
    doc.append_element(q1, "input", &[("type", "text"), ("aria-label", "Your answer")]);

    let q2 = doc.append_element(list, "div", &[("role", "listitem")]);
    text_with(&mut doc, q2, "div", &[("role", "heading")], "Preferred contact");
    doc.append_element(
        q2,
        "input",
        &[("type", "radio"), ("name", "entry.2"), ("value", "email"), ("aria-label", "Email")],
    );
    doc.append_element(
        q2,
        "input",
        &[("type", "radio"), ("name", "entry.2"), ("value", "phone"), ("aria-label", "Phone call")],
    );

    let q3 = doc.append_element(list, "div", &[("role", "listitem")]);
    text_with(&mut doc, q3, "div", &[("role", "heading")], "Country");
    let select = doc.append_element(q3, "select", &[("name", "entry.3")]);
    text_with(&mut doc, select, "option", &[("value", "")], "Choose");
    text_with(&mut doc, select, "option", &[("value", "fr")], "France");
    text_with(&mut doc, select, "option", &[("value", "de")], "Germany");

    doc
}
