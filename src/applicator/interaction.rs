//! Low-level simulated interaction. Every write is followed by a settle
//! pause so the page's own reactive logic can catch up.

use tracing::debug;

use crate::{
    cli::config::TimingConfig,
    component::ComponentStrategy,
    dom::{Document, EventKind, NodeId},
    error::FillError,
    timing::Pacer,
};

fn settle(pacer: &dyn Pacer, ms: u64) {
    pacer.settle(TimingConfig::ms(ms));
}

/// Focus, assign, raise input/change, settle, blur.
pub fn write_plain(doc: &mut Document, pacer: &dyn Pacer, timing: &TimingConfig, node: NodeId, text: &str) {
    doc.focus(node);
    settle(pacer, timing.focus_ms);

    doc.set_value(node, text);
    doc.dispatch(node, EventKind::Input, false);
    doc.dispatch(node, EventKind::Change, false);
    settle(pacer, timing.value_settle_ms);

    doc.blur(node);
}

/// Write the encapsulated input first, then mirror the value onto the owning
/// component through whatever surface its strategy exposes.
pub fn write_encapsulated(
    doc: &mut Document,
    pacer: &dyn Pacer,
    timing: &TimingConfig,
    component: NodeId,
    input: NodeId,
    strategy: Option<&ComponentStrategy>,
    text: &str,
) {
    doc.focus(input);
    settle(pacer, timing.component_focus_ms);

    doc.set_value(input, text);
    doc.dispatch(input, EventKind::Input, true);
    doc.dispatch(input, EventKind::Change, true);
    settle(pacer, timing.value_settle_ms);

    if let Some(strategy) = strategy {
        if strategy.supports_value_property {
            doc.set_value(component, text);
        }
        if strategy.supports_set_value {
            doc.invoke(component, "setValue", text);
        }
        if strategy.supports_update_value {
            doc.invoke(component, "updateValue", text);
        }
        for kind in strategy.required_events.iter().filter(|k| **k != EventKind::Blur) {
            doc.dispatch(component, kind.clone(), true);
        }
    } else {
        doc.dispatch(component, EventKind::Input, true);
        doc.dispatch(component, EventKind::Change, true);
    }
    settle(pacer, timing.value_settle_ms);

    doc.blur(input);
    doc.dispatch(component, EventKind::Blur, true);
    debug!(?component, ?input, "encapsulated write");
}

/// Toggle a checkbox by activation when its state differs from `want`.
pub fn set_checkbox(doc: &mut Document, pacer: &dyn Pacer, timing: &TimingConfig, node: NodeId, want: bool) {
    if doc.checked(node) != want {
        doc.click(node);
        settle(pacer, timing.choice_ms);
    }
}

fn label_of(doc: &Document, node: NodeId) -> String {
    if let Some(aria) = doc.attr(node, "aria-label").filter(|a| !a.is_empty()) {
        return aria.to_string();
    }
    doc.attr(node, "id")
        .filter(|id| !id.is_empty())
        .and_then(|id| {
            doc.find_first(doc.root(), |l| l.tag == "label" && l.attr("for") == Some(id))
        })
        .or_else(|| doc.closest(node, |e| e.tag == "label"))
        .map(|l| doc.text_content(l).trim().to_string())
        .unwrap_or_default()
}

/// Select the radio of `node`'s group whose value, else label, matches.
pub fn select_radio(
    doc: &mut Document,
    pacer: &dyn Pacer,
    timing: &TimingConfig,
    field: &str,
    node: NodeId,
    wanted: &str,
) -> Result<(), FillError> {
    let name = doc.attr(node, "name").unwrap_or("").to_string();
    let group = if name.is_empty() {
        vec![node]
    } else {
        doc.find_all(doc.root(), |el| {
            el.tag == "input" && el.input_type() == "radio" && el.name() == name
        })
    };

    let by_value = group
        .iter()
        .copied()
        .find(|r| doc.attr(*r, "value").unwrap_or("on") == wanted);
    let choice = by_value.or_else(|| {
        group
            .iter()
            .copied()
            .find(|r| label_of(doc, *r).eq_ignore_ascii_case(wanted))
    });

    let Some(radio) = choice else {
        return Err(FillError::OptionNotFound {
            field: field.to_string(),
            value: wanted.to_string(),
        });
    };
    if !doc.checked(radio) {
        doc.click(radio);
    }
    settle(pacer, timing.choice_ms);
    Ok(())
}

/// Choose the option whose value, else label, matches.
pub fn select_option(
    doc: &mut Document,
    pacer: &dyn Pacer,
    timing: &TimingConfig,
    field: &str,
    select: NodeId,
    wanted: &str,
) -> Result<(), FillError> {
    let options = doc.options(select);
    let value = options
        .iter()
        .find(|(value, _)| value == wanted)
        .or_else(|| options.iter().find(|(_, label)| label.eq_ignore_ascii_case(wanted)))
        .map(|(value, _)| value.clone())
        .ok_or_else(|| FillError::OptionNotFound {
            field: field.to_string(),
            value: wanted.to_string(),
        })?;

    doc.focus(select);
    doc.set_value(select, &value);
    doc.dispatch(select, EventKind::Input, false);
    doc.dispatch(select, EventKind::Change, false);
    settle(pacer, timing.choice_ms);
    doc.blur(select);
    Ok(())
}

/// Commit an array entry: activate the add control, or press Enter on the
/// field when there is none. False when the add control refused activation.
pub fn commit_entry(
    doc: &mut Document,
    pacer: &dyn Pacer,
    timing: &TimingConfig,
    add_control: Option<NodeId>,
    field: NodeId,
) -> bool {
    match add_control {
        Some(button) => {
            if !doc.click(button) {
                return false;
            }
            settle(pacer, timing.add_commit_ms);
            true
        }
        None => {
            doc.dispatch(field, EventKind::KeyDown("Enter".to_string()), true);
            doc.dispatch(field, EventKind::KeyPress("Enter".to_string()), true);
            settle(pacer, timing.enter_commit_ms);
            true
        }
    }
}
