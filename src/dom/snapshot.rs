use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    dom::{
        document::Document,
        node::{ClickAction, ComponentSurface, NodeId, Rect},
    },
    error::AutofillError,
};

/// Serialized document: page URL plus the top-level nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub url: String,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

/// Text nodes are bare strings, elements are objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Text(String),
    Element(ElementSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<Rect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub checked: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
    /// Encapsulated subtree contents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Vec<NodeSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentSurface>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_click: Option<ClickAction>,
}

impl Document {
    pub fn from_snapshot(snapshot: &DocumentSnapshot) -> Result<Document, AutofillError> {
        let mut doc = Document::new(&snapshot.url);
        let root = doc.root();
        for spec in &snapshot.nodes {
            build_node(&mut doc, root, spec)?;
        }
        Ok(doc)
    }

    pub fn to_snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            url: self.url().to_string(),
            nodes: self
                .children(self.root())
                .iter()
                .filter_map(|c| self.node_spec(*c))
                .collect(),
        }
    }

    fn node_spec(&self, id: NodeId) -> Option<NodeSpec> {
        let Some(el) = self.element(id) else {
            return self.text_of(id).map(NodeSpec::Text);
        };

        let shadow = el.shadow_root.map(|s| {
            self.children(s)
                .iter()
                .filter_map(|c| self.node_spec(*c))
                .collect()
        });

        Some(NodeSpec::Element(ElementSpec {
            tag: el.tag.clone(),
            attrs: el.attrs.iter().cloned().collect(),
            rect: (el.rect != Rect::default()).then_some(el.rect),
            value: (el.is_native_field() && !el.value.is_empty()).then(|| el.value.clone()),
            checked: el.checked,
            children: self
                .children(id)
                .iter()
                .filter_map(|c| self.node_spec(*c))
                .collect(),
            shadow,
            component: el.component.clone(),
            on_click: el.on_click.clone(),
        }))
    }

    fn text_of(&self, id: NodeId) -> Option<String> {
        match self.children(id) {
            [] if self.element(id).is_none() => {
                let text = self.text_content(id);
                (!text.is_empty()).then_some(text)
            }
            _ => None,
        }
    }
}

fn build_node(doc: &mut Document, parent: NodeId, spec: &NodeSpec) -> Result<(), AutofillError> {
    match spec {
        NodeSpec::Text(text) => {
            doc.append_text(parent, text);
        }
        NodeSpec::Element(spec) => {
            if spec.tag.trim().is_empty() {
                return Err(AutofillError::Snapshot("element with empty tag".into()));
            }
            let id = doc.create_element(spec.tag.trim());
            for (name, value) in &spec.attrs {
                doc.set_attr(id, name, value);
            }
            if let Some(el) = doc.element_mut(id) {
                if let Some(value) = &spec.value {
                    el.value = value.clone();
                }
                el.checked = el.checked || spec.checked;
                el.rect = spec.rect.unwrap_or_default();
                el.component = spec.component.clone();
                el.on_click = spec.on_click.clone();
            }
            doc.append_child(parent, id);

            for child in &spec.children {
                build_node(doc, id, child)?;
            }
            if let Some(shadow) = &spec.shadow {
                let root = doc.attach_shadow(id);
                for child in shadow {
                    build_node(doc, root, child)?;
                }
            }
        }
    }
    Ok(())
}

/// Read a JSON snapshot file into a live document.
pub fn load_document(path: &Path) -> Result<Document, AutofillError> {
    let content = std::fs::read_to_string(path).map_err(|e| AutofillError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let snapshot: DocumentSnapshot =
        serde_json::from_str(&content).map_err(|e| AutofillError::JsonParse {
            context: format!("document snapshot {}", path.display()),
            source: e,
        })?;
    Document::from_snapshot(&snapshot)
}

/// Write the document back out as a JSON snapshot.
pub fn write_document(doc: &Document, path: &Path) -> Result<(), AutofillError> {
    let json =
        serde_json::to_string_pretty(&doc.to_snapshot()).map_err(|e| AutofillError::JsonSerialize {
            context: "document snapshot".into(),
            source: e,
        })?;
    std::fs::write(path, json).map_err(|e| AutofillError::Io {
        path: path.display().to_string(),
        source: e,
    })
}
