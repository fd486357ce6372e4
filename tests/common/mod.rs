#![allow(dead_code)]

use std::path::PathBuf;

use field_detection::dom::snapshot_model::{DocumentSnapshot, DomNode, Layout};
use field_detection::registry::registry_model::{EntryStatus, RegistryEntry};
use field_detection::field::field_types::FieldType;

pub const FORM_URL: &str = "https://example.com/careers/apply";

/// `<input>` with the given attributes.
pub fn input(attrs: &[(&str, &str)]) -> DomNode {
    element("input", attrs)
}

pub fn element(tag: &str, attrs: &[(&str, &str)]) -> DomNode {
    attrs
        .iter()
        .fold(DomNode::element(tag), |node, (k, v)| node.with_attr(k, v))
}

/// `<label for=…>text</label>`
pub fn label_for(target: &str, text: &str) -> DomNode {
    element("label", &[("for", target)]).with_text(text)
}

/// `<html><body><form>…</form></body></html>`
pub fn form_page(children: Vec<DomNode>) -> DocumentSnapshot {
    page_at(FORM_URL, children)
}

pub fn page_at(url: &str, children: Vec<DomNode>) -> DocumentSnapshot {
    let form = DomNode::element("form").with_children(children);
    let body = DomNode::element("body").with_child(form);
    DocumentSnapshot::new(url, DomNode::element("html").with_child(body))
}

pub fn hidden_layout() -> Layout {
    Layout {
        display: Some("none".into()),
        visibility: None,
        width: 0.0,
        height: 0.0,
    }
}

pub fn entry(id: &str, board: &str, field_type: FieldType, selectors: &[&str]) -> RegistryEntry {
    RegistryEntry {
        id: id.into(),
        board: board.into(),
        field_type,
        selectors: selectors.iter().map(|s| s.to_string()).collect(),
        priority: 1,
        status: EntryStatus::Active,
        added: "2026-02-12".into(),
        notes: None,
    }
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture(name: &str) -> DocumentSnapshot {
    let content = std::fs::read_to_string(fixture_path(name)).unwrap();
    DocumentSnapshot::from_json(&content).unwrap()
}
