use std::collections::HashSet;

use tracing::debug;

use crate::dom::document::{Document, NodeId};
use crate::dom::selector::css_escape;

/// Input kinds that carry no user data and are never classified.
const EXCLUDED_INPUT_TYPES: &[&str] = &["hidden", "submit", "button", "image", "checkbox", "radio"];

const FORM_CONTROL_TAGS: &[&str] = &["input", "textarea", "select"];

/// One interactive control considered during a single pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCandidate {
    pub node: NodeId,
    /// Position among all shape-eligible elements, before exclusions.
    pub index: usize,
    pub tag: String,
    pub name: String,
    pub id: String,
    pub input_type: String,
    pub autocomplete: String,
    pub placeholder: String,
    pub aria_label: String,
    pub current_value: String,
    pub is_required: bool,
    pub is_visible: bool,
    pub selector: String,
    pub stable_id: String,
    pub label: String,
}

/// Output of the enumeration step.
#[derive(Debug, Clone)]
pub struct Enumeration {
    pub candidates: Vec<FieldCandidate>,
    pub total_elements_scanned: usize,
}

/// Discover eligible controls in document order, dropping disabled and inert
/// ones and any later element whose canonical selector was already taken.
pub fn enumerate_candidates(doc: &Document) -> Enumeration {
    let eligible: Vec<NodeId> = doc.elements().filter(|id| is_shape_eligible(doc, *id)).collect();
    let total_elements_scanned = eligible.len();

    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates = Vec::new();

    for (index, node) in eligible.into_iter().enumerate() {
        if is_disabled(doc, node) {
            debug!(index, "skipping disabled control");
            continue;
        }
        if is_inert(doc, node) {
            debug!(index, "skipping control inside template/inert container");
            continue;
        }

        let selector = canonical_selector(doc, node);
        if !seen.insert(selector.clone()) {
            debug!(index, selector = %selector, "dropping duplicate selector");
            continue;
        }

        candidates.push(build_candidate(doc, node, index, selector));
    }

    Enumeration {
        candidates,
        total_elements_scanned,
    }
}

fn build_candidate(doc: &Document, node: NodeId, index: usize, selector: String) -> FieldCandidate {
    let attr = |name: &str| doc.attr(node, name).unwrap_or("").to_string();

    let tag = doc.tag(node).to_string();
    let name = attr("name");
    let id = attr("id");
    let input_type = doc
        .attr(node, "type")
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| tag.clone());
    let label = label_text(doc, node);
    let stable_id = stable_id(index, &name, &id, &label);

    FieldCandidate {
        node,
        index,
        name,
        id,
        input_type,
        autocomplete: attr("autocomplete"),
        placeholder: attr("placeholder"),
        aria_label: attr("aria-label"),
        current_value: current_value(doc, node),
        is_required: doc.has_attr(node, "required")
            || doc.attr(node, "aria-required") == Some("true"),
        is_visible: is_visible(doc, node),
        selector,
        stable_id,
        label,
        tag,
    }
}

// ============================================================================
// Eligibility
// ============================================================================

/// Text-like inputs, file inputs, textareas, selects and editable regions.
pub fn is_shape_eligible(doc: &Document, id: NodeId) -> bool {
    match doc.tag(id) {
        "input" => {
            let kind = doc.attr(id, "type").unwrap_or("text").to_ascii_lowercase();
            !EXCLUDED_INPUT_TYPES.contains(&kind.as_str())
        }
        "textarea" | "select" => true,
        _ => doc
            .attr(id, "contenteditable")
            .is_some_and(|v| v.eq_ignore_ascii_case("true")),
    }
}

pub fn is_disabled(doc: &Document, id: NodeId) -> bool {
    FORM_CONTROL_TAGS.contains(&doc.tag(id)) && doc.has_attr(id, "disabled")
}

/// Inside a `<template>` or an `inert` subtree.
pub fn is_inert(doc: &Document, id: NodeId) -> bool {
    doc.closest(id, |n| doc.tag(n) == "template" || doc.has_attr(n, "inert"))
        .is_some()
}

/// Annotation only; hidden controls are still classified.
pub fn is_visible(doc: &Document, id: NodeId) -> bool {
    if doc.closest(id, |n| doc.has_attr(n, "hidden") || doc.tag(n) == "template").is_some() {
        return false;
    }
    match &doc.node(id).layout {
        Some(layout) => {
            let display_none = layout.display.as_deref() == Some("none");
            let hidden = matches!(layout.visibility.as_deref(), Some("hidden" | "collapse"));
            let zero_size = layout.width == 0.0 && layout.height == 0.0;
            !(display_none || hidden || zero_size)
        }
        None => true,
    }
}

fn current_value(doc: &Document, id: NodeId) -> String {
    if let Some(value) = &doc.node(id).value {
        return value.clone();
    }
    match doc.tag(id) {
        "input" => doc.attr(id, "value").unwrap_or("").to_string(),
        "textarea" => doc.text_content(id),
        _ => String::new(),
    }
}

// ============================================================================
// Identity
// ============================================================================

/// Selector preference: id, name, Workday automation id, Ashby data-ui,
/// then tag + position among same-tag siblings.
pub fn canonical_selector(doc: &Document, id: NodeId) -> String {
    let non_empty = |name: &str| doc.attr(id, name).filter(|v| !v.is_empty());

    if let Some(element_id) = non_empty("id") {
        return format!("#{}", css_escape(element_id));
    }
    for attr in ["name", "data-automation-id", "data-ui"] {
        if let Some(value) = non_empty(attr) {
            return format!("[{}=\"{}\"]", attr, css_escape(value));
        }
    }

    let tag = doc.tag(id);
    match doc.parent(id) {
        Some(_) => format!("{}:nth-of-type({})", tag, doc.nth_of_type(id)),
        None => tag.to_string(),
    }
}

/// `af-{index}-{name | id | label fragment}`.
pub fn stable_id(index: usize, name: &str, id: &str, label: &str) -> String {
    let fragment = if !name.is_empty() {
        name.to_string()
    } else if !id.is_empty() {
        id.to_string()
    } else {
        let mut fragment = String::new();
        let mut in_space = false;
        for c in label.chars().take(20) {
            if c.is_whitespace() {
                if !in_space {
                    fragment.push('_');
                }
                in_space = true;
            } else {
                fragment.extend(c.to_lowercase());
                in_space = false;
            }
        }
        fragment
    };
    format!("af-{}-{}", index, fragment)
}

// ============================================================================
// Labels
// ============================================================================

/// First `<label for=…>` in the document pointing at this element.
pub fn for_label(doc: &Document, id: NodeId) -> Option<NodeId> {
    let element_id = doc.attr(id, "id").filter(|v| !v.is_empty())?;
    doc.find(|n| doc.tag(n) == "label" && doc.attr(n, "for") == Some(element_id))
}

/// Nearest enclosing `<label>`.
pub fn ancestor_label(doc: &Document, id: NodeId) -> Option<NodeId> {
    doc.closest(id, |n| doc.tag(n) == "label")
}

/// First `<label>` inside the nearest container carrying `container_attr`.
pub fn container_label(doc: &Document, id: NodeId, container_attr: &str) -> Option<NodeId> {
    let container = doc.closest(id, |n| doc.has_attr(n, container_attr))?;
    doc.find_descendant(container, |n| doc.tag(n) == "label")
}

/// Human-readable label with the usual fallback chain, ending in the
/// de-punctuated name attribute or `Unknown field`.
pub fn label_text(doc: &Document, id: NodeId) -> String {
    let sources = [
        for_label(doc, id),
        ancestor_label(doc, id),
        container_label(doc, id, "data-ui"),
        container_label(doc, id, "data-automation-id"),
    ];
    for label in sources.into_iter().flatten() {
        let text = doc.normalized_text(label);
        if !text.is_empty() {
            return text;
        }
    }

    for attr in ["aria-label", "placeholder"] {
        if let Some(text) = doc.attr(id, attr).map(str::trim).filter(|t| !t.is_empty()) {
            return text.to_string();
        }
    }

    if let Some(name) = doc.attr(id, "name").filter(|n| !n.is_empty()) {
        let spaced: String = name
            .chars()
            .map(|c| if matches!(c, '-' | '_' | '[' | ']') { ' ' } else { c })
            .collect();
        return spaced.trim().to_string();
    }

    "Unknown field".to_string()
}
