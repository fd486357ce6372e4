use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::detect::error::DetectError;
use crate::dom::document::MAX_DEPTH;

/// Tag used for text nodes in a snapshot.
pub const TEXT_TAG: &str = "#text";

/// One execution context (page or frame) serialized by the page extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub url: String,
    #[serde(default)]
    pub title: String,
    pub root: DomNode,
}

/// A node of the snapshot tree.
///
/// Elements carry a lowercase `tag` and their attributes; text nodes use
/// the `#text` tag and carry `text`. `value` is the live control value, which
/// can differ from the `value` attribute once the user has typed.
///
/// Attributes are keyed by name and iterate alphabetically, not in source
/// order; anything that joins them (the class/data-attr audit text) is
/// ordered the same way on every run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomNode {
    pub tag: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DomNode>,
}

/// Computed layout facts captured by the extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

impl DomNode {
    pub fn element(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn text_node(text: &str) -> Self {
        Self {
            tag: TEXT_TAG.to_string(),
            text: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_child(mut self, child: DomNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = DomNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        self.with_child(DomNode::text_node(text))
    }

    pub fn is_text(&self) -> bool {
        self.tag == TEXT_TAG
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}

impl DocumentSnapshot {
    pub fn new(url: &str, root: DomNode) -> Self {
        Self {
            url: url.to_string(),
            title: String::new(),
            root,
        }
    }

    /// Parse a snapshot as emitted by the page extractor.
    ///
    /// Every element level costs two JSON levels (the node and its
    /// `children` array), so serde_json's default recursion limit would cut
    /// real pages off long before `MAX_DEPTH`. The limit is lifted and the
    /// parser runs on a growable stack; nesting beyond what `Document::build`
    /// accepts is rejected before parsing.
    pub fn from_json(json: &str) -> Result<Self, DetectError> {
        if json_nesting(json) > MAX_JSON_NESTING {
            return Err(DetectError::DocumentTooDeep { limit: MAX_DEPTH });
        }

        let mut de = serde_json::Deserializer::from_str(json);
        de.disable_recursion_limit();
        let parsed = Self::deserialize(serde_stacker::Deserializer::new(&mut de));
        parsed
            .and_then(|snapshot| de.end().map(|()| snapshot))
            .map_err(|source| DetectError::SnapshotParse {
                context: "document snapshot".into(),
                source,
            })
    }
}

/// An element at depth `d` sits at JSON level `2 + 2d` (snapshot object,
/// then a node plus its `children` array per level); its `attributes` or
/// `layout` object adds one more.
const MAX_JSON_NESTING: usize = 2 * MAX_DEPTH + 3;

/// Deepest bracket nesting in `json`, ignoring brackets inside strings.
fn json_nesting(json: &str) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for byte in json.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}
