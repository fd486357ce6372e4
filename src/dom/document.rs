use crate::detect::error::DetectError;
use crate::dom::snapshot_model::{DocumentSnapshot, DomNode};

/// Deepest element nesting accepted from a snapshot.
pub const MAX_DEPTH: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Entry<'a> {
    node: &'a DomNode,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Read-only arena view over a snapshot.
///
/// Node ids follow document (pre-)order, so iterating ids in ascending order
/// walks the tree the same way `querySelectorAll` does.
#[derive(Debug)]
pub struct Document<'a> {
    url: &'a str,
    entries: Vec<Entry<'a>>,
}

impl<'a> Document<'a> {
    /// Index a snapshot. Fails when the tree is malformed; callers treat that
    /// as "this context could not be enumerated".
    pub fn build(snapshot: &'a DocumentSnapshot) -> Result<Self, DetectError> {
        let root = &snapshot.root;
        if root.is_text() {
            return Err(DetectError::MalformedNode {
                path: "root".into(),
                reason: "document root is a text node".into(),
            });
        }

        let mut entries: Vec<Entry<'a>> = Vec::new();
        // (node, parent, depth, path)
        let mut stack: Vec<(&'a DomNode, Option<NodeId>, usize, String)> =
            vec![(root, None, 0, root.tag.clone())];

        while let Some((node, parent, depth, path)) = stack.pop() {
            validate_node(node, &path)?;
            if depth > MAX_DEPTH {
                return Err(DetectError::DocumentTooDeep { limit: MAX_DEPTH });
            }

            let id = NodeId(entries.len());
            entries.push(Entry {
                node,
                parent,
                children: Vec::with_capacity(node.children.len()),
            });
            if let Some(p) = parent {
                entries[p.0].children.push(id);
            }

            // Reverse push keeps pre-order ids
            for (i, child) in node.children.iter().enumerate().rev() {
                let child_path = format!("{}>{}[{}]", path, child.tag, i);
                stack.push((child, Some(id), depth + 1, child_path));
            }
        }

        Ok(Self {
            url: &snapshot.url,
            entries,
        })
    }

    pub fn url(&self) -> &str {
        self.url
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &'a DomNode {
        self.entries[id.0].node
    }

    pub fn tag(&self, id: NodeId) -> &'a str {
        &self.entries[id.0].node.tag
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        !self.entries[id.0].node.is_text()
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&'a str> {
        self.entries[id.0].node.attr(name)
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.entries[id.0].node.has_attr(name)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entries[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.entries[id.0].children
    }

    /// All element ids in document order.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.entries.len())
            .map(NodeId)
            .filter(move |id| self.is_element(*id))
    }

    /// Proper ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_, 'a> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// `Element.closest()`: the node itself or its nearest matching ancestor.
    pub fn closest(&self, id: NodeId, pred: impl Fn(NodeId) -> bool) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|n| self.is_element(*n) && pred(*n))
    }

    /// Descendant elements of `id` in document order (excluding `id`).
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let end = self.subtree_end(id);
        (id.0 + 1..end)
            .map(NodeId)
            .filter(move |n| self.is_element(*n))
    }

    /// First descendant element matching `pred` (`Element.querySelector()`).
    pub fn find_descendant(&self, id: NodeId, pred: impl Fn(NodeId) -> bool) -> Option<NodeId> {
        self.descendants(id).find(|n| pred(*n))
    }

    /// First element in the whole document matching `pred`.
    pub fn find(&self, pred: impl Fn(NodeId) -> bool) -> Option<NodeId> {
        self.elements().find(|n| pred(*n))
    }

    /// Element siblings preceding `id`, nearest first.
    pub fn preceding_element_siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let siblings: &[NodeId] = match self.parent(id) {
            Some(p) => self.children(p),
            None => &[],
        };
        let pos = siblings.iter().position(|s| *s == id).unwrap_or(0);
        siblings[..pos]
            .iter()
            .rev()
            .copied()
            .filter(move |n| self.is_element(*n))
    }

    /// 1-based position among element siblings sharing the same tag.
    pub fn nth_of_type(&self, id: NodeId) -> usize {
        let tag = self.tag(id);
        self.preceding_element_siblings(id)
            .filter(|s| self.tag(*s) == tag)
            .count()
            + 1
    }

    /// 1-based position counted from the last sibling sharing the same tag.
    pub fn nth_last_of_type(&self, id: NodeId) -> usize {
        let tag = self.tag(id);
        match self.parent(id) {
            Some(p) => {
                let siblings = self.children(p);
                let pos = siblings.iter().position(|s| *s == id).unwrap_or(0);
                siblings[pos + 1..]
                    .iter()
                    .filter(|s| self.is_element(**s) && self.tag(**s) == tag)
                    .count()
                    + 1
            }
            None => 1,
        }
    }

    /// `textContent`: concatenation of every descendant text node.
    pub fn text_content(&self, id: NodeId) -> String {
        let node = self.node(id);
        if node.is_text() {
            return node.text.clone().unwrap_or_default();
        }
        let end = self.subtree_end(id);
        (id.0 + 1..end)
            .map(|i| self.entries[i].node)
            .filter(|n| n.is_text())
            .filter_map(|n| n.text.as_deref())
            .collect()
    }

    /// Text content with whitespace runs collapsed and ends trimmed.
    pub fn normalized_text(&self, id: NodeId) -> String {
        self.text_content(id)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    // Pre-order ids make every subtree a contiguous id range.
    fn subtree_end(&self, id: NodeId) -> usize {
        let mut cur = id;
        loop {
            match self.entries[cur.0].children.last() {
                Some(last) => cur = *last,
                None => return cur.0 + 1,
            }
        }
    }
}

pub struct Ancestors<'d, 'a> {
    doc: &'d Document<'a>,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_, '_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

fn validate_node(node: &DomNode, path: &str) -> Result<(), DetectError> {
    if node.tag.trim().is_empty() {
        return Err(DetectError::MalformedNode {
            path: path.to_string(),
            reason: "empty tag name".into(),
        });
    }
    if node.is_text() {
        if node.text.is_none() {
            return Err(DetectError::MalformedNode {
                path: path.to_string(),
                reason: "text node without text".into(),
            });
        }
        if !node.children.is_empty() {
            return Err(DetectError::MalformedNode {
                path: path.to_string(),
                reason: "text node with children".into(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DocumentSnapshot {
        let root = DomNode::element("html").with_child(
            DomNode::element("body")
                .with_child(
                    DomNode::element("label")
                        .with_text("First ")
                        .with_child(DomNode::element("b").with_text("Name")),
                )
                .with_child(DomNode::element("input").with_attr("id", "a"))
                .with_child(DomNode::element("input").with_attr("id", "b")),
        );
        DocumentSnapshot::new("https://example.com", root)
    }

    #[test]
    fn ids_follow_document_order() {
        let snap = sample();
        let doc = Document::build(&snap).unwrap();
        let tags: Vec<&str> = doc.elements().map(|id| doc.tag(id)).collect();
        assert_eq!(tags, vec!["html", "body", "label", "b", "input", "input"]);
    }

    #[test]
    fn text_content_spans_nested_text() {
        let snap = sample();
        let doc = Document::build(&snap).unwrap();
        let label = doc.find(|id| doc.tag(id) == "label").unwrap();
        assert_eq!(doc.text_content(label), "First Name");
    }

    #[test]
    fn nth_of_type_counts_same_tag_siblings() {
        let snap = sample();
        let doc = Document::build(&snap).unwrap();
        let b = doc.find(|id| doc.attr(id, "id") == Some("b")).unwrap();
        assert_eq!(doc.nth_of_type(b), 2);
        assert_eq!(doc.nth_last_of_type(b), 1);
    }

    #[test]
    fn empty_tag_is_rejected() {
        let root = DomNode::element("html").with_child(DomNode::element(""));
        let snap = DocumentSnapshot::new("u", root);
        assert!(matches!(
            Document::build(&snap),
            Err(DetectError::MalformedNode { .. })
        ));
    }
}
