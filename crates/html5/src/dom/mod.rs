//! Arena-backed DOM node graph.
//!
//! The document owns every node; `NodeId` is an index into the arena. Links
//! form a tree with upward references (parent) and a doubly-linked sibling
//! list whose endpoints coincide with the parent's first/last child.
//!
//! Invariants (enforced by the single insertion primitive, checked in debug
//! builds):
//! - a node has a parent iff it is linked into that parent's child list;
//! - orphan nodes have no sibling links;
//! - `first_child`/`last_child` are the endpoints of the sibling list.

pub mod serialize;

use std::sync::Arc;

/// Index of a node in its document's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Element namespace. Only the three namespaces the parser can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Namespace {
    Html,
    MathMl,
    Svg,
}

/// Namespace of a namespaced attribute (foreign-content adjustments).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrNamespace {
    Xlink,
    Xml,
    Xmlns,
}

impl AttrNamespace {
    pub fn url(self) -> &'static str {
        match self {
            AttrNamespace::Xlink => "http://www.w3.org/1999/xlink",
            AttrNamespace::Xml => "http://www.w3.org/XML/1998/namespace",
            AttrNamespace::Xmlns => "http://www.w3.org/2000/xmlns/",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attr {
    pub ns: Option<AttrNamespace>,
    pub name: String,
    pub value: String,
}

/// How the document compares against the quirks-era doctype tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QuirksMode {
    #[default]
    NoQuirks,
    LimitedQuirks,
    Quirks,
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    /// The arena root. Exactly one per document, never a child.
    Document,
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    Element {
        name: Arc<str>,
        ns: Namespace,
        attrs: Vec<Attr>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

#[derive(Clone, Debug)]
struct NodeData {
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    kind: NodeKind,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            kind,
        }
    }
}

/// Where to insert a node: at the end of `parent`'s child list, or
/// immediately before `before` (which must be a child of `parent`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InsertionPoint {
    pub parent: NodeId,
    pub before: Option<NodeId>,
}

impl InsertionPoint {
    pub fn append_to(parent: NodeId) -> Self {
        Self {
            parent,
            before: None,
        }
    }
}

#[derive(Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
    quirks: QuirksMode,
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData::new(NodeKind::Document)],
            quirks: QuirksMode::NoQuirks,
        }
    }

    /// The document node. Always `NodeId(0)`.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn quirks_mode(&self) -> QuirksMode {
        self.quirks
    }

    pub fn set_quirks_mode(&mut self, quirks: QuirksMode) {
        self.quirks = quirks;
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let idx: u32 = self
            .nodes
            .len()
            .try_into()
            .expect("node id space exhausted");
        self.nodes.push(NodeData::new(kind));
        NodeId(idx)
    }

    // ----- node creation (orphans) -----

    pub fn create_element(&mut self, name: Arc<str>, ns: Namespace, attrs: Vec<Attr>) -> NodeId {
        self.alloc(NodeKind::Element { name, ns, attrs })
    }

    pub fn create_text(&mut self, text: String) -> NodeId {
        self.alloc(NodeKind::Text { text })
    }

    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(NodeKind::Comment { text })
    }

    pub fn create_doctype(&mut self, name: String, public_id: String, system_id: String) -> NodeId {
        self.alloc(NodeKind::Doctype {
            name,
            public_id,
            system_id,
        })
    }

    /// Clone a node without its children or links.
    pub fn clone_shallow(&mut self, id: NodeId) -> NodeId {
        let kind = self.data(id).kind.clone();
        self.alloc(kind)
    }

    // ----- traversal -----

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.data(id).kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).first_child
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).last_child
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).prev_sibling
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).next_sibling
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.first_child(id),
        }
    }

    /// All nodes below `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: self
                .children(id)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect(),
        }
    }

    pub fn element_name(&self, id: NodeId) -> Option<&str> {
        match &self.data(id).kind {
            NodeKind::Element { name, .. } => Some(name.as_ref()),
            _ => None,
        }
    }

    pub fn element_namespace(&self, id: NodeId) -> Option<Namespace> {
        match &self.data(id).kind {
            NodeKind::Element { ns, .. } => Some(*ns),
            _ => None,
        }
    }

    pub fn attrs(&self, id: NodeId) -> &[Attr] {
        match &self.data(id).kind {
            NodeKind::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, preserving insertion order for new names.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let NodeKind::Element { attrs, .. } = &mut self.data_mut(id).kind else {
            panic!("set_attr on a non-element node");
        };
        if let Some(attr) = attrs.iter_mut().find(|a| a.name == name) {
            attr.value = value.to_string();
        } else {
            attrs.push(Attr {
                ns: None,
                name: name.to_string(),
                value: value.to_string(),
            });
        }
    }

    /// Add attributes the element does not already carry (html/body merging).
    pub fn add_missing_attrs(&mut self, id: NodeId, extra: Vec<Attr>) {
        let NodeKind::Element { attrs, .. } = &mut self.data_mut(id).kind else {
            panic!("add_missing_attrs on a non-element node");
        };
        for attr in extra {
            if !attrs.iter().any(|a| a.name == attr.name) {
                attrs.push(attr);
            }
        }
    }

    /// Concatenation of descendant text nodes in document order.
    pub fn inner_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let NodeKind::Text { text } = &self.data(node).kind {
                out.push_str(text);
            }
        }
        out
    }

    // ----- mutation -----

    /// The single insertion primitive. Foster parenting, the adoption agency,
    /// and plain appends all funnel through here so the sibling invariants
    /// have one owner.
    pub fn insert(&mut self, node: NodeId, at: InsertionPoint) {
        debug_assert!(
            !matches!(self.data(node).kind, NodeKind::Document),
            "the document node cannot be inserted"
        );
        debug_assert!(
            self.data(node).parent.is_none()
                && self.data(node).prev_sibling.is_none()
                && self.data(node).next_sibling.is_none(),
            "insert requires an orphan node; detach first"
        );
        debug_assert_ne!(node, at.parent, "a node cannot be its own parent");

        match at.before {
            None => {
                let prev = self.data(at.parent).last_child;
                self.data_mut(node).parent = Some(at.parent);
                self.data_mut(node).prev_sibling = prev;
                if let Some(prev) = prev {
                    self.data_mut(prev).next_sibling = Some(node);
                } else {
                    self.data_mut(at.parent).first_child = Some(node);
                }
                self.data_mut(at.parent).last_child = Some(node);
            }
            Some(before) => {
                debug_assert_eq!(
                    self.data(before).parent,
                    Some(at.parent),
                    "insertion reference must be a child of the target parent"
                );
                let prev = self.data(before).prev_sibling;
                self.data_mut(node).parent = Some(at.parent);
                self.data_mut(node).prev_sibling = prev;
                self.data_mut(node).next_sibling = Some(before);
                self.data_mut(before).prev_sibling = Some(node);
                if let Some(prev) = prev {
                    self.data_mut(prev).next_sibling = Some(node);
                } else {
                    self.data_mut(at.parent).first_child = Some(node);
                }
            }
        }
    }

    pub fn append(&mut self, parent: NodeId, node: NodeId) {
        self.insert(node, InsertionPoint::append_to(parent));
    }

    pub fn insert_before(&mut self, parent: NodeId, before: NodeId, node: NodeId) {
        self.insert(
            node,
            InsertionPoint {
                parent,
                before: Some(before),
            },
        );
    }

    /// Unlink a node from its parent. No-op for orphans.
    pub fn detach(&mut self, node: NodeId) {
        let (parent, prev, next) = {
            let data = self.data(node);
            (data.parent, data.prev_sibling, data.next_sibling)
        };
        let Some(parent) = parent else {
            debug_assert!(
                prev.is_none() && next.is_none(),
                "orphan nodes must not carry sibling links"
            );
            return;
        };
        match prev {
            Some(prev) => self.data_mut(prev).next_sibling = next,
            None => self.data_mut(parent).first_child = next,
        }
        match next {
            Some(next) => self.data_mut(next).prev_sibling = prev,
            None => self.data_mut(parent).last_child = prev,
        }
        let data = self.data_mut(node);
        data.parent = None;
        data.prev_sibling = None;
        data.next_sibling = None;
    }

    /// Remove a node from the tree (alias for `detach`; the arena keeps the
    /// allocation, consistent with parser-owned lifetimes).
    pub fn remove(&mut self, node: NodeId) {
        self.detach(node);
    }

    /// Move every child of `from` to the end of `to`, preserving order.
    pub fn reparent_children(&mut self, from: NodeId, to: NodeId) {
        while let Some(child) = self.first_child(from) {
            self.detach(child);
            self.append(to, child);
        }
    }

    /// Insert character data at a point, coalescing with an adjacent text
    /// node when one precedes the insertion position.
    pub fn insert_text(&mut self, at: InsertionPoint, text: &str) {
        if text.is_empty() {
            return;
        }
        let adjacent = match at.before {
            Some(before) => self.data(before).prev_sibling,
            None => self.data(at.parent).last_child,
        };
        if let Some(prev) = adjacent
            && let NodeKind::Text { text: existing } = &mut self.data_mut(prev).kind
        {
            existing.push_str(text);
            return;
        }
        let node = self.create_text(text.to_string());
        self.insert(node, at);
    }

    /// Walk the subtree under `id` and panic on any link-invariant violation.
    /// Test support; cost is linear in subtree size.
    pub fn assert_subtree_consistent(&self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            let mut seen = Vec::new();
            let mut child = self.first_child(node);
            let mut prev: Option<NodeId> = None;
            while let Some(c) = child {
                assert_eq!(
                    self.parent(c),
                    Some(node),
                    "child {c:?} does not point back at parent {node:?}"
                );
                assert_eq!(
                    self.prev_sibling(c),
                    prev,
                    "sibling back-link mismatch at {c:?}"
                );
                seen.push(c);
                prev = Some(c);
                child = self.next_sibling(c);
            }
            assert_eq!(
                self.last_child(node),
                prev,
                "last_child does not terminate the sibling list of {node:?}"
            );
            stack.extend(seen);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.doc.next_sibling(id);
        Some(id)
    }
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let children: Vec<NodeId> = self.doc.children(id).collect();
        self.stack.extend(children.into_iter().rev());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(doc: &mut Document, name: &str) -> NodeId {
        doc.create_element(Arc::from(name), Namespace::Html, Vec::new())
    }

    #[test]
    fn append_builds_a_consistent_sibling_list() {
        let mut doc = Document::new();
        let parent = element(&mut doc, "div");
        doc.append(doc.root(), parent);
        let a = element(&mut doc, "a");
        let b = element(&mut doc, "b");
        let c = element(&mut doc, "c");
        doc.append(parent, a);
        doc.append(parent, b);
        doc.append(parent, c);

        assert_eq!(doc.children(parent).collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(doc.first_child(parent), Some(a));
        assert_eq!(doc.last_child(parent), Some(c));
        assert_eq!(doc.prev_sibling(b), Some(a));
        assert_eq!(doc.next_sibling(b), Some(c));
        doc.assert_subtree_consistent(doc.root());
    }

    #[test]
    fn insert_before_links_both_directions() {
        let mut doc = Document::new();
        let parent = element(&mut doc, "div");
        doc.append(doc.root(), parent);
        let a = element(&mut doc, "a");
        let c = element(&mut doc, "c");
        doc.append(parent, a);
        doc.append(parent, c);
        let b = element(&mut doc, "b");
        doc.insert_before(parent, c, b);

        assert_eq!(doc.children(parent).collect::<Vec<_>>(), vec![a, b, c]);
        doc.assert_subtree_consistent(doc.root());

        let first = element(&mut doc, "first");
        doc.insert_before(parent, a, first);
        assert_eq!(doc.first_child(parent), Some(first));
        doc.assert_subtree_consistent(doc.root());
    }

    #[test]
    fn detach_clears_links_and_heals_the_list() {
        let mut doc = Document::new();
        let parent = element(&mut doc, "div");
        doc.append(doc.root(), parent);
        let a = element(&mut doc, "a");
        let b = element(&mut doc, "b");
        let c = element(&mut doc, "c");
        doc.append(parent, a);
        doc.append(parent, b);
        doc.append(parent, c);

        doc.detach(b);
        assert_eq!(doc.children(parent).collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(doc.parent(b), None);
        assert_eq!(doc.prev_sibling(b), None);
        assert_eq!(doc.next_sibling(b), None);
        doc.assert_subtree_consistent(doc.root());

        // Re-insertion after detach is the re-parent path.
        doc.append(parent, b);
        assert_eq!(doc.children(parent).collect::<Vec<_>>(), vec![a, c, b]);
    }

    #[test]
    fn insert_text_coalesces_with_preceding_text_node() {
        let mut doc = Document::new();
        let parent = element(&mut doc, "p");
        doc.append(doc.root(), parent);
        doc.insert_text(InsertionPoint::append_to(parent), "hello ");
        doc.insert_text(InsertionPoint::append_to(parent), "world");
        let children: Vec<_> = doc.children(parent).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(doc.inner_text(parent), "hello world");

        let br = element(&mut doc, "br");
        doc.append(parent, br);
        doc.insert_text(InsertionPoint::append_to(parent), "!");
        assert_eq!(doc.children(parent).count(), 3);
    }

    #[test]
    fn insert_text_before_reference_coalesces_with_prev_sibling() {
        let mut doc = Document::new();
        let parent = element(&mut doc, "p");
        doc.append(doc.root(), parent);
        doc.insert_text(InsertionPoint::append_to(parent), "a");
        let table = element(&mut doc, "table");
        doc.append(parent, table);
        doc.insert_text(
            InsertionPoint {
                parent,
                before: Some(table),
            },
            "b",
        );
        assert_eq!(doc.children(parent).count(), 2);
        assert_eq!(doc.inner_text(parent), "ab");
    }

    #[test]
    fn reparent_children_preserves_order() {
        let mut doc = Document::new();
        let from = element(&mut doc, "b");
        let to = element(&mut doc, "i");
        doc.append(doc.root(), from);
        doc.append(doc.root(), to);
        let x = element(&mut doc, "x");
        let y = element(&mut doc, "y");
        doc.append(from, x);
        doc.append(from, y);

        doc.reparent_children(from, to);
        assert_eq!(doc.children(from).count(), 0);
        assert_eq!(doc.children(to).collect::<Vec<_>>(), vec![x, y]);
        doc.assert_subtree_consistent(doc.root());
    }

    #[test]
    fn inner_text_concatenates_descendant_text_in_order() {
        let mut doc = Document::new();
        let p = element(&mut doc, "p");
        doc.append(doc.root(), p);
        doc.insert_text(InsertionPoint::append_to(p), "1");
        let b = element(&mut doc, "b");
        doc.append(p, b);
        doc.insert_text(InsertionPoint::append_to(b), "2");
        doc.insert_text(InsertionPoint::append_to(p), "3");
        assert_eq!(doc.inner_text(p), "123");
    }

    #[test]
    fn set_attr_preserves_insertion_order() {
        let mut doc = Document::new();
        let el = element(&mut doc, "input");
        doc.set_attr(el, "type", "text");
        doc.set_attr(el, "value", "v");
        doc.set_attr(el, "type", "button");
        let names: Vec<_> = doc.attrs(el).iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["type", "value"]);
        assert_eq!(doc.attr(el, "type"), Some("button"));
    }

    #[test]
    fn clone_shallow_copies_kind_without_links() {
        let mut doc = Document::new();
        let el = doc.create_element(
            Arc::from("a"),
            Namespace::Html,
            vec![Attr {
                ns: None,
                name: "href".into(),
                value: "x".into(),
            }],
        );
        doc.append(doc.root(), el);
        let copy = doc.clone_shallow(el);
        assert_eq!(doc.element_name(copy), Some("a"));
        assert_eq!(doc.attr(copy, "href"), Some("x"));
        assert_eq!(doc.parent(copy), None);
        assert_eq!(doc.first_child(copy), None);
    }
}
