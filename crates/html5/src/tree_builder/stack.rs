//! Stack of open elements and the scope predicates.

use crate::dom::{Namespace, NodeId};
use crate::shared::AtomId;

/// Entry in the stack of open elements.
///
/// Identity is the arena node id; the interned (adjusted) name and namespace
/// ride along so scope checks never touch the DOM.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct OpenEntry {
    pub(crate) node: NodeId,
    pub(crate) name: AtomId,
    pub(crate) ns: Namespace,
}

/// Scope families over the stack of open elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScopeKind {
    /// The baseline "has an element in scope".
    Default,
    ListItem,
    Button,
    Table,
    Select,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct OpenElementsStack {
    items: Vec<OpenEntry>,
    max_depth: u32,
}

impl OpenElementsStack {
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn items(&self) -> &[OpenEntry] {
        &self.items
    }

    pub(crate) fn get(&self, index: usize) -> OpenEntry {
        self.items[index]
    }

    pub(crate) fn push(&mut self, entry: OpenEntry) {
        self.items.push(entry);
        self.max_depth = self.max_depth.max(self.items.len() as u32);
    }

    pub(crate) fn pop(&mut self) -> Option<OpenEntry> {
        self.items.pop()
    }

    pub(crate) fn current(&self) -> Option<OpenEntry> {
        self.items.last().copied()
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    /// Keep indices `0..index` (pops the entry at `index` and above).
    pub(crate) fn truncate(&mut self, index: usize) {
        self.items.truncate(index);
    }

    pub(crate) fn remove_index(&mut self, index: usize) -> OpenEntry {
        self.items.remove(index)
    }

    pub(crate) fn insert_at(&mut self, index: usize, entry: OpenEntry) {
        self.items.insert(index, entry);
        self.max_depth = self.max_depth.max(self.items.len() as u32);
    }

    pub(crate) fn replace_at(&mut self, index: usize, entry: OpenEntry) {
        self.items[index] = entry;
    }

    pub(crate) fn index_of_node(&self, node: NodeId) -> Option<usize> {
        self.items.iter().rposition(|entry| entry.node == node)
    }

    pub(crate) fn contains_node(&self, node: NodeId) -> bool {
        self.index_of_node(node).is_some()
    }

    pub(crate) fn remove_node(&mut self, node: NodeId) {
        if let Some(index) = self.index_of_node(node) {
            self.items.remove(index);
        }
    }

    /// Highest stack index whose entry satisfies the predicate.
    pub(crate) fn last_index_where<F>(&self, mut pred: F) -> Option<usize>
    where
        F: FnMut(&OpenEntry) -> bool,
    {
        self.items.iter().rposition(|entry| pred(entry))
    }

    pub(crate) fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// "Have an element with this tag name in the given scope" (HTML
    /// namespace targets only).
    pub(crate) fn has_in_scope(&self, target: AtomId, kind: ScopeKind) -> bool {
        self.find_in_scope(kind, |entry| {
            entry.ns == Namespace::Html && entry.name == target
        })
        .is_some()
    }

    pub(crate) fn has_any_in_scope(&self, targets: &[AtomId], kind: ScopeKind) -> bool {
        self.find_in_scope(kind, |entry| {
            entry.ns == Namespace::Html && targets.contains(&entry.name)
        })
        .is_some()
    }

    /// Element-identity scope check (the adoption agency's step 10).
    pub(crate) fn has_node_in_scope(&self, node: NodeId, kind: ScopeKind) -> bool {
        self.find_in_scope(kind, |entry| entry.node == node).is_some()
    }

    fn find_in_scope<F>(&self, kind: ScopeKind, mut matches: F) -> Option<usize>
    where
        F: FnMut(&OpenEntry) -> bool,
    {
        for index in (0..self.items.len()).rev() {
            let entry = &self.items[index];
            if matches(entry) {
                return Some(index);
            }
            if is_scope_boundary(entry, kind) {
                return None;
            }
        }
        None
    }

    /// Pop until an HTML element with `target` has been popped.
    /// The caller has already established the element is present.
    pub(crate) fn pop_until_name_inclusive(&mut self, target: AtomId) {
        while let Some(entry) = self.items.pop() {
            if entry.ns == Namespace::Html && entry.name == target {
                return;
            }
        }
        debug_assert!(false, "pop_until_name_inclusive target was not on the stack");
    }

    pub(crate) fn pop_until_any_inclusive(&mut self, targets: &[AtomId]) {
        while let Some(entry) = self.items.pop() {
            if entry.ns == Namespace::Html && targets.contains(&entry.name) {
                return;
            }
        }
        debug_assert!(false, "pop_until_any_inclusive targets were not on the stack");
    }

    /// Pop while the current entry is an HTML element outside `keep`.
    pub(crate) fn pop_to_one_of(&mut self, keep: &[AtomId]) {
        while let Some(entry) = self.items.last() {
            if entry.ns == Namespace::Html && keep.contains(&entry.name) {
                return;
            }
            self.items.pop();
        }
    }
}

fn is_scope_boundary(entry: &OpenEntry, kind: ScopeKind) -> bool {
    use crate::tree_builder::tag_sets::atoms::*;
    let default_boundary = match entry.ns {
        Namespace::Html => matches!(
            entry.name,
            APPLET | CAPTION | HTML | TABLE | TD | TH | MARQUEE | OBJECT | TEMPLATE
        ),
        Namespace::MathMl => matches!(entry.name, MI | MO | MN | MS | MTEXT | ANNOTATION_XML),
        Namespace::Svg => matches!(entry.name, FOREIGN_OBJECT | DESC | TITLE),
    };
    match kind {
        ScopeKind::Default => default_boundary,
        ScopeKind::ListItem => {
            default_boundary
                || (entry.ns == Namespace::Html && matches!(entry.name, OL | UL))
        }
        ScopeKind::Button => {
            default_boundary || (entry.ns == Namespace::Html && entry.name == BUTTON)
        }
        ScopeKind::Table => {
            entry.ns == Namespace::Html && matches!(entry.name, HTML | TABLE | TEMPLATE)
        }
        // Select scope inverts: everything except optgroup/option blocks.
        ScopeKind::Select => {
            !(entry.ns == Namespace::Html && matches!(entry.name, OPTGROUP | OPTION))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree_builder::tag_sets::atoms;

    fn entry(id: u32, name: AtomId) -> OpenEntry {
        OpenEntry {
            node: NodeId(id),
            name,
            ns: Namespace::Html,
        }
    }

    #[test]
    fn scope_boundaries_hide_targets() {
        let mut stack = OpenElementsStack::default();
        stack.push(entry(1, atoms::HTML));
        stack.push(entry(2, atoms::P));
        assert!(stack.has_in_scope(atoms::P, ScopeKind::Default));

        stack.push(entry(3, atoms::TABLE));
        assert!(!stack.has_in_scope(atoms::P, ScopeKind::Default));
        // Table scope still sees the table itself.
        assert!(stack.has_in_scope(atoms::TABLE, ScopeKind::Table));
    }

    #[test]
    fn button_and_list_item_scopes_add_their_boundaries() {
        let mut stack = OpenElementsStack::default();
        stack.push(entry(1, atoms::HTML));
        stack.push(entry(2, atoms::P));
        stack.push(entry(3, atoms::BUTTON));
        assert!(stack.has_in_scope(atoms::P, ScopeKind::Default));
        assert!(!stack.has_in_scope(atoms::P, ScopeKind::Button));

        let mut list = OpenElementsStack::default();
        list.push(entry(1, atoms::HTML));
        list.push(entry(2, atoms::LI));
        list.push(entry(3, atoms::UL));
        assert!(!list.has_in_scope(atoms::LI, ScopeKind::ListItem));
        assert!(stack.has_in_scope(atoms::P, ScopeKind::ListItem));
    }

    #[test]
    fn select_scope_blocks_on_anything_but_option_family() {
        let mut stack = OpenElementsStack::default();
        stack.push(entry(1, atoms::HTML));
        stack.push(entry(2, atoms::SELECT));
        stack.push(entry(3, atoms::OPTGROUP));
        stack.push(entry(4, atoms::OPTION));
        assert!(stack.has_in_scope(atoms::SELECT, ScopeKind::Select));

        stack.push(entry(5, atoms::DIV));
        assert!(!stack.has_in_scope(atoms::SELECT, ScopeKind::Select));
    }

    #[test]
    fn foreign_integration_points_bound_the_default_scope() {
        let mut stack = OpenElementsStack::default();
        stack.push(entry(1, atoms::HTML));
        stack.push(entry(2, atoms::P));
        stack.push(OpenEntry {
            node: NodeId(3),
            name: atoms::FOREIGN_OBJECT,
            ns: Namespace::Svg,
        });
        assert!(!stack.has_in_scope(atoms::P, ScopeKind::Default));
    }

    #[test]
    fn pop_until_name_inclusive_pops_through_the_target() {
        let mut stack = OpenElementsStack::default();
        stack.push(entry(1, atoms::HTML));
        stack.push(entry(2, atoms::DIV));
        stack.push(entry(3, atoms::SPAN));
        stack.pop_until_name_inclusive(atoms::DIV);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.current().map(|e| e.name), Some(atoms::HTML));
    }

    #[test]
    fn node_identity_lookups() {
        let mut stack = OpenElementsStack::default();
        stack.push(entry(1, atoms::HTML));
        stack.push(entry(2, atoms::B));
        assert_eq!(stack.index_of_node(NodeId(2)), Some(1));
        assert!(stack.contains_node(NodeId(2)));
        stack.remove_node(NodeId(2));
        assert!(!stack.contains_node(NodeId(2)));
    }
}
