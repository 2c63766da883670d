//! List of active formatting elements.
//!
//! Entries keep a copy of the original tag data (interned name plus owned
//! attributes) because reconstruction and the adoption agency both recreate
//! elements "for the token for which the element was created".

use crate::dom::{Namespace, NodeId};
use crate::shared::AtomId;

#[derive(Clone, Debug)]
pub(crate) enum FormattingEntry {
    /// Scope marker (applet, object, marquee, template, td, th, caption).
    Marker,
    Element {
        node: NodeId,
        name: AtomId,
        ns: Namespace,
        attrs: Vec<(AtomId, String)>,
    },
}

impl FormattingEntry {
    pub(crate) fn node(&self) -> Option<NodeId> {
        match self {
            FormattingEntry::Marker => None,
            FormattingEntry::Element { node, .. } => Some(*node),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct ActiveFormattingList {
    items: Vec<FormattingEntry>,
    max_depth: u32,
}

impl ActiveFormattingList {
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn get(&self, index: usize) -> &FormattingEntry {
        &self.items[index]
    }

    pub(crate) fn push_marker(&mut self) {
        self.items.push(FormattingEntry::Marker);
        self.max_depth = self.max_depth.max(self.items.len() as u32);
    }

    /// Push an element entry, enforcing the Noah's Ark clause: at most three
    /// entries with the same name, namespace and attributes between the end
    /// of the list and the last marker; the earliest surplus entry drops.
    pub(crate) fn push_element(
        &mut self,
        node: NodeId,
        name: AtomId,
        ns: Namespace,
        attrs: Vec<(AtomId, String)>,
    ) {
        let mut matching = Vec::new();
        for index in (0..self.items.len()).rev() {
            match &self.items[index] {
                FormattingEntry::Marker => break,
                FormattingEntry::Element {
                    name: n,
                    ns: s,
                    attrs: a,
                    ..
                } => {
                    if *n == name && *s == ns && attrs_equal(a, &attrs) {
                        matching.push(index);
                    }
                }
            }
        }
        if matching.len() >= 3 {
            // `matching` is in reverse order; the last element is earliest.
            let earliest = *matching.last().expect("matching is non-empty");
            self.items.remove(earliest);
        }
        self.items.push(FormattingEntry::Element {
            node,
            name,
            ns,
            attrs,
        });
        self.max_depth = self.max_depth.max(self.items.len() as u32);
    }

    /// Clear entries up to and including the last marker.
    pub(crate) fn clear_to_last_marker(&mut self) {
        while let Some(entry) = self.items.pop() {
            if matches!(entry, FormattingEntry::Marker) {
                return;
            }
        }
    }

    pub(crate) fn position_of_node(&self, node: NodeId) -> Option<usize> {
        self.items
            .iter()
            .rposition(|entry| entry.node() == Some(node))
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> FormattingEntry {
        self.items.remove(index)
    }

    pub(crate) fn remove_node(&mut self, node: NodeId) {
        if let Some(index) = self.position_of_node(node) {
            self.items.remove(index);
        }
    }

    pub(crate) fn insert_at(&mut self, index: usize, entry: FormattingEntry) {
        self.items.insert(index, entry);
        self.max_depth = self.max_depth.max(self.items.len() as u32);
    }

    /// Replace the node of the element entry at `index`, keeping its tag data.
    pub(crate) fn replace_node_at(&mut self, index: usize, new_node: NodeId) {
        match &mut self.items[index] {
            FormattingEntry::Element { node, .. } => *node = new_node,
            FormattingEntry::Marker => {
                debug_assert!(false, "replace_node_at on a marker entry");
            }
        }
    }

    /// Last element entry with `name` between the end of the list and the
    /// last marker.
    pub(crate) fn last_element_with_name_before_marker(
        &self,
        name: AtomId,
    ) -> Option<(usize, NodeId)> {
        for index in (0..self.items.len()).rev() {
            match &self.items[index] {
                FormattingEntry::Marker => return None,
                FormattingEntry::Element {
                    node, name: n, ns, ..
                } => {
                    if *n == name && *ns == Namespace::Html {
                        return Some((index, *node));
                    }
                }
            }
        }
        None
    }

    pub(crate) fn max_depth(&self) -> u32 {
        self.max_depth
    }
}

/// Attribute-list equality for the Noah's Ark clause: same length and every
/// (name, value) pair present in the other list (order-insensitive; the
/// tokenizer already dropped duplicates).
fn attrs_equal(a: &[(AtomId, String)], b: &[(AtomId, String)]) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(name, value)| b.iter().any(|(n, v)| n == name && v == value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree_builder::tag_sets::atoms;

    fn push_b(list: &mut ActiveFormattingList, id: u32, attrs: Vec<(AtomId, String)>) {
        list.push_element(NodeId(id), atoms::B, Namespace::Html, attrs);
    }

    #[test]
    fn noahs_ark_caps_identical_entries_at_three() {
        let mut list = ActiveFormattingList::default();
        for id in 1..=4 {
            push_b(&mut list, id, Vec::new());
        }
        assert_eq!(list.len(), 3);
        // The earliest entry was dropped.
        assert_eq!(list.position_of_node(NodeId(1)), None);
        assert!(list.position_of_node(NodeId(4)).is_some());
    }

    #[test]
    fn noahs_ark_distinguishes_attributes() {
        let mut list = ActiveFormattingList::default();
        for id in 1..=3 {
            push_b(&mut list, id, Vec::new());
        }
        push_b(
            &mut list,
            4,
            vec![(atoms::COLOR, "red".to_string())],
        );
        assert_eq!(list.len(), 4);
        assert!(list.position_of_node(NodeId(1)).is_some());
    }

    #[test]
    fn noahs_ark_does_not_cross_markers() {
        let mut list = ActiveFormattingList::default();
        push_b(&mut list, 1, Vec::new());
        push_b(&mut list, 2, Vec::new());
        list.push_marker();
        push_b(&mut list, 3, Vec::new());
        push_b(&mut list, 4, Vec::new());
        push_b(&mut list, 5, Vec::new());
        // Only the three entries after the marker count.
        assert_eq!(list.len(), 6);
    }

    #[test]
    fn clear_to_last_marker_stops_at_the_marker() {
        let mut list = ActiveFormattingList::default();
        push_b(&mut list, 1, Vec::new());
        list.push_marker();
        push_b(&mut list, 2, Vec::new());
        push_b(&mut list, 3, Vec::new());
        list.clear_to_last_marker();
        assert_eq!(list.len(), 1);
        assert!(list.position_of_node(NodeId(1)).is_some());
    }

    #[test]
    fn last_element_with_name_stops_at_marker() {
        let mut list = ActiveFormattingList::default();
        push_b(&mut list, 1, Vec::new());
        list.push_marker();
        assert!(list.last_element_with_name_before_marker(atoms::B).is_none());
        push_b(&mut list, 2, Vec::new());
        assert_eq!(
            list.last_element_with_name_before_marker(atoms::B),
            Some((2, NodeId(2)))
        );
    }
}
