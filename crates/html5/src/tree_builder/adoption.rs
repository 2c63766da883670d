//! The adoption agency algorithm (misnested formatting recovery).
//!
//! Outer loop capped at 8, inner loop at 3, bookmark tracking, and the
//! clone-and-reparent of steps 13 through 19. Mutates both the stack of open
//! elements and the active formatting list; all DOM edits go through the
//! shared insertion primitive.

use crate::dom::{Attr, Namespace, NodeId};
use crate::shared::{AtomId, DocumentParseContext, ErrorOrigin, ParseErrorCode};
use crate::tree_builder::formatting::FormattingEntry;
use crate::tree_builder::stack::{OpenEntry, ScopeKind};
use crate::tree_builder::{synthetic_tag, tag_sets, TreeBuilder};

impl TreeBuilder {
    fn create_element_from_entry(
        &mut self,
        name: AtomId,
        attrs: &[(AtomId, String)],
        ctx: &mut DocumentParseContext,
    ) -> NodeId {
        let attr_vec = attrs
            .iter()
            .map(|(attr_name, value)| Attr {
                ns: None,
                name: ctx.atoms.resolve(*attr_name).to_string(),
                value: value.clone(),
            })
            .collect();
        self.doc
            .create_element(ctx.atoms.resolve_arc(name), Namespace::Html, attr_vec)
    }

    fn formatting_entry_data(&self, index: usize) -> (AtomId, Vec<(AtomId, String)>) {
        match self.formatting.get(index) {
            FormattingEntry::Element { name, attrs, .. } => (*name, attrs.clone()),
            FormattingEntry::Marker => unreachable!("adoption never selects a marker"),
        }
    }

    pub(crate) fn run_adoption_agency(&mut self, subject: AtomId, ctx: &mut DocumentParseContext) {
        // Fast path: the current node is the subject and not a formatting
        // list member.
        if let Some(current) = self.stack.current()
            && current.ns == Namespace::Html
            && current.name == subject
            && self.formatting.position_of_node(current.node).is_none()
        {
            self.stack.pop();
            return;
        }

        for _ in 0..8 {
            // The formatting element: last matching entry before a marker.
            let Some((fmt_index, fmt_node)) = self
                .formatting
                .last_element_with_name_before_marker(subject)
            else {
                self.any_other_end_tag(&synthetic_tag(subject), ctx);
                return;
            };

            let Some(fmt_stack_index) = self.stack.index_of_node(fmt_node) else {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::MisnestedTag, 0);
                self.formatting.remove_at(fmt_index);
                return;
            };

            if !self.stack.has_node_in_scope(fmt_node, ScopeKind::Default) {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::MisnestedTag, 0);
                return;
            }

            if fmt_stack_index != self.stack.len() - 1 {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::MisnestedTag, 0);
            }

            // Furthest block: topmost special element above the formatting
            // element.
            let furthest = ((fmt_stack_index + 1)..self.stack.len()).find(|&index| {
                let entry = self.stack.get(index);
                tag_sets::is_special(entry.ns, entry.name)
            });
            let Some(fb_index) = furthest else {
                // No furthest block: pop through the formatting element and
                // drop its list entry.
                self.stack.truncate(fmt_stack_index);
                self.formatting.remove_at(fmt_index);
                return;
            };
            let fb = self.stack.get(fb_index);

            let common_ancestor = self.stack.get(fmt_stack_index - 1).node;
            let mut bookmark = fmt_index;
            let mut node_index = fb_index;
            let mut last_node = fb.node;

            // Inner loop: walk up from the furthest block, cloning formatting
            // members and discarding the rest.
            let mut inner = 0u32;
            loop {
                inner += 1;
                node_index -= 1;
                let node_entry = self.stack.get(node_index);
                if node_entry.node == fmt_node {
                    break;
                }
                let mut node_fmt_index = self.formatting.position_of_node(node_entry.node);
                if inner > 3 && let Some(index) = node_fmt_index {
                    self.formatting.remove_at(index);
                    if index < bookmark {
                        bookmark -= 1;
                    }
                    node_fmt_index = None;
                }
                let Some(node_fmt_index) = node_fmt_index else {
                    self.stack.remove_index(node_index);
                    // After the removal, node_index names the element that
                    // was below; the next decrement lands on the one above.
                    continue;
                };

                let (name, attrs) = self.formatting_entry_data(node_fmt_index);
                let new_node = self.create_element_from_entry(name, &attrs, ctx);
                self.formatting.replace_node_at(node_fmt_index, new_node);
                self.stack.replace_at(
                    node_index,
                    OpenEntry {
                        node: new_node,
                        name,
                        ns: Namespace::Html,
                    },
                );
                if last_node == fb.node {
                    bookmark = node_fmt_index + 1;
                }
                self.doc.detach(last_node);
                self.doc.append(new_node, last_node);
                last_node = new_node;
            }

            // Place the assembled chain below the common ancestor (foster
            // parenting applies when the ancestor is a table context).
            self.doc.detach(last_node);
            let point = self.appropriate_insertion_point(Some(common_ancestor));
            self.doc.insert(last_node, point);

            // Fresh element for the formatting entry; the furthest block's
            // children move into it.
            let fmt_index_now = self
                .formatting
                .position_of_node(fmt_node)
                .expect("formatting entry survives the inner loop");
            let (name, attrs) = self.formatting_entry_data(fmt_index_now);
            let new_fmt = self.create_element_from_entry(name, &attrs, ctx);
            self.doc.reparent_children(fb.node, new_fmt);
            self.doc.append(fb.node, new_fmt);

            self.formatting.remove_at(fmt_index_now);
            if fmt_index_now < bookmark {
                bookmark -= 1;
            }
            let bookmark = bookmark.min(self.formatting.len());
            self.formatting.insert_at(
                bookmark,
                FormattingEntry::Element {
                    node: new_fmt,
                    name,
                    ns: Namespace::Html,
                    attrs,
                },
            );

            self.stack.remove_index(fmt_stack_index);
            let fb_index_now = self
                .stack
                .index_of_node(fb.node)
                .expect("furthest block stays open");
            self.stack.insert_at(
                fb_index_now + 1,
                OpenEntry {
                    node: new_fmt,
                    name,
                    ns: Namespace::Html,
                },
            );
        }
    }
}
