//! Doubly-linked-list layer: the per-tree-node FIFO of equal-key entries.
//!
//! Every active tree node anchors a non-empty list of list nodes. Edge
//! nodes point back at the anchor through tagged virtual fields; interior
//! nodes point at their list neighbors. Appends always land at the tail,
//! which is what preserves insertion order among equal keys.

use crate::layout::{ListNode, Ref};

use super::AvlQueue;

/// Position a removed list node held in its list, with the repair the
/// removal implied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListOutcome {
    /// Interior node; its neighbors were stitched together.
    Interior,
    /// The list's head; the anchor's list head moved to `id`.
    NewHead { anchor: u16, id: u16 },
    /// The list's tail; the anchor's list tail moved to `id`.
    NewTail { anchor: u16, id: u16 },
    /// The sole node; the anchor's list is now empty.
    Emptied { anchor: u16 },
}

impl<V> AvlQueue<V> {
    /// Appends a new list node as the tail of an existing tree node's list,
    /// returning the new node's id.
    pub(super) fn insert_list_node_append(&mut self, tree_node_id: u16, value: V) -> u16 {
        let old_tail = self
            .tree_nodes
            .borrow(tree_node_id)
            .list_tail()
            .expect("active tree node anchors a non-empty list");
        let id = self.allocate_list_node(
            ListNode::new_active(Ref::List(old_tail), Ref::Tree(tree_node_id)),
            value,
        );
        self.list_nodes.borrow_mut(old_tail).set_next(Ref::List(id));
        self.tree_nodes
            .borrow_mut(tree_node_id)
            .set_list_tail(Some(id));
        id
    }

    /// Creates the sole list node of a tree node about to be created, where
    /// `anchor` is the id the tree node is guaranteed to be allocated next.
    pub(super) fn insert_list_node_solo(&mut self, anchor: u16, value: V) -> u16 {
        self.allocate_list_node(
            ListNode::new_active(Ref::Tree(anchor), Ref::Tree(anchor)),
            value,
        )
    }

    /// Unlinks a list node, pushes its slot onto the inactive stack, and
    /// extracts its value.
    pub(super) fn remove_list_node(&mut self, list_node_id: u16) -> (V, ListOutcome) {
        let node = *self.list_nodes.borrow(list_node_id);
        let outcome = match (node.last_ref(), node.next_ref()) {
            (Ref::Tree(anchor), Ref::Tree(_)) => ListOutcome::Emptied { anchor },
            (Ref::Tree(anchor), Ref::List(next)) => {
                self.tree_nodes.borrow_mut(anchor).set_list_head(Some(next));
                self.list_nodes.borrow_mut(next).set_last(Ref::Tree(anchor));
                ListOutcome::NewHead { anchor, id: next }
            }
            (Ref::List(last), Ref::Tree(anchor)) => {
                self.tree_nodes.borrow_mut(anchor).set_list_tail(Some(last));
                self.list_nodes.borrow_mut(last).set_next(Ref::Tree(anchor));
                ListOutcome::NewTail { anchor, id: last }
            }
            (Ref::List(last), Ref::List(next)) => {
                self.list_nodes.borrow_mut(last).set_next(Ref::List(next));
                self.list_nodes.borrow_mut(next).set_last(Ref::List(last));
                ListOutcome::Interior
            }
        };
        let value = self.free_list_node(list_node_id);
        (value, outcome)
    }
}
