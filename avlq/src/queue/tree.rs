//! AVL layer: height-balanced binary search tree over insertion keys.
//!
//! Heights are stored per side: a node's left/right height is the height of
//! the corresponding subtree plus one, or zero for an empty side. Retracing
//! walks from the deepest affected node toward the root, updating one side
//! height per step and rebalancing where the two sides diverge by more than
//! one. A rotation repoints parents for every node whose parent changed;
//! the caller (the retrace loop) repoints the edge above the rotated
//! subtree.

use crate::layout::{Side, TreeNode};

use super::AvlQueue;

/// Outcome of walking the tree for an insertion key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SearchResult {
    /// The tree is empty.
    Empty,
    /// A tree node with the key is active.
    Found(u16),
    /// No node has the key; a new leaf would attach to this node, on this
    /// side.
    Leaf(u16, Side),
}

/// Direction of a height change being retraced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum HeightOp {
    Increment,
    Decrement,
}

/// Inorder traversal target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Target {
    Predecessor,
    Successor,
}

impl<V> AvlQueue<V> {
    /// Walks from the root toward `key`, stopping at the node holding it or
    /// at the node a new leaf for it would attach under.
    pub(super) fn search(&self, key: u64) -> SearchResult {
        let mut node_id = match self.root.root() {
            Some(id) => id,
            None => return SearchResult::Empty,
        };
        loop {
            let node = self.tree_nodes.borrow(node_id);
            let node_key = node.key();
            let side = if key < node_key {
                Side::Left
            } else if key > node_key {
                Side::Right
            } else {
                return SearchResult::Found(node_id);
            };
            match node.child(side) {
                Some(child) => node_id = child,
                None => return SearchResult::Leaf(node_id, side),
            }
        }
    }

    /// Allocates a leaf tree node for a fresh insertion key, hosting the
    /// given sole list node, and links it under `parent` (or as the root).
    pub(super) fn insert_tree_node(
        &mut self,
        key: u64,
        parent: Option<(u16, Side)>,
        list_node_id: u16,
    ) -> u16 {
        let id = self.allocate_tree_node(TreeNode::new_active(
            key,
            parent.map(|(parent_id, _)| parent_id),
            list_node_id,
        ));
        match parent {
            Some((parent_id, side)) => {
                self.tree_nodes.borrow_mut(parent_id).set_child(side, Some(id));
            }
            None => self.root.set_root(Some(id)),
        }
        id
    }

    /// Walks upward from `start`, applying a one-level height change on
    /// `side` and rebalancing, until the change stops propagating or the
    /// root is retraced.
    pub(super) fn retrace(&mut self, start: u16, op: HeightOp, side: Side) {
        let mut node_id = start;
        let mut op = op;
        let mut side = side;
        let mut delta = 1u8;
        loop {
            let (updated_height, height_old, imbalanced, left_heavy) = {
                let node = self.tree_nodes.borrow_mut(node_id);
                let height_old = node.node_height();
                let side_height = match op {
                    HeightOp::Increment => node.height(side) + delta,
                    HeightOp::Decrement => node.height(side) - delta,
                };
                node.set_height(side, side_height);
                let left = node.left_height();
                let right = node.right_height();
                (
                    left.max(right),
                    height_old,
                    left.abs_diff(right) > 1,
                    left > right,
                )
            };
            let mut height = updated_height;
            let mut new_subtree_root = None;
            if imbalanced {
                let (subtree_root, subtree_height) =
                    self.retrace_rebalance(node_id, left_heavy);
                new_subtree_root = Some(subtree_root);
                height = subtree_height;
            }
            let subtree_root = new_subtree_root.unwrap_or(node_id);
            let parent = self.tree_nodes.borrow(subtree_root).parent();
            match parent {
                None => {
                    if new_subtree_root.is_some() {
                        self.root.set_root(new_subtree_root);
                    }
                    return;
                }
                Some(parent_id) => {
                    let parent = self.tree_nodes.borrow_mut(parent_id);
                    side = if parent.left() == Some(node_id) {
                        Side::Left
                    } else {
                        Side::Right
                    };
                    if new_subtree_root.is_some() {
                        parent.set_child(side, new_subtree_root);
                    }
                    delta = height.abs_diff(height_old);
                    if delta == 0 {
                        return;
                    }
                    op = if height > height_old {
                        HeightOp::Increment
                    } else {
                        HeightOp::Decrement
                    };
                    node_id = parent_id;
                }
            }
        }
    }

    /// Rebalances the subtree rooted at `node_x_id`, known to lean two
    /// levels toward its heavy side. Returns the new subtree root and the
    /// new subtree height. The edge above the subtree is left for the
    /// caller to repoint.
    fn retrace_rebalance(&mut self, node_x_id: u16, left_heavy: bool) -> (u16, u8) {
        let node_z_id = {
            let node_x = self.tree_nodes.borrow(node_x_id);
            let heavy_side = if left_heavy { Side::Left } else { Side::Right };
            node_x
                .child(heavy_side)
                .expect("heavy side of an unbalanced node has a child")
        };
        let node_z = self.tree_nodes.borrow(node_z_id);
        if left_heavy {
            if node_z.right_height() > node_z.left_height() {
                self.rotate_left_right(node_x_id, node_z_id)
            } else {
                self.rotate_right(node_x_id, node_z_id)
            }
        } else if node_z.left_height() > node_z.right_height() {
            self.rotate_right_left(node_x_id, node_z_id)
        } else {
            self.rotate_left(node_x_id, node_z_id)
        }
    }

    /// Single right rotation: `node_z` (left child of `node_x`, not
    /// right-heavy) becomes the subtree root, its former right subtree
    /// becomes `node_x`'s left subtree, and `node_x` becomes `node_z`'s
    /// right child.
    fn rotate_right(&mut self, node_x_id: u16, node_z_id: u16) -> (u16, u8) {
        let (tree_3, tree_3_height) = {
            let node_z = self.tree_nodes.borrow(node_z_id);
            (node_z.right(), node_z.right_height())
        };
        let (x_parent, x_right_height) = {
            let node_x = self.tree_nodes.borrow(node_x_id);
            (node_x.parent(), node_x.right_height())
        };
        if let Some(tree_3_id) = tree_3 {
            self.tree_nodes
                .borrow_mut(tree_3_id)
                .set_parent(Some(node_x_id));
        }
        {
            let node_x = self.tree_nodes.borrow_mut(node_x_id);
            node_x.set_child(Side::Left, tree_3);
            node_x.set_height(Side::Left, tree_3_height);
            node_x.set_parent(Some(node_z_id));
        }
        let node_x_height = tree_3_height.max(x_right_height);
        let node_z_height = {
            let node_z = self.tree_nodes.borrow_mut(node_z_id);
            node_z.set_child(Side::Right, Some(node_x_id));
            node_z.set_height(Side::Right, node_x_height + 1);
            node_z.set_parent(x_parent);
            node_z.node_height()
        };
        (node_z_id, node_z_height)
    }

    /// Single left rotation, the mirror of [`Self::rotate_right`].
    fn rotate_left(&mut self, node_x_id: u16, node_z_id: u16) -> (u16, u8) {
        let (tree_3, tree_3_height) = {
            let node_z = self.tree_nodes.borrow(node_z_id);
            (node_z.left(), node_z.left_height())
        };
        let (x_parent, x_left_height) = {
            let node_x = self.tree_nodes.borrow(node_x_id);
            (node_x.parent(), node_x.left_height())
        };
        if let Some(tree_3_id) = tree_3 {
            self.tree_nodes
                .borrow_mut(tree_3_id)
                .set_parent(Some(node_x_id));
        }
        {
            let node_x = self.tree_nodes.borrow_mut(node_x_id);
            node_x.set_child(Side::Right, tree_3);
            node_x.set_height(Side::Right, tree_3_height);
            node_x.set_parent(Some(node_z_id));
        }
        let node_x_height = tree_3_height.max(x_left_height);
        let node_z_height = {
            let node_z = self.tree_nodes.borrow_mut(node_z_id);
            node_z.set_child(Side::Left, Some(node_x_id));
            node_z.set_height(Side::Left, node_x_height + 1);
            node_z.set_parent(x_parent);
            node_z.node_height()
        };
        (node_z_id, node_z_height)
    }

    /// Left-right double rotation: `node_x` left-heavy, `node_z` (its left
    /// child) right-heavy. `node_y` (`node_z`'s right child) becomes the
    /// subtree root, its left subtree moves to `node_z`'s right and its
    /// right subtree to `node_x`'s left. Double rotations always produce a
    /// balance factor of zero at the new root, so both of `node_y`'s height
    /// fields end up one above the rebalanced `node_z` subtree.
    fn rotate_left_right(&mut self, node_x_id: u16, node_z_id: u16) -> (u16, u8) {
        let (node_y_id, z_left_height) = {
            let node_z = self.tree_nodes.borrow(node_z_id);
            (
                node_z
                    .right()
                    .expect("right-heavy node has a right child"),
                node_z.left_height(),
            )
        };
        let (tree_2, tree_2_height, tree_3, tree_3_height) = {
            let node_y = self.tree_nodes.borrow(node_y_id);
            (
                node_y.left(),
                node_y.left_height(),
                node_y.right(),
                node_y.right_height(),
            )
        };
        let x_parent = self.tree_nodes.borrow(node_x_id).parent();
        if let Some(tree_2_id) = tree_2 {
            self.tree_nodes
                .borrow_mut(tree_2_id)
                .set_parent(Some(node_z_id));
        }
        if let Some(tree_3_id) = tree_3 {
            self.tree_nodes
                .borrow_mut(tree_3_id)
                .set_parent(Some(node_x_id));
        }
        {
            let node_z = self.tree_nodes.borrow_mut(node_z_id);
            node_z.set_child(Side::Right, tree_2);
            node_z.set_height(Side::Right, tree_2_height);
            node_z.set_parent(Some(node_y_id));
        }
        {
            let node_x = self.tree_nodes.borrow_mut(node_x_id);
            node_x.set_child(Side::Left, tree_3);
            node_x.set_height(Side::Left, tree_3_height);
            node_x.set_parent(Some(node_y_id));
        }
        let node_z_height = z_left_height.max(tree_2_height);
        {
            let node_y = self.tree_nodes.borrow_mut(node_y_id);
            node_y.set_child(Side::Left, Some(node_z_id));
            node_y.set_child(Side::Right, Some(node_x_id));
            node_y.set_height(Side::Left, node_z_height + 1);
            node_y.set_height(Side::Right, node_z_height + 1);
            node_y.set_parent(x_parent);
        }
        (node_y_id, node_z_height + 1)
    }

    /// Right-left double rotation, the mirror of
    /// [`Self::rotate_left_right`].
    fn rotate_right_left(&mut self, node_x_id: u16, node_z_id: u16) -> (u16, u8) {
        let (node_y_id, z_right_height) = {
            let node_z = self.tree_nodes.borrow(node_z_id);
            (
                node_z.left().expect("left-heavy node has a left child"),
                node_z.right_height(),
            )
        };
        let (tree_2, tree_2_height, tree_3, tree_3_height) = {
            let node_y = self.tree_nodes.borrow(node_y_id);
            (
                node_y.right(),
                node_y.right_height(),
                node_y.left(),
                node_y.left_height(),
            )
        };
        let x_parent = self.tree_nodes.borrow(node_x_id).parent();
        if let Some(tree_2_id) = tree_2 {
            self.tree_nodes
                .borrow_mut(tree_2_id)
                .set_parent(Some(node_z_id));
        }
        if let Some(tree_3_id) = tree_3 {
            self.tree_nodes
                .borrow_mut(tree_3_id)
                .set_parent(Some(node_x_id));
        }
        {
            let node_z = self.tree_nodes.borrow_mut(node_z_id);
            node_z.set_child(Side::Left, tree_2);
            node_z.set_height(Side::Left, tree_2_height);
            node_z.set_parent(Some(node_y_id));
        }
        {
            let node_x = self.tree_nodes.borrow_mut(node_x_id);
            node_x.set_child(Side::Right, tree_3);
            node_x.set_height(Side::Right, tree_3_height);
            node_x.set_parent(Some(node_y_id));
        }
        let node_z_height = z_right_height.max(tree_2_height);
        {
            let node_y = self.tree_nodes.borrow_mut(node_y_id);
            node_y.set_child(Side::Right, Some(node_z_id));
            node_y.set_child(Side::Left, Some(node_x_id));
            node_y.set_height(Side::Right, node_z_height + 1);
            node_y.set_height(Side::Left, node_z_height + 1);
            node_y.set_parent(x_parent);
        }
        (node_y_id, node_z_height + 1)
    }

    /// Unlinks tree node `node_x_id` (whose list is already empty),
    /// retraces, and pushes the slot onto the inactive stack.
    pub(super) fn remove_tree_node(&mut self, node_x_id: u16) {
        let (left, right, parent) = {
            let node_x = self.tree_nodes.borrow(node_x_id);
            (node_x.left(), node_x.right(), node_x.parent())
        };
        let (new_subtree_root, retrace_from) = match (left, right) {
            (None, None) => (None, None),
            (Some(child), None) | (None, Some(child)) => {
                self.tree_nodes.borrow_mut(child).set_parent(parent);
                (Some(child), None)
            }
            (Some(left_id), Some(right_id)) => {
                let (node_y_id, retrace_node, retrace_side) =
                    self.remove_tree_node_with_children(node_x_id, left_id, right_id, parent);
                (Some(node_y_id), Some((retrace_node, retrace_side)))
            }
        };
        // Repoint the edge above the removed node before retracing, so the
        // upward walk sees a consistent parent chain.
        let x_side = parent.map(|parent_id| {
            let parent_node = self.tree_nodes.borrow(parent_id);
            if parent_node.left() == Some(node_x_id) {
                Side::Left
            } else {
                Side::Right
            }
        });
        match (parent, x_side) {
            (Some(parent_id), Some(side)) => {
                self.tree_nodes
                    .borrow_mut(parent_id)
                    .set_child(side, new_subtree_root);
            }
            _ => self.root.set_root(new_subtree_root),
        }
        let retrace_from = retrace_from.or(parent.zip(x_side));
        if let Some((retrace_node, retrace_side)) = retrace_from {
            self.retrace(retrace_node, HeightOp::Decrement, retrace_side);
        }
        self.free_tree_node(node_x_id);
    }

    /// Two-children removal: substitutes the in-order predecessor `node_y`
    /// (maximum of the left subtree) into `node_x`'s position. `node_y`
    /// inherits `node_x`'s heights; the retrace decrement then corrects the
    /// height on the side the tree actually shrank.
    fn remove_tree_node_with_children(
        &mut self,
        node_x_id: u16,
        left_id: u16,
        right_id: u16,
        parent: Option<u16>,
    ) -> (u16, u16, Side) {
        let mut node_y_id = left_id;
        loop {
            match self.tree_nodes.borrow(node_y_id).right() {
                Some(child) => node_y_id = child,
                None => break,
            }
        }
        let (x_left_height, x_right_height) = {
            let node_x = self.tree_nodes.borrow(node_x_id);
            (node_x.left_height(), node_x.right_height())
        };
        if node_y_id == left_id {
            // The predecessor is the immediate left child: it keeps its own
            // left subtree and takes over the right one.
            {
                let node_y = self.tree_nodes.borrow_mut(node_y_id);
                node_y.set_child(Side::Right, Some(right_id));
                node_y.set_height(Side::Left, x_left_height);
                node_y.set_height(Side::Right, x_right_height);
                node_y.set_parent(parent);
            }
            self.tree_nodes
                .borrow_mut(right_id)
                .set_parent(Some(node_y_id));
            (node_y_id, node_y_id, Side::Left)
        } else {
            // The predecessor sits deeper: its former parent adopts its
            // left subtree as a right child, then it takes over both of the
            // removed node's subtrees.
            let (node_y_parent_id, tree_1) = {
                let node_y = self.tree_nodes.borrow(node_y_id);
                (
                    node_y
                        .parent()
                        .expect("a deeper predecessor has a parent"),
                    node_y.left(),
                )
            };
            self.tree_nodes
                .borrow_mut(node_y_parent_id)
                .set_child(Side::Right, tree_1);
            if let Some(tree_1_id) = tree_1 {
                self.tree_nodes
                    .borrow_mut(tree_1_id)
                    .set_parent(Some(node_y_parent_id));
            }
            {
                let node_y = self.tree_nodes.borrow_mut(node_y_id);
                node_y.set_child(Side::Left, Some(left_id));
                node_y.set_child(Side::Right, Some(right_id));
                node_y.set_height(Side::Left, x_left_height);
                node_y.set_height(Side::Right, x_right_height);
                node_y.set_parent(parent);
            }
            self.tree_nodes
                .borrow_mut(left_id)
                .set_parent(Some(node_y_id));
            self.tree_nodes
                .borrow_mut(right_id)
                .set_parent(Some(node_y_id));
            (node_y_id, node_y_parent_id, Side::Right)
        }
    }

    /// Returns the inorder neighbor's insertion key, list head, and list
    /// tail, or `None` at the relevant end of the tree.
    pub(super) fn traverse(&self, start: u16, target: Target) -> Option<(u64, u16, u16)> {
        let inner = match target {
            Target::Successor => Side::Right,
            Target::Predecessor => Side::Left,
        };
        let outer = inner.flipped();
        let info = |node: &TreeNode| {
            (
                node.key(),
                node.list_head()
                    .expect("active tree node anchors a non-empty list"),
                node.list_tail()
                    .expect("active tree node anchors a non-empty list"),
            )
        };
        match self.tree_nodes.borrow(start).child(inner) {
            Some(mut node_id) => {
                // Innermost node of the subtree on the target side.
                loop {
                    match self.tree_nodes.borrow(node_id).child(outer) {
                        Some(child) => node_id = child,
                        None => break,
                    }
                }
                Some(info(self.tree_nodes.borrow(node_id)))
            }
            None => {
                // First ancestor whose subtree on the opposite side holds
                // the start node.
                let mut child_id = start;
                let mut parent = self.tree_nodes.borrow(start).parent();
                loop {
                    match parent {
                        None => return None,
                        Some(parent_id) => {
                            let parent_node = self.tree_nodes.borrow(parent_id);
                            if parent_node.child(outer) == Some(child_id) {
                                return Some(info(parent_node));
                            }
                            child_id = parent_id;
                            parent = parent_node.parent();
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_key;
    use crate::queue::SortOrder;

    fn ascending_with_keys(keys: &[u64]) -> AvlQueue<u64> {
        let mut queue = AvlQueue::new(SortOrder::Ascending, 0, 0).unwrap();
        for &key in keys {
            queue.insert(key, key).unwrap();
        }
        queue
    }

    fn search_id<V>(queue: &AvlQueue<V>, key: u64) -> u16 {
        match queue.search(key) {
            SearchResult::Found(id) => id,
            other => panic!("key {key} not found: {other:?}"),
        }
    }

    fn tree_node_for<V>(queue: &AvlQueue<V>, key: u64) -> &TreeNode {
        queue.tree_nodes.borrow(search_id(queue, key))
    }

    /// Synthesizes the access key of the oldest entry under `key`.
    fn access_key_for<V>(queue: &AvlQueue<V>, key: u64) -> u64 {
        let tree_node_id = search_id(queue, key);
        let list_node_id = queue
            .tree_nodes
            .borrow(tree_node_id)
            .list_head()
            .unwrap();
        access_key::new(tree_node_id, list_node_id, true, key)
    }

    mod search {
        use super::*;

        #[test]
        fn test_empty() {
            let queue: AvlQueue<u64> = AvlQueue::new(SortOrder::Ascending, 0, 0).unwrap();
            assert_eq!(queue.search(5), SearchResult::Empty);
        }

        #[test]
        fn test_found_and_leaf_sides() {
            let queue = ascending_with_keys(&[5, 2, 8]);
            let root_id = queue.root.root().unwrap();
            assert_eq!(queue.search(5), SearchResult::Found(root_id));

            match queue.search(1) {
                SearchResult::Leaf(id, Side::Left) => {
                    assert_eq!(queue.tree_nodes.borrow(id).key(), 2);
                }
                other => panic!("unexpected: {other:?}"),
            }
            match queue.search(9) {
                SearchResult::Leaf(id, Side::Right) => {
                    assert_eq!(queue.tree_nodes.borrow(id).key(), 8);
                }
                other => panic!("unexpected: {other:?}"),
            }
        }
    }

    mod rotations {
        use super::*;

        #[test]
        fn test_right_rotation_after_descending_inserts() {
            // 8, 6, 4 leans left at 8; the right rotation roots 6.
            let queue = ascending_with_keys(&[8, 6, 4]);
            let root = tree_node_for(&queue, 6);
            assert_eq!(queue.tree_nodes.borrow(root.left().unwrap()).key(), 4);
            assert_eq!(queue.tree_nodes.borrow(root.right().unwrap()).key(), 8);
            assert_eq!(root.left_height(), 1);
            assert_eq!(root.right_height(), 1);
            assert_eq!(root.parent(), None);
        }

        #[test]
        fn test_left_rotation_after_ascending_inserts() {
            let queue = ascending_with_keys(&[4, 6, 8]);
            let root = tree_node_for(&queue, 6);
            assert_eq!(queue.tree_nodes.borrow(root.left().unwrap()).key(), 4);
            assert_eq!(queue.tree_nodes.borrow(root.right().unwrap()).key(), 8);
        }

        #[test]
        fn test_left_right_rotation() {
            let queue = ascending_with_keys(&[8, 4, 6]);
            let root = tree_node_for(&queue, 6);
            assert_eq!(queue.tree_nodes.borrow(root.left().unwrap()).key(), 4);
            assert_eq!(queue.tree_nodes.borrow(root.right().unwrap()).key(), 8);
            assert_eq!(root.left_height(), 1);
            assert_eq!(root.right_height(), 1);
        }

        #[test]
        fn test_right_left_rotation() {
            let queue = ascending_with_keys(&[4, 8, 6]);
            let root = tree_node_for(&queue, 6);
            assert_eq!(queue.tree_nodes.borrow(root.left().unwrap()).key(), 4);
            assert_eq!(queue.tree_nodes.borrow(root.right().unwrap()).key(), 8);
        }

        #[test]
        fn test_double_rotation_transfers_subtree_with_parent_update() {
            // Inserting 5 unbalances 10 toward its right-heavy left child
            // 4, so the left-right rotation roots 6 and hands 6's former
            // left subtree (the node 5) to 4.
            let queue = ascending_with_keys(&[10, 4, 14, 2, 6, 5]);
            let root = tree_node_for(&queue, 6);
            assert_eq!(root.parent(), None);
            assert_eq!(root.left_height(), 2);
            assert_eq!(root.right_height(), 2);
            assert_eq!(queue.tree_nodes.borrow(root.left().unwrap()).key(), 4);
            assert_eq!(queue.tree_nodes.borrow(root.right().unwrap()).key(), 10);

            let node_4 = tree_node_for(&queue, 4);
            assert_eq!(node_4.right(), Some(search_id(&queue, 5)));
            assert_eq!(node_4.right_height(), 1);
            assert_eq!(
                tree_node_for(&queue, 5).parent(),
                Some(search_id(&queue, 4))
            );

            let node_10 = tree_node_for(&queue, 10);
            assert_eq!(node_10.left(), None);
            assert_eq!(node_10.left_height(), 0);
            assert_eq!(node_10.right(), Some(search_id(&queue, 14)));
        }
    }

    mod removal {
        use super::*;

        #[test]
        fn test_remove_leaf() {
            let mut queue = ascending_with_keys(&[5, 2, 8]);
            let access = queue.insert(2, 99).unwrap();
            queue.remove(access);
            // Key 2 still present: only one of its two entries was removed.
            assert!(matches!(queue.search(2), SearchResult::Found(_)));

            assert_eq!(queue.remove(access_key_for(&queue, 2)), 2);
            assert!(matches!(queue.search(2), SearchResult::Leaf(_, Side::Left)));
        }

        #[test]
        fn test_remove_node_with_one_child() {
            let mut queue = ascending_with_keys(&[5, 2, 8, 1]);
            let access = access_key_for(&queue, 2);
            queue.remove(access);
            let root = tree_node_for(&queue, 5);
            assert_eq!(queue.tree_nodes.borrow(root.left().unwrap()).key(), 1);
            assert_eq!(
                tree_node_for(&queue, 1).parent(),
                Some(queue.root.root().unwrap())
            );
        }

        #[test]
        fn test_remove_root_with_immediate_predecessor() {
            // 5's left child 2 has no right child: predecessor is immediate.
            let mut queue = ascending_with_keys(&[5, 2, 8, 1]);
            queue.remove(access_key_for(&queue, 5));
            let root_id = queue.root.root().unwrap();
            let root = queue.tree_nodes.borrow(root_id);
            assert_eq!(root.key(), 2);
            assert_eq!(root.parent(), None);
            assert_eq!(queue.tree_nodes.borrow(root.left().unwrap()).key(), 1);
            assert_eq!(queue.tree_nodes.borrow(root.right().unwrap()).key(), 8);
        }

        #[test]
        fn test_remove_root_with_deep_predecessor() {
            let mut queue = ascending_with_keys(&[5, 2, 8, 1, 3, 7, 9, 4, 6]);
            queue.remove(access_key_for(&queue, 5));

            let root_id = queue.root.root().unwrap();
            let root = queue.tree_nodes.borrow(root_id);
            assert_eq!(root.key(), 4);
            assert_eq!(root.parent(), None);
            assert_eq!(queue.tree_nodes.borrow(root.left().unwrap()).key(), 2);
            assert_eq!(queue.tree_nodes.borrow(root.right().unwrap()).key(), 8);
            assert_eq!(tree_node_for(&queue, 2).parent(), Some(root_id));
            assert_eq!(tree_node_for(&queue, 8).parent(), Some(root_id));

            // The predecessor's former parent gave up its right child.
            let node_3 = tree_node_for(&queue, 3);
            assert_eq!(node_3.right(), None);
            assert_eq!(node_3.right_height(), 0);
        }
    }

    mod traversal {
        use super::*;

        #[test]
        fn test_successor_descends_into_right_subtree() {
            let queue = ascending_with_keys(&[5, 2, 8, 6, 9, 7]);
            let start = search_id(&queue, 5);
            let (key, _, _) = queue.traverse(start, Target::Successor).unwrap();
            assert_eq!(key, 6);
        }

        #[test]
        fn test_successor_walks_up() {
            let queue = ascending_with_keys(&[5, 2, 8, 1, 3]);
            let start = search_id(&queue, 3);
            let (key, _, _) = queue.traverse(start, Target::Successor).unwrap();
            assert_eq!(key, 5);
        }

        #[test]
        fn test_predecessor_mirrors() {
            let queue = ascending_with_keys(&[5, 2, 8, 1, 3]);
            let (key, _, _) = queue
                .traverse(search_id(&queue, 5), Target::Predecessor)
                .unwrap();
            assert_eq!(key, 3);
            let (key, _, _) = queue
                .traverse(search_id(&queue, 8), Target::Predecessor)
                .unwrap();
            assert_eq!(key, 5);
        }

        #[test]
        fn test_no_neighbor_at_the_ends() {
            let queue = ascending_with_keys(&[5, 2, 8]);
            assert!(queue
                .traverse(search_id(&queue, 8), Target::Successor)
                .is_none());
            assert!(queue
                .traverse(search_id(&queue, 2), Target::Predecessor)
                .is_none());
        }
    }
}
