//! # AVL-queue
//!
//! A hybrid of a height-balanced AVL tree and per-key FIFO doubly linked
//! lists: a priority queue with ordered key traversal, insertion-order
//! traversal among equal keys, and O(log n) random access, insertion, and
//! removal anywhere in the structure.
//!
//! ```text
//! ╔════════════════════════════════════════════════════════════════════╗
//! ║                        VISUAL REPRESENTATION                       ║
//! ╠════════════════════════════════════════════════════════════════════╣
//! ║                                                                    ║
//! ║  One tree node per distinct insertion key, one list node per       ║
//! ║  insertion event:                                                  ║
//! ║                                                                    ║
//! ║                     ┌────────┐                                     ║
//! ║      head ─────┐    │ key 5  │◀─────────────┐                      ║
//! ║      (asc.)    │    └───┬────┘              │                      ║
//! ║                ▼        ▼                   ▼                      ║
//! ║           ┌────────┐  [e]              ┌────────┐                  ║
//! ║           │ key 2  │                   │ key 8  │                  ║
//! ║           └───┬────┘                   └───┬────┘                  ║
//! ║               ▼                            ▼                       ║
//! ║          [a]◀─▶[c]                    [b]◀─▶[d]◀─▶[f]              ║
//! ║          oldest  newest                          ▲                 ║
//! ║                                                  └───── tail       ║
//! ║                                                                    ║
//! ║  Freed node ids are recycled through inactive-node stacks          ║
//! ║  threaded through the slots themselves:                            ║
//! ║                                                                    ║
//! ║    stack top ──▶ [slot 7] ──▶ [slot 3] ──▶ [slot 9] ──▶ (none)     ║
//! ║                                                                    ║
//! ╚════════════════════════════════════════════════════════════════════╝
//! ```
//!
//! ## Complexity
//!
//! | Operation            | Time       | Notes                          |
//! |----------------------|------------|--------------------------------|
//! | insert               | O(log n)   | n = distinct active keys       |
//! | remove by access key | O(log n)   | O(1) unless a tree node dies   |
//! | pop_head / pop_tail  | O(log n)   |                                |
//! | borrow by access key | O(1)       |                                |
//! | head/tail inspection | O(1)       |                                |
//!
//! ## Example
//!
//! ```rust
//! use avlq::{AvlQueue, SortOrder};
//!
//! let mut queue = AvlQueue::new(SortOrder::Ascending, 0, 0).unwrap();
//! let access_key = queue.insert(3, "three").unwrap();
//! queue.insert(1, "one").unwrap();
//!
//! assert_eq!(queue.get_head_key(), Some(1));
//! assert_eq!(queue.pop_head(), "one");
//! assert_eq!(queue.remove(access_key), "three");
//! assert!(queue.is_empty());
//! ```

use avlq_core::{AvlQueueError, Container, Result, Tree};

use crate::access_key;
use crate::layout::{
    ListNode, Ref, RootRecord, TreeNode, MAX_HEIGHT, MAX_INSERTION_KEY, MAX_NODES, NIL,
};
use crate::slots::SlotTable;

mod list;
mod tree;

use list::ListOutcome;
pub(crate) use tree::SearchResult;
use tree::{HeightOp, Target};

/// Orientation of the queue: which end of the key range `pop_head` drains
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest insertion key first.
    Ascending,
    /// Largest insertion key first.
    Descending,
}

/// Result of an [`AvlQueue::insert_check_eviction`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionOutcome<V> {
    /// The entry was inserted without evicting anything.
    Inserted {
        /// Access key of the new entry.
        access_key: u64,
    },
    /// The queue tail was evicted to make room for the new entry.
    Evicted {
        /// Access key of the new entry.
        access_key: u64,
        /// Access key the evicted entry had been issued.
        evicted_access_key: u64,
        /// Value of the evicted entry.
        evicted_value: V,
    },
    /// The insertion was declined because the new entry would itself have
    /// become the tail; its value is handed back.
    Declined {
        /// The value that was not inserted.
        value: V,
    },
}

/// A hybrid AVL tree / FIFO queue.
///
/// Entries are ordered by 32-bit insertion key, then by insertion order
/// among equal keys. Every insert returns a 64-bit access key (see
/// [`crate::access_key`]) which grants O(1) access and O(log n) removal of
/// that specific entry.
///
/// At most 16,383 tree nodes (distinct active keys) and 16,383 list nodes
/// (active entries) can be allocated; freed slots are recycled, so access
/// keys are unique only within a queue at a given time.
///
/// # Example
///
/// ```rust
/// use avlq::{AvlQueue, SortOrder};
///
/// let mut queue = AvlQueue::new(SortOrder::Ascending, 0, 0).unwrap();
/// queue.insert(2, "first at 2").unwrap();
/// queue.insert(2, "second at 2").unwrap();
/// queue.insert(1, "at 1").unwrap();
///
/// // Key order first, insertion order among equal keys.
/// assert_eq!(queue.pop_head(), "at 1");
/// assert_eq!(queue.pop_head(), "first at 2");
/// assert_eq!(queue.pop_head(), "second at 2");
/// ```
#[derive(Debug)]
pub struct AvlQueue<V> {
    /// Sort order, root pointer, head/tail cache, inactive-stack tops.
    root: RootRecord,
    /// Tree-node slots, active and inactive.
    tree_nodes: SlotTable<TreeNode>,
    /// List-node slots, active and inactive.
    list_nodes: SlotTable<ListNode>,
    /// Insertion values, stored apart from the list nodes so neighbor
    /// repointing never touches them.
    values: SlotTable<Option<V>>,
}

impl<V> AvlQueue<V> {
    /// Creates an empty queue with the given sort order, pre-allocating the
    /// requested number of inactive tree and list nodes.
    ///
    /// # Errors
    ///
    /// Returns [`AvlQueueError::TooManyTreeNodes`] or
    /// [`AvlQueueError::TooManyListNodes`] if a pre-allocation count
    /// exceeds 16,383.
    ///
    /// # Example
    ///
    /// ```rust
    /// use avlq::{AvlQueue, SortOrder};
    ///
    /// let queue: AvlQueue<u32> = AvlQueue::new(SortOrder::Descending, 8, 16).unwrap();
    /// assert!(queue.is_empty());
    /// assert!(!queue.is_ascending());
    /// ```
    pub fn new(
        order: SortOrder,
        n_inactive_tree_nodes: usize,
        n_inactive_list_nodes: usize,
    ) -> Result<Self> {
        if n_inactive_tree_nodes > MAX_NODES {
            return Err(AvlQueueError::TooManyTreeNodes);
        }
        if n_inactive_list_nodes > MAX_NODES {
            return Err(AvlQueueError::TooManyListNodes);
        }
        let mut queue = AvlQueue {
            root: RootRecord::new(order == SortOrder::Ascending),
            tree_nodes: SlotTable::new(),
            list_nodes: SlotTable::new(),
            values: SlotTable::new(),
        };
        for i in 0..n_inactive_tree_nodes {
            let id = (i + 1) as u16;
            let top = queue.root.tree_stack_top();
            queue.tree_nodes.add(id, TreeNode::inactive(top));
            queue.root.set_tree_stack_top(Some(id));
        }
        for i in 0..n_inactive_list_nodes {
            let id = (i + 1) as u16;
            let top = queue.root.list_stack_top();
            queue.list_nodes.add(id, ListNode::inactive(top));
            queue.values.add(id, None);
            queue.root.set_list_stack_top(Some(id));
        }
        Ok(queue)
    }

    /// Inserts a value under an insertion key, returning the entry's access
    /// key.
    ///
    /// A new entry lands at the back of its key's FIFO list; a fresh key
    /// gets a new leaf tree node, with rebalancing retraced up the tree.
    ///
    /// # Time Complexity
    /// O(log n)
    ///
    /// # Errors
    ///
    /// - [`AvlQueueError::InsertionKeyTooLarge`] if `key >= 2^32`.
    /// - [`AvlQueueError::TooManyListNodes`] /
    ///   [`AvlQueueError::TooManyTreeNodes`] if all 16,383 slots of the
    ///   corresponding kind are active.
    ///
    /// On error the queue is unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use avlq::{access_key, AvlQueue, SortOrder};
    ///
    /// let mut queue = AvlQueue::new(SortOrder::Ascending, 0, 0).unwrap();
    /// let key = queue.insert(10, 'x').unwrap();
    /// assert_eq!(access_key::insertion_key(key), 10);
    /// assert_eq!(queue.borrow(key), &'x');
    /// ```
    pub fn insert(&mut self, key: u64, value: V) -> Result<u64> {
        if key > MAX_INSERTION_KEY {
            return Err(AvlQueueError::InsertionKeyTooLarge);
        }
        let search = self.search(key);
        let needs_tree_node = !matches!(search, SearchResult::Found(_));
        if self.root.list_stack_top().is_none() && self.list_nodes.len() >= MAX_NODES {
            return Err(AvlQueueError::TooManyListNodes);
        }
        if needs_tree_node
            && self.root.tree_stack_top().is_none()
            && self.tree_nodes.len() >= MAX_NODES
        {
            return Err(AvlQueueError::TooManyTreeNodes);
        }
        let (tree_node_id, list_node_id) = match search {
            SearchResult::Found(tree_node_id) => (
                tree_node_id,
                self.insert_list_node_append(tree_node_id, value),
            ),
            SearchResult::Empty => {
                let anchor = self.next_tree_node_id();
                let list_node_id = self.insert_list_node_solo(anchor, value);
                let tree_node_id = self.insert_tree_node(key, None, list_node_id);
                debug_assert_eq!(tree_node_id, anchor);
                (tree_node_id, list_node_id)
            }
            SearchResult::Leaf(parent_id, side) => {
                let anchor = self.next_tree_node_id();
                let list_node_id = self.insert_list_node_solo(anchor, value);
                let tree_node_id =
                    self.insert_tree_node(key, Some((parent_id, side)), list_node_id);
                debug_assert_eq!(tree_node_id, anchor);
                self.retrace(parent_id, HeightOp::Increment, side);
                (tree_node_id, list_node_id)
            }
        };
        self.insert_check_head_tail(key, list_node_id);
        Ok(access_key::new(
            tree_node_id,
            list_node_id,
            self.is_ascending(),
            key,
        ))
    }

    /// Inserts with tail eviction if the queue is degraded: taller than
    /// `critical_height` at the root, or out of list-node slots.
    ///
    /// An empty or healthy queue takes the entry as a plain insert. A
    /// degraded queue first declines the entry outright if it would itself
    /// become the tail, and otherwise evicts the current tail before
    /// inserting.
    ///
    /// # Errors
    ///
    /// - [`AvlQueueError::InvalidHeight`] if `critical_height > 18`.
    /// - Any error a plain [`AvlQueue::insert`] of the entry can produce.
    ///
    /// On error the queue is unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use avlq::{AvlQueue, EvictionOutcome, SortOrder};
    ///
    /// let mut queue = AvlQueue::new(SortOrder::Ascending, 0, 0).unwrap();
    /// queue.insert(1, "keep").unwrap();
    /// queue.insert(2, "doomed").unwrap();
    ///
    /// // Critical height 0 forces eviction on any multi-key tree.
    /// match queue.insert_check_eviction(0, "new", 0).unwrap() {
    ///     EvictionOutcome::Evicted { evicted_value, .. } => {
    ///         assert_eq!(evicted_value, "doomed");
    ///     }
    ///     other => panic!("expected eviction, got {other:?}"),
    /// }
    ///
    /// // An entry that would become the tail is declined instead.
    /// match queue.insert_check_eviction(9, "tail", 0).unwrap() {
    ///     EvictionOutcome::Declined { value } => assert_eq!(value, "tail"),
    ///     other => panic!("expected decline, got {other:?}"),
    /// }
    /// ```
    pub fn insert_check_eviction(
        &mut self,
        key: u64,
        value: V,
        critical_height: u8,
    ) -> Result<EvictionOutcome<V>> {
        if critical_height > MAX_HEIGHT {
            return Err(AvlQueueError::InvalidHeight);
        }
        if key > MAX_INSERTION_KEY {
            return Err(AvlQueueError::InsertionKeyTooLarge);
        }
        let root_id = match self.root.root() {
            None => {
                let access_key = self.insert(key, value)?;
                return Ok(EvictionOutcome::Inserted { access_key });
            }
            Some(id) => id,
        };
        let too_tall = self.tree_nodes.borrow(root_id).node_height() > critical_height;
        let max_list_nodes_active =
            self.list_nodes.len() >= MAX_NODES && self.root.list_stack_top().is_none();
        if !too_tall && !max_list_nodes_active {
            let access_key = self.insert(key, value)?;
            return Ok(EvictionOutcome::Inserted { access_key });
        }
        if self.would_become_tail(key) {
            return Ok(EvictionOutcome::Declined { value });
        }
        let (access_key, evicted_access_key, evicted_value) =
            self.evict_tail_and_insert(key, value)?;
        Ok(EvictionOutcome::Evicted {
            access_key,
            evicted_access_key,
            evicted_value,
        })
    }

    /// Unconditionally evicts the queue tail and inserts, returning the new
    /// entry's access key together with the evicted entry's access key and
    /// value.
    ///
    /// # Errors
    ///
    /// - [`AvlQueueError::InsertionKeyTooLarge`] if `key >= 2^32`.
    /// - [`AvlQueueError::EvictEmpty`] if the queue is empty.
    /// - [`AvlQueueError::EvictNewTail`] if the new entry would itself
    ///   become the tail.
    ///
    /// On error the queue is unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use avlq::{AvlQueue, AvlQueueError, SortOrder};
    ///
    /// let mut queue = AvlQueue::new(SortOrder::Ascending, 0, 0).unwrap();
    /// queue.insert(5, "tail").unwrap();
    ///
    /// assert_eq!(
    ///     queue.insert_evict_tail(6, "would be tail").unwrap_err(),
    ///     AvlQueueError::EvictNewTail,
    /// );
    ///
    /// let (_, _, evicted) = queue.insert_evict_tail(4, "head").unwrap();
    /// assert_eq!(evicted, "tail");
    /// assert_eq!(queue.get_head_key(), Some(4));
    /// ```
    pub fn insert_evict_tail(&mut self, key: u64, value: V) -> Result<(u64, u64, V)> {
        if key > MAX_INSERTION_KEY {
            return Err(AvlQueueError::InsertionKeyTooLarge);
        }
        if self.is_empty() {
            return Err(AvlQueueError::EvictEmpty);
        }
        if self.would_become_tail(key) {
            return Err(AvlQueueError::EvictNewTail);
        }
        self.evict_tail_and_insert(key, value)
    }

    /// Removes the entry an access key names, returning its value.
    ///
    /// Only the access key's list-node-id field is consulted; the
    /// tree-node-id and insertion-key fields are not verified. The entry's
    /// list node must still be active: access keys are reissued as slots
    /// recycle, so a stale key may name an unrelated entry.
    ///
    /// # Time Complexity
    /// O(1), plus O(log n) when the entry was the last one under its key.
    ///
    /// # Panics
    ///
    /// Panics if the named list node is not active.
    pub fn remove(&mut self, access_key: u64) -> V {
        self.remove_list_node_by_id(access_key::list_node_id(access_key))
    }

    /// Removes and returns the head entry.
    ///
    /// # Time Complexity
    /// O(log n)
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty.
    ///
    /// # Example
    ///
    /// ```rust
    /// use avlq::{AvlQueue, SortOrder};
    ///
    /// let mut queue = AvlQueue::new(SortOrder::Descending, 0, 0).unwrap();
    /// queue.insert(1, "low").unwrap();
    /// queue.insert(9, "high").unwrap();
    /// assert_eq!(queue.pop_head(), "high");
    /// ```
    pub fn pop_head(&mut self) -> V {
        let head = self.root.head_id().expect("pop from an empty queue");
        self.remove_list_node_by_id(head)
    }

    /// Removes and returns the tail entry.
    ///
    /// # Time Complexity
    /// O(log n)
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty.
    pub fn pop_tail(&mut self) -> V {
        let tail = self.root.tail_id().expect("pop from an empty queue");
        self.remove_list_node_by_id(tail)
    }

    /// Borrows the value an access key names.
    ///
    /// # Panics
    ///
    /// Panics if the named list node is not active.
    pub fn borrow(&self, access_key: u64) -> &V {
        let list_node_id = access_key::list_node_id(access_key);
        assert!(
            self.is_active_list_node(list_node_id),
            "access key names an inactive list node"
        );
        self.values
            .borrow(list_node_id)
            .as_ref()
            .expect("active list node has a value")
    }

    /// Mutably borrows the value an access key names.
    ///
    /// # Panics
    ///
    /// Panics if the named list node is not active.
    pub fn borrow_mut(&mut self, access_key: u64) -> &mut V {
        let list_node_id = access_key::list_node_id(access_key);
        assert!(
            self.is_active_list_node(list_node_id),
            "access key names an inactive list node"
        );
        self.values
            .borrow_mut(list_node_id)
            .as_mut()
            .expect("active list node has a value")
    }

    /// Borrows the head entry's value.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty.
    pub fn borrow_head(&self) -> &V {
        let head = self.root.head_id().expect("borrow from an empty queue");
        self.values
            .borrow(head)
            .as_ref()
            .expect("active list node has a value")
    }

    /// Mutably borrows the head entry's value.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty.
    pub fn borrow_head_mut(&mut self) -> &mut V {
        let head = self.root.head_id().expect("borrow from an empty queue");
        self.values
            .borrow_mut(head)
            .as_mut()
            .expect("active list node has a value")
    }

    /// Borrows the tail entry's value.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty.
    pub fn borrow_tail(&self) -> &V {
        let tail = self.root.tail_id().expect("borrow from an empty queue");
        self.values
            .borrow(tail)
            .as_ref()
            .expect("active list node has a value")
    }

    /// Mutably borrows the tail entry's value.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty.
    pub fn borrow_tail_mut(&mut self) -> &mut V {
        let tail = self.root.tail_id().expect("borrow from an empty queue");
        self.values
            .borrow_mut(tail)
            .as_mut()
            .expect("active list node has a value")
    }

    /// Returns the head entry's insertion key, if any.
    ///
    /// # Example
    ///
    /// ```rust
    /// use avlq::{AvlQueue, SortOrder};
    ///
    /// let mut queue = AvlQueue::new(SortOrder::Ascending, 0, 0).unwrap();
    /// assert_eq!(queue.get_head_key(), None);
    /// queue.insert(7, ()).unwrap();
    /// assert_eq!(queue.get_head_key(), Some(7));
    /// ```
    pub fn get_head_key(&self) -> Option<u64> {
        self.root.head_id().map(|_| self.root.head_key())
    }

    /// Returns the tail entry's insertion key, if any.
    pub fn get_tail_key(&self) -> Option<u64> {
        self.root.tail_id().map(|_| self.root.tail_key())
    }

    /// Returns the tree root's height, if the queue is non-empty. A sole
    /// tree node has height 0.
    ///
    /// # Example
    ///
    /// ```rust
    /// use avlq::{AvlQueue, SortOrder};
    ///
    /// let mut queue = AvlQueue::new(SortOrder::Ascending, 0, 0).unwrap();
    /// assert_eq!(queue.get_height(), None);
    /// for key in [8, 6, 4] {
    ///     queue.insert(key, ()).unwrap();
    /// }
    /// assert_eq!(queue.get_height(), Some(1));
    /// ```
    pub fn get_height(&self) -> Option<u8> {
        self.root
            .root()
            .map(|id| self.tree_nodes.borrow(id).node_height())
    }

    /// Returns `true` if the queue holds no entries.
    pub fn is_empty(&self) -> bool {
        self.root.root().is_none()
    }

    /// Returns `true` if the queue drains smallest key first.
    pub fn is_ascending(&self) -> bool {
        self.root.is_ascending()
    }

    /// Returns `true` if any active entry has the given insertion key.
    ///
    /// # Time Complexity
    /// O(log n)
    ///
    /// # Errors
    ///
    /// Returns [`AvlQueueError::InsertionKeyTooLarge`] if `key >= 2^32`.
    pub fn has_key(&self, key: u64) -> Result<bool> {
        if key > MAX_INSERTION_KEY {
            return Err(AvlQueueError::InsertionKeyTooLarge);
        }
        Ok(matches!(self.search(key), SearchResult::Found(_)))
    }

    /// Returns `true` if inserting the key would move the queue head.
    ///
    /// # Errors
    ///
    /// Returns [`AvlQueueError::InsertionKeyTooLarge`] if `key >= 2^32`.
    pub fn would_update_head(&self, key: u64) -> Result<bool> {
        if key > MAX_INSERTION_KEY {
            return Err(AvlQueueError::InsertionKeyTooLarge);
        }
        Ok(match self.root.head_id() {
            None => true,
            Some(_) => {
                let head_key = self.root.head_key();
                if self.is_ascending() {
                    key < head_key
                } else {
                    key > head_key
                }
            }
        })
    }

    /// Returns `true` if inserting the key would move the queue tail. An
    /// equal key counts: a new entry with the tail's key lands behind it.
    ///
    /// # Errors
    ///
    /// Returns [`AvlQueueError::InsertionKeyTooLarge`] if `key >= 2^32`.
    pub fn would_update_tail(&self, key: u64) -> Result<bool> {
        if key > MAX_INSERTION_KEY {
            return Err(AvlQueueError::InsertionKeyTooLarge);
        }
        Ok(self.root.tail_id().is_none() || self.would_become_tail(key))
    }

    /// Returns `true` if the access key's list node currently holds a
    /// value. Access keys are reissued as slots recycle, so this confirms
    /// the slot is live, not that it still belongs to the original entry.
    pub fn contains_active_list_node_id(&self, access_key: u64) -> bool {
        self.is_active_list_node(access_key::list_node_id(access_key))
    }

    /// Returns the list-node id of the entry following this one in queue
    /// order, or `None` at the end of the queue.
    ///
    /// # Panics
    ///
    /// Panics if the named list node is not active.
    pub fn next_list_node_id_in_access_key(&self, access_key: u64) -> Option<u16> {
        let list_node_id = access_key::list_node_id(access_key);
        assert!(
            self.is_active_list_node(list_node_id),
            "access key names an inactive list node"
        );
        match self.list_nodes.borrow(list_node_id).next_ref() {
            Ref::List(next) => Some(next),
            Ref::Tree(anchor) => {
                let target = if self.is_ascending() {
                    Target::Successor
                } else {
                    Target::Predecessor
                };
                self.traverse(anchor, target)
                    .map(|(_, list_head, _)| list_head)
            }
        }
    }

    /// Returns `true` if the entry is the newest one under its insertion
    /// key.
    ///
    /// # Panics
    ///
    /// Panics if the named list node is not active.
    pub fn is_local_tail(&self, access_key: u64) -> bool {
        let list_node_id = access_key::list_node_id(access_key);
        assert!(
            self.is_active_list_node(list_node_id),
            "access key names an inactive list node"
        );
        matches!(
            self.list_nodes.borrow(list_node_id).next_ref(),
            Ref::Tree(_)
        )
    }

    /// Byte view of the tree-node slot table, in id order. Together with
    /// [`AvlQueue::list_node_bytes`] this is the queue's persisted-state
    /// layout for the packed records.
    pub fn tree_node_bytes(&self) -> &[u8] {
        self.tree_nodes.as_bytes()
    }

    /// Byte view of the list-node slot table, in id order.
    pub fn list_node_bytes(&self) -> &[u8] {
        self.list_nodes.as_bytes()
    }

    /// Iterates over `(insertion_key, &value)` pairs in queue order: the
    /// order repeated [`AvlQueue::pop_head`] calls would drain them.
    ///
    /// # Example
    ///
    /// ```rust
    /// use avlq::{AvlQueue, SortOrder};
    ///
    /// let mut queue = AvlQueue::new(SortOrder::Ascending, 0, 0).unwrap();
    /// queue.insert(2, 'b').unwrap();
    /// queue.insert(1, 'a').unwrap();
    /// queue.insert(2, 'c').unwrap();
    ///
    /// let entries: Vec<_> = queue.iter().collect();
    /// assert_eq!(entries, vec![(1, &'a'), (2, &'b'), (2, &'c')]);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            queue: self,
            current: self.root.head_id(),
            key: self.root.head_key(),
        }
    }

    // Head/tail tracking.

    /// Reconciles the cached queue head and tail with a just-inserted
    /// entry. The head moves only on a strictly better key; the tail also
    /// moves on an equal key, since the new entry lands behind its peers.
    fn insert_check_head_tail(&mut self, key: u64, list_node_id: u16) {
        if self.root.head_id().is_none() {
            self.root.set_head_id(Some(list_node_id));
            self.root.set_head_key(key);
            self.root.set_tail_id(Some(list_node_id));
            self.root.set_tail_key(key);
            return;
        }
        let ascending = self.is_ascending();
        let head_key = self.root.head_key();
        if (ascending && key < head_key) || (!ascending && key > head_key) {
            self.root.set_head_id(Some(list_node_id));
            self.root.set_head_key(key);
        }
        let tail_key = self.root.tail_key();
        if (ascending && key >= tail_key) || (!ascending && key <= tail_key) {
            self.root.set_tail_id(Some(list_node_id));
            self.root.set_tail_key(key);
        }
    }

    /// Removes a list node by id, repairing the queue head/tail and
    /// removing the enclosing tree node if its list empties.
    fn remove_list_node_by_id(&mut self, list_node_id: u16) -> V {
        assert!(
            self.is_active_list_node(list_node_id),
            "access key names an inactive list node"
        );
        let (value, outcome) = self.remove_list_node(list_node_id);
        let was_head = self.root.head_id() == Some(list_node_id);
        let was_tail = self.root.tail_id() == Some(list_node_id);
        match outcome {
            ListOutcome::Interior => {}
            ListOutcome::NewHead { id, .. } => {
                if was_head {
                    self.root.set_head_id(Some(id));
                }
            }
            ListOutcome::NewTail { id, .. } => {
                if was_tail {
                    self.root.set_tail_id(Some(id));
                }
            }
            ListOutcome::Emptied { anchor } => {
                // Head/tail repair traverses the tree, so it must run
                // before the anchor is unlinked.
                if was_head {
                    self.remove_update_head(anchor);
                }
                if was_tail {
                    self.remove_update_tail(anchor);
                }
                self.remove_tree_node(anchor);
            }
        }
        value
    }

    /// Repoints the queue head after the head entry's list emptied, by
    /// walking to the anchor's inorder neighbor on the head side.
    fn remove_update_head(&mut self, anchor: u16) {
        let target = if self.is_ascending() {
            Target::Successor
        } else {
            Target::Predecessor
        };
        match self.traverse(anchor, target) {
            Some((key, list_head, _)) => {
                self.root.set_head_id(Some(list_head));
                self.root.set_head_key(key);
            }
            None => {
                self.root.set_head_id(None);
                self.root.set_head_key(0);
            }
        }
    }

    /// Repoints the queue tail after the tail entry's list emptied.
    fn remove_update_tail(&mut self, anchor: u16) {
        let target = if self.is_ascending() {
            Target::Predecessor
        } else {
            Target::Successor
        };
        match self.traverse(anchor, target) {
            Some((key, _, list_tail)) => {
                self.root.set_tail_id(Some(list_tail));
                self.root.set_tail_key(key);
            }
            None => {
                self.root.set_tail_id(None);
                self.root.set_tail_key(0);
            }
        }
    }

    // Eviction plumbing.

    /// Non-empty queues only: whether an inserted key would land at the
    /// tail.
    fn would_become_tail(&self, key: u64) -> bool {
        let tail_key = self.root.tail_key();
        if self.is_ascending() {
            key >= tail_key
        } else {
            key <= tail_key
        }
    }

    /// Verifies that the insert following a tail eviction cannot fail, so
    /// the eviction never commits ahead of a failed insert.
    fn check_eviction_insert(&self, key: u64) -> Result<()> {
        let needs_tree_node = !matches!(self.search(key), SearchResult::Found(_));
        if needs_tree_node
            && self.root.tree_stack_top().is_none()
            && self.tree_nodes.len() >= MAX_NODES
        {
            let tail_id = self.root.tail_id().expect("eviction requires a tail");
            let frees_tree_node =
                matches!(self.list_nodes.borrow(tail_id).last_ref(), Ref::Tree(_));
            if !frees_tree_node {
                return Err(AvlQueueError::TooManyTreeNodes);
            }
        }
        Ok(())
    }

    fn evict_tail_and_insert(&mut self, key: u64, value: V) -> Result<(u64, u64, V)> {
        self.check_eviction_insert(key)?;
        let (evicted_access_key, evicted_value) = self.remove_tail_entry();
        let access_key = self.insert(key, value)?;
        Ok((access_key, evicted_access_key, evicted_value))
    }

    /// Removes the tail entry, synthesizing its access key from the tail
    /// list node's neighbor links.
    fn remove_tail_entry(&mut self) -> (u64, V) {
        let tail_id = self.root.tail_id().expect("eviction from an empty queue");
        let tail_key = self.root.tail_key();
        let anchor = match self.list_nodes.borrow(tail_id).next_ref() {
            Ref::Tree(id) => id,
            Ref::List(_) => unreachable!("a list tail's virtual next names its tree node"),
        };
        let access_key = access_key::new(anchor, tail_id, self.is_ascending(), tail_key);
        let value = self.remove_list_node_by_id(tail_id);
        (access_key, value)
    }

    // Slot recycling.

    /// Id the next tree-node allocation will use.
    fn next_tree_node_id(&self) -> u16 {
        self.root
            .tree_stack_top()
            .unwrap_or((self.tree_nodes.len() + 1) as u16)
    }

    /// Pops the inactive tree-node stack, or claims a fresh slot. Capacity
    /// is the caller's concern.
    fn allocate_tree_node(&mut self, node: TreeNode) -> u16 {
        match self.root.tree_stack_top() {
            Some(id) => {
                let next = self.tree_nodes.borrow(id).next_inactive();
                self.root.set_tree_stack_top(next);
                *self.tree_nodes.borrow_mut(id) = node;
                id
            }
            None => {
                debug_assert!(self.tree_nodes.len() < MAX_NODES, "tree-node slots exhausted");
                let id = (self.tree_nodes.len() + 1) as u16;
                self.tree_nodes.add(id, node);
                id
            }
        }
    }

    /// Pushes a tree node onto the inactive stack, clearing its payload.
    fn free_tree_node(&mut self, id: u16) {
        let top = self.root.tree_stack_top();
        *self.tree_nodes.borrow_mut(id) = TreeNode::inactive(top);
        self.root.set_tree_stack_top(Some(id));
    }

    /// Pops the inactive list-node stack, or claims a fresh slot, filling
    /// the paired value slot. Capacity is the caller's concern.
    fn allocate_list_node(&mut self, node: ListNode, value: V) -> u16 {
        match self.root.list_stack_top() {
            Some(id) => {
                let next = self.list_nodes.borrow(id).next_inactive();
                self.root.set_list_stack_top(next);
                *self.list_nodes.borrow_mut(id) = node;
                let slot = self.values.borrow_mut(id);
                debug_assert!(slot.is_none(), "inactive list node with a value");
                *slot = Some(value);
                id
            }
            None => {
                debug_assert!(self.list_nodes.len() < MAX_NODES, "list-node slots exhausted");
                let id = (self.list_nodes.len() + 1) as u16;
                self.list_nodes.add(id, node);
                self.values.add(id, Some(value));
                id
            }
        }
    }

    /// Pushes a list node onto the inactive stack, extracting its value.
    fn free_list_node(&mut self, id: u16) -> V {
        let top = self.root.list_stack_top();
        *self.list_nodes.borrow_mut(id) = ListNode::inactive(top);
        self.root.set_list_stack_top(Some(id));
        self.values
            .borrow_mut(id)
            .take()
            .expect("freed list node had a value")
    }

    fn is_active_list_node(&self, list_node_id: u16) -> bool {
        list_node_id != NIL
            && (list_node_id as usize) <= self.values.len()
            && self.values.borrow(list_node_id).is_some()
    }

    // Structural validation.

    /// Validates BST order, recorded heights, and the AVL invariant below
    /// `node_id`, returning the subtree's height-in-direction (height plus
    /// one, zero for an empty subtree), or `None` on any violation.
    fn check_subtree(&self, node_id: Option<u16>, min: Option<u64>, max: Option<u64>) -> Option<u8> {
        let id = match node_id {
            Some(id) => id,
            None => return Some(0),
        };
        let node = self.tree_nodes.borrow(id);
        let key = node.key();
        if min.map_or(false, |bound| key <= bound) || max.map_or(false, |bound| key >= bound) {
            return None;
        }
        let left = self.check_subtree(node.left(), min, Some(key))?;
        let right = self.check_subtree(node.right(), Some(key), max)?;
        if node.left_height() != left || node.right_height() != right {
            return None;
        }
        if left.abs_diff(right) > 1 {
            return None;
        }
        Some(left.max(right) + 1)
    }

    fn count_subtree(&self, node_id: Option<u16>) -> usize {
        match node_id {
            None => 0,
            Some(id) => {
                let node = self.tree_nodes.borrow(id);
                1 + self.count_subtree(node.left()) + self.count_subtree(node.right())
            }
        }
    }
}

impl<V> Container for AvlQueue<V> {
    /// Number of active entries. O(allocated slots).
    fn len(&self) -> usize {
        self.values.iter().filter(|slot| slot.is_some()).count()
    }
}

impl<V> Tree for AvlQueue<V> {
    /// Tree height in levels. O(1).
    fn height(&self) -> usize {
        match self.get_height() {
            None => 0,
            Some(height) => height as usize + 1,
        }
    }

    /// Full structural validation: BST order, recorded-height correctness,
    /// and the AVL invariant. O(n).
    fn is_balanced(&self) -> bool {
        self.check_subtree(self.root.root(), None, None).is_some()
    }

    /// Number of active tree nodes (distinct active keys). O(n).
    fn size(&self) -> usize {
        self.count_subtree(self.root.root())
    }
}

/// Queue-order iterator over `(insertion_key, &value)` pairs. See
/// [`AvlQueue::iter`].
pub struct Iter<'a, V> {
    queue: &'a AvlQueue<V>,
    current: Option<u16>,
    key: u64,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u64, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let item_key = self.key;
        let value = self
            .queue
            .values
            .borrow(id)
            .as_ref()
            .expect("active list node has a value");
        match self.queue.list_nodes.borrow(id).next_ref() {
            Ref::List(next) => self.current = Some(next),
            Ref::Tree(anchor) => {
                let target = if self.queue.is_ascending() {
                    Target::Successor
                } else {
                    Target::Predecessor
                };
                match self.queue.traverse(anchor, target) {
                    Some((key, list_head, _)) => {
                        self.current = Some(list_head);
                        self.key = key;
                    }
                    None => self.current = None,
                }
            }
        }
        Some((item_key, value))
    }
}
