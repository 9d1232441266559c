//! # AVL-queue
//!
//! A hybrid height-balanced tree / FIFO queue: entries are ordered by a
//! 32-bit insertion key and, among equal keys, by insertion order, with
//! O(log n) insertion, removal, and random access anywhere in the
//! structure.
//!
//! The design targets storage-dominated hosts: node identifiers are 14-bit
//! and recycled through inactive-node stacks instead of being allocated and
//! freed, and every structural field is bit-packed into fixed-width words
//! updated by masked read-modify-write (see [`AvlQueue`] and
//! [`access_key`]).
//!
//! ## Modules
//!
//! - [`queue`] - The [`AvlQueue`] itself
//! - [`access_key`] - Codec for the opaque 64-bit entry handles
//!
//! ## Example
//!
//! ```rust
//! use avlq::{AvlQueue, SortOrder};
//!
//! let mut queue = AvlQueue::new(SortOrder::Ascending, 0, 0).unwrap();
//! queue.insert(2, "b").unwrap();
//! let access_key = queue.insert(1, "a").unwrap();
//!
//! assert_eq!(queue.borrow(access_key), &"a");
//! assert_eq!(queue.pop_head(), "a");
//! assert_eq!(queue.pop_head(), "b");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod access_key;
mod bits;
mod layout;
pub mod queue;
mod slots;

pub use avlq_core::{AvlQueueError, Container, Result, Tree};
pub use queue::{AvlQueue, EvictionOutcome, Iter, SortOrder};
