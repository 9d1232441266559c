//! Error types for AVL-queue operations.
//!
//! The variants form a closed set with stable numeric codes, so a host
//! environment that signals errors numerically can map them one-to-one.

use thiserror::Error;

/// The main error type for AVL-queue operations.
///
/// Discriminants are the stable numeric codes used when embedding in a host
/// that handles errors as numbers; see [`AvlQueueError::code`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AvlQueueError {
    /// Allocation of a tree node was attempted with all 16,383 tree-node
    /// slots active.
    #[error("too many tree nodes")]
    TooManyTreeNodes = 0,

    /// Allocation of a list node was attempted with all 16,383 list-node
    /// slots active.
    #[error("too many list nodes")]
    TooManyListNodes = 1,

    /// An insertion key wider than 32 bits was provided.
    #[error("insertion key too large")]
    InsertionKeyTooLarge = 2,

    /// Eviction was requested on an empty queue.
    #[error("attempted eviction from empty queue")]
    EvictEmpty = 3,

    /// Eviction was requested for an entry that would itself become the
    /// queue tail.
    #[error("new entry would become the evictee")]
    EvictNewTail = 4,

    /// A critical height above the maximum possible tree height was
    /// provided.
    #[error("invalid critical height")]
    InvalidHeight = 5,
}

impl AvlQueueError {
    /// Returns the stable numeric code for this error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use avlq_core::AvlQueueError;
    ///
    /// assert_eq!(AvlQueueError::TooManyTreeNodes.code(), 0);
    /// assert_eq!(AvlQueueError::InvalidHeight.code(), 5);
    /// ```
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// A specialized Result type for AVL-queue operations.
pub type Result<T> = core::result::Result<T, AvlQueueError>;
