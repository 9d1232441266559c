//! # AVL-queue core
//!
//! Core error type and traits for the AVL-queue workspace.
//!
//! This crate provides the foundational error type and the container/tree
//! trait seam used by the `avlq` crate.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod error;
pub mod traits;

pub use error::{AvlQueueError, Result};
pub use traits::*;
