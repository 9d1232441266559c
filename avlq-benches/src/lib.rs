//! Benchmark crate for the AVL-queue. See `benches/avl_queue.rs`.
