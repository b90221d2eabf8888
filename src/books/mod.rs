//! Book index
//!
//! Ordered, height-balanced index over book records keyed by ISBN. The index
//! is the sole owner of every [`Book`](crate::model::Book) it holds.
//!
//! # Invariants
//!
//! - In-order traversal yields strictly ascending ISBNs
//! - Every node's balance factor is in {-1, 0, 1} after each insert/remove
//! - Inserting an existing ISBN leaves the index untouched

mod tree;

pub use tree::{BookIndex, Iter};
