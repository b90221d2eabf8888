//! Transaction log
//!
//! Doubly linked, append-only log of circulation records with two derived
//! lookups: by user ID and by ISBN.
//!
//! # Invariants
//!
//! - Forward traversal visits records oldest-first, backward newest-first
//! - Each record is listed exactly once under its own user ID and ISBN
//! - Per-key sequences keep insertion order

mod list;

pub use list::{Iter, TransactionLog};
