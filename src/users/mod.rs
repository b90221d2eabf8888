//! User index
//!
//! Two chained hash tables over the same user records: one keyed by user
//! ID, one by username. Both tables always have the same capacity and grow
//! together.
//!
//! # Invariants
//!
//! - Every live user has exactly one entry in each table
//! - Both entries resolve to the same record
//! - An insert that pushes count / capacity past the maximum load factor
//!   doubles both tables exactly once

mod chain;
mod index;

pub use chain::polynomial_hash;
pub use index::UserIndex;
