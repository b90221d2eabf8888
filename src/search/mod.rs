//! Search index over book titles and authors
//!
//! Matches are exact: a term hits a bucket only when its normalized form
//! equals a book's whole normalized title/author or one of its words. There
//! is no prefix or substring matching.
//!
//! # Design Principles
//!
//! - Derived state: rebuilt from the book index, never the source of truth
//! - Buckets hold ISBNs, resolved through a [`BookSource`] on every lookup
//! - Deterministic: BTreeMap buckets, results in ascending ISBN order

mod buckets;
mod engine;
mod text;

pub use buckets::TokenBuckets;
pub use engine::{BookSource, SearchIndex};
pub use text::{normalize, tokenize};
