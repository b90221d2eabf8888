//! shelfdb - in-memory record store for a lending library
//!
//! Four cooperating indexes over books, users and circulation records:
//!
//! - [`BookIndex`]: AVL tree keyed by ISBN, sole owner of book records
//! - [`UserIndex`]: two chained hash tables (by ID, by username) over one
//!   set of user records, doubling past a maximum load factor
//! - [`TransactionLog`]: doubly linked, append-only log with per-user and
//!   per-ISBN lookups
//! - [`SearchIndex`]: exact-match title/author buckets derived from the
//!   book index
//!
//! [`Catalog`] owns one of each and keeps the search index consistent with
//! the books. Persistence, parsing, authentication policy and presentation
//! live outside this crate.

pub mod books;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod model;
pub mod observability;
pub mod search;
pub mod transactions;
pub mod users;

pub use books::BookIndex;
pub use catalog::{Catalog, CatalogStats, SearchField};
pub use config::StoreConfig;
pub use errors::{Error, ErrorCode, Result};
pub use model::{Book, NewUser, Transaction, TransactionKind, User};
pub use search::{BookSource, SearchIndex};
pub use transactions::TransactionLog;
pub use users::UserIndex;
