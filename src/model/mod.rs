//! Record types owned by the indexes
//!
//! Each record is owned by exactly one index: books by [`BookIndex`],
//! users by [`UserIndex`], transactions by [`TransactionLog`]. Everything
//! else refers to records by primary key.
//!
//! [`BookIndex`]: crate::books::BookIndex
//! [`UserIndex`]: crate::users::UserIndex
//! [`TransactionLog`]: crate::transactions::TransactionLog

mod book;
mod ids;
mod transaction;
mod user;

pub use book::Book;
pub use ids::IdAllocator;
pub use transaction::{Transaction, TransactionKind, TIMESTAMP_FORMAT};
pub use user::{hash_password, NewUser, User};
