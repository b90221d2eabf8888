//! Observability for shelfdb
//!
//! Structured JSON-line logging of structural events (table growth, index
//! rebuilds, bulk loads). Logging never changes index state.

mod logger;

pub use logger::{Logger, Severity};
