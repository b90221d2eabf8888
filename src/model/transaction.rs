//! Transaction record

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Timestamp layout used for display and for stored records
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Direction of a circulation event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Borrow,
    Return,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Borrow => "BORROW",
            TransactionKind::Return => "RETURN",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BORROW" => Ok(TransactionKind::Borrow),
            "RETURN" => Ok(TransactionKind::Return),
            other => Err(format!("unknown transaction kind '{}'", other)),
        }
    }
}

/// An immutable circulation record.
///
/// `user_name` and `book_title` are copies taken when the record was made;
/// they do not follow later edits to the user or book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    transaction_id: String,
    user_id: String,
    isbn: String,
    kind: TransactionKind,
    timestamp: NaiveDateTime,
    user_name: String,
    book_title: String,
}

impl Transaction {
    pub fn new(
        transaction_id: impl Into<String>,
        user_id: impl Into<String>,
        isbn: impl Into<String>,
        kind: TransactionKind,
        timestamp: NaiveDateTime,
        user_name: impl Into<String>,
        book_title: impl Into<String>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            user_id: user_id.into(),
            isbn: isbn.into(),
            kind,
            timestamp,
            user_name: user_name.into(),
            book_title: book_title.into(),
        }
    }

    /// Current local time truncated to whole seconds
    pub fn now() -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }

    /// Parse a timestamp in [`TIMESTAMP_FORMAT`]
    pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok()
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Timestamp in [`TIMESTAMP_FORMAT`]
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn book_title(&self) -> &str {
        &self.book_title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [TransactionKind::Borrow, TransactionKind::Return] {
            assert_eq!(kind.to_string().parse::<TransactionKind>(), Ok(kind));
        }
        assert!("LEND".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn test_kind_serde_uppercase() {
        let json = serde_json::to_string(&TransactionKind::Borrow).unwrap();
        assert_eq!(json, "\"BORROW\"");
    }

    #[test]
    fn test_timestamp_format() {
        let ts = Transaction::parse_timestamp("2024-03-09 07:05:01").unwrap();
        let tx = Transaction::new("T0001", "U001", "978-1", TransactionKind::Borrow, ts, "alice", "Dune");
        assert_eq!(tx.timestamp_string(), "2024-03-09 07:05:01");
        assert!(Transaction::parse_timestamp("09/03/2024").is_none());
    }

    #[test]
    fn test_now_has_second_precision() {
        let now = Transaction::now();
        assert_eq!(now.and_utc().timestamp_subsec_nanos(), 0);
    }
}
