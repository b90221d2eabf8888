//! Error types for shelfdb
//!
//! Index operations never fail with an error: a missing key is `None` or
//! `false`, a duplicate insert is a no-op. Errors exist only at the edges:
//! configuration loading and catalog operations that must explain a
//! refusal.
//!
//! Error codes:
//! - SHELF_CONFIG_IO
//! - SHELF_CONFIG_INVALID
//! - SHELF_DUPLICATE_ISBN
//! - SHELF_UNKNOWN_ISBN
//! - SHELF_INVALID_QUANTITY
//! - SHELF_BOOK_ON_LOAN
//! - SHELF_UNKNOWN_USER
//! - SHELF_NO_COPIES
//! - SHELF_LOAN_STATE
//! - SHELF_USER_HAS_LOANS

use std::fmt;

use thiserror::Error;

/// Stable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Configuration file could not be read
    ShelfConfigIo,
    /// Configuration file parsed but failed validation
    ShelfConfigInvalid,
    /// A book with this ISBN is already cataloged
    ShelfDuplicateIsbn,
    /// No book with this ISBN is cataloged
    ShelfUnknownIsbn,
    /// Quantity would drop below the copies currently lent out
    ShelfInvalidQuantity,
    /// Book cannot be removed while copies are lent out
    ShelfBookOnLoan,
    /// No user with this ID is registered
    ShelfUnknownUser,
    /// Every copy is lent out
    ShelfNoCopies,
    /// Check-out of a held book, or check-in of one not held
    ShelfLoanState,
    /// User cannot be removed while holding books
    ShelfUserHasLoans,
}

impl ErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::ShelfConfigIo => "SHELF_CONFIG_IO",
            ErrorCode::ShelfConfigInvalid => "SHELF_CONFIG_INVALID",
            ErrorCode::ShelfDuplicateIsbn => "SHELF_DUPLICATE_ISBN",
            ErrorCode::ShelfUnknownIsbn => "SHELF_UNKNOWN_ISBN",
            ErrorCode::ShelfInvalidQuantity => "SHELF_INVALID_QUANTITY",
            ErrorCode::ShelfBookOnLoan => "SHELF_BOOK_ON_LOAN",
            ErrorCode::ShelfUnknownUser => "SHELF_UNKNOWN_USER",
            ErrorCode::ShelfNoCopies => "SHELF_NO_COPIES",
            ErrorCode::ShelfLoanState => "SHELF_LOAN_STATE",
            ErrorCode::ShelfUserHasLoans => "SHELF_USER_HAS_LOANS",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// shelfdb error
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a configuration file
    #[error("[SHELF_CONFIG_IO] failed to read config: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Configuration rejected
    #[error("[SHELF_CONFIG_INVALID] {0}")]
    ConfigInvalid(String),

    /// Insert of an ISBN that already exists
    #[error("[SHELF_DUPLICATE_ISBN] book {0} already exists")]
    DuplicateIsbn(String),

    /// Lookup of an ISBN that does not exist
    #[error("[SHELF_UNKNOWN_ISBN] book {0} not found")]
    UnknownIsbn(String),

    /// Quantity below the number of lent copies
    #[error("[SHELF_INVALID_QUANTITY] book {isbn}: quantity {requested} is below {lent} lent copies")]
    InvalidQuantity {
        /// Book being updated
        isbn: String,
        /// Requested total quantity
        requested: u32,
        /// Copies currently lent out
        lent: u32,
    },

    /// Removal of a book with copies still lent out
    #[error("[SHELF_BOOK_ON_LOAN] book {isbn} has {lent} copies lent out")]
    BookOnLoan {
        /// Book being removed
        isbn: String,
        /// Copies currently lent out
        lent: u32,
    },

    /// Lookup of a user ID that does not exist
    #[error("[SHELF_UNKNOWN_USER] user {0} not found")]
    UnknownUser(String),

    /// Check-out with no copy on the shelf
    #[error("[SHELF_NO_COPIES] no copies of {0} available")]
    NoCopies(String),

    /// Check-out of a book the user already holds, or check-in of one
    /// they do not
    #[error("[SHELF_LOAN_STATE] user {user_id} {state} book {isbn}")]
    LoanState {
        user_id: String,
        isbn: String,
        /// "already holds" or "does not hold"
        state: &'static str,
    },

    /// Removal of a user who still holds books
    #[error("[SHELF_USER_HAS_LOANS] user {user_id} still holds {borrowed} books")]
    UserHasLoans {
        /// User being removed
        user_id: String,
        /// Books the user holds
        borrowed: usize,
    },
}

impl Error {
    /// Create a config validation error
    pub fn config_invalid(reason: impl Into<String>) -> Self {
        Error::ConfigInvalid(reason.into())
    }

    /// Returns the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigIo(_) => ErrorCode::ShelfConfigIo,
            Error::ConfigInvalid(_) => ErrorCode::ShelfConfigInvalid,
            Error::DuplicateIsbn(_) => ErrorCode::ShelfDuplicateIsbn,
            Error::UnknownIsbn(_) => ErrorCode::ShelfUnknownIsbn,
            Error::InvalidQuantity { .. } => ErrorCode::ShelfInvalidQuantity,
            Error::BookOnLoan { .. } => ErrorCode::ShelfBookOnLoan,
            Error::UnknownUser(_) => ErrorCode::ShelfUnknownUser,
            Error::NoCopies(_) => ErrorCode::ShelfNoCopies,
            Error::LoanState { .. } => ErrorCode::ShelfLoanState,
            Error::UserHasLoans { .. } => ErrorCode::ShelfUserHasLoans,
        }
    }
}

/// Result type for shelfdb operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorCode::ShelfConfigIo.code(), "SHELF_CONFIG_IO");
        assert_eq!(ErrorCode::ShelfConfigInvalid.code(), "SHELF_CONFIG_INVALID");
        assert_eq!(ErrorCode::ShelfDuplicateIsbn.code(), "SHELF_DUPLICATE_ISBN");
        assert_eq!(ErrorCode::ShelfUnknownIsbn.code(), "SHELF_UNKNOWN_ISBN");
        assert_eq!(ErrorCode::ShelfInvalidQuantity.code(), "SHELF_INVALID_QUANTITY");
        assert_eq!(ErrorCode::ShelfBookOnLoan.code(), "SHELF_BOOK_ON_LOAN");
        assert_eq!(ErrorCode::ShelfUnknownUser.code(), "SHELF_UNKNOWN_USER");
        assert_eq!(ErrorCode::ShelfNoCopies.code(), "SHELF_NO_COPIES");
        assert_eq!(ErrorCode::ShelfLoanState.code(), "SHELF_LOAN_STATE");
        assert_eq!(ErrorCode::ShelfUserHasLoans.code(), "SHELF_USER_HAS_LOANS");
    }

    #[test]
    fn test_display_carries_code() {
        let err = Error::UnknownIsbn("978-0".to_string());
        assert_eq!(err.code(), ErrorCode::ShelfUnknownIsbn);
        let display = format!("{}", err);
        assert!(display.contains("SHELF_UNKNOWN_ISBN"));
        assert!(display.contains("978-0"));
    }

    #[test]
    fn test_invalid_quantity_display() {
        let err = Error::InvalidQuantity {
            isbn: "X".to_string(),
            requested: 1,
            lent: 3,
        };
        assert_eq!(err.code().code(), "SHELF_INVALID_QUANTITY");
        assert!(err.to_string().contains("below 3 lent copies"));
    }
}
