//! Catalog Scenario Tests
//!
//! End-to-end circulation through the catalog:
//! - Check out and check in keep book counts, borrowed sets and the log
//!   in agreement
//! - Failed operations leave every index unchanged
//! - Configuration drives capacity and recent windows

use shelfdb::errors::ErrorCode;
use shelfdb::model::NewUser;
use shelfdb::{Book, Catalog, StoreConfig, TransactionKind};

// =============================================================================
// Helper Functions
// =============================================================================

fn member(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        password: format!("{}-pw", username),
        full_name: username.to_uppercase(),
        email: format!("{}@library.test", username),
        phone: "555-0199".to_string(),
    }
}

fn library() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.load_books(vec![
        Book::new("111", "Dune", "Frank Herbert", 2),
        Book::new("222", "Neuromancer", "William Gibson", 1),
        Book::new("333", "Hyperion", "Dan Simmons", 1),
    ]);
    catalog.register_user(member("ana")).unwrap();
    catalog.register_user(member("ben")).unwrap();
    catalog
}

/// Lent copies per ISBN must equal the number of users holding it.
fn assert_loans_agree(catalog: &Catalog) {
    for book in catalog.books() {
        let holders = catalog
            .users()
            .get_all()
            .iter()
            .filter(|u| u.has_borrowed(book.isbn()))
            .count();
        assert_eq!(book.lent_copies() as usize, holders, "isbn {}", book.isbn());
    }
}

// =============================================================================
// Circulation Scenarios
// =============================================================================

#[test]
fn test_full_circulation_cycle() {
    let mut catalog = library();

    catalog.check_out("U001", "111").unwrap();
    catalog.check_out("U002", "111").unwrap();
    catalog.check_out("U001", "222").unwrap();
    assert_loans_agree(&catalog);

    let dune = catalog.books().search("111").unwrap();
    assert_eq!(dune.available_copies(), 0);
    assert!(!dune.is_available());

    catalog.check_in("U002", "111").unwrap();
    catalog.check_in("U001", "222").unwrap();
    assert_loans_agree(&catalog);

    let kinds: Vec<TransactionKind> = catalog.transactions().iter().map(|t| t.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            TransactionKind::Borrow,
            TransactionKind::Borrow,
            TransactionKind::Borrow,
            TransactionKind::Return,
            TransactionKind::Return,
        ]
    );
    assert_eq!(catalog.transactions().get_by_user_id("U001").len(), 3);
    assert_eq!(catalog.recent_transactions()[0].isbn(), "222");
    catalog.validate().unwrap();
}

#[test]
fn test_failed_operations_change_nothing() {
    let mut catalog = library();
    catalog.check_out("U001", "222").unwrap();
    let before = catalog.stats();

    let failures = [
        catalog.check_out("U002", "222").unwrap_err().code(),
        catalog.check_out("U001", "222").unwrap_err().code(),
        catalog.check_in("U002", "333").unwrap_err().code(),
        catalog.check_out("U404", "333").unwrap_err().code(),
        catalog.check_in("U001", "999").unwrap_err().code(),
        catalog.remove_book("222").unwrap_err().code(),
        catalog.update_book_quantity("222", 0).unwrap_err().code(),
    ];
    assert_eq!(
        failures,
        [
            ErrorCode::ShelfNoCopies,
            ErrorCode::ShelfLoanState,
            ErrorCode::ShelfLoanState,
            ErrorCode::ShelfUnknownUser,
            ErrorCode::ShelfUnknownIsbn,
            ErrorCode::ShelfBookOnLoan,
            ErrorCode::ShelfInvalidQuantity,
        ]
    );
    assert_eq!(catalog.stats(), before);
    assert_loans_agree(&catalog);
}

#[test]
fn test_returned_book_can_be_removed() {
    let mut catalog = library();
    catalog.check_out("U002", "333").unwrap();
    catalog.check_in("U002", "333").unwrap();

    let removed = catalog.remove_book("333").unwrap();
    assert_eq!(removed.title(), "Hyperion");
    // history outlives the book
    assert_eq!(catalog.transactions().get_by_isbn("333").len(), 2);
    catalog.validate().unwrap();
}

/// A borrower cannot be removed, so their loan can always be returned.
#[test]
fn test_borrower_removal_keeps_book_returnable() {
    let mut catalog = library();
    catalog.check_out("U001", "111").unwrap();

    assert_eq!(
        catalog.remove_user("U001").unwrap_err().code(),
        ErrorCode::ShelfUserHasLoans
    );
    assert_eq!(
        catalog.remove_book("111").unwrap_err().code(),
        ErrorCode::ShelfBookOnLoan
    );

    catalog.check_in("U001", "111").unwrap();
    catalog.remove_user("U001").unwrap();
    catalog.remove_book("111").unwrap();
    assert_loans_agree(&catalog);
    catalog.validate().unwrap();
}

// =============================================================================
// Configuration Scenarios
// =============================================================================

#[test]
fn test_config_from_file_drives_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shelf.json");
    std::fs::write(
        &path,
        r#"{ "initial_user_capacity": 4, "recent_transactions": 1, "log_level": "ERROR" }"#,
    )
    .unwrap();

    let config = StoreConfig::load(&path).unwrap();
    let mut catalog = Catalog::with_config(config);
    assert_eq!(catalog.users().capacity(), 4);

    catalog.load_books(vec![Book::new("111", "Dune", "Frank Herbert", 3)]);
    for name in ["a", "b", "c", "d"] {
        catalog.register_user(member(name)).unwrap();
    }
    assert_eq!(catalog.users().capacity(), 8);

    catalog.check_out("U001", "111").unwrap();
    catalog.check_out("U002", "111").unwrap();
    let recent = catalog.recent_transactions();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].user_id(), "U002");
}

#[test]
fn test_clear_and_reload() {
    let mut catalog = library();
    catalog.check_out("U001", "111").unwrap();
    catalog.clear();
    catalog.reset_ids();

    assert_eq!(catalog.stats().books, 0);
    let loaded = catalog.load_books(vec![Book::new("444", "Solaris", "Stanislaw Lem", 1)]);
    assert_eq!(loaded, 1);
    assert_eq!(
        catalog.register_user(member("cleo")).unwrap().user_id(),
        "U001"
    );
    catalog.validate().unwrap();
}
