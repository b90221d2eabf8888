//! Catalog context
//!
//! Owns one of each index and keeps the derived search index in step with
//! the book index. A `Catalog` is built once and handed to whatever layer
//! drives it; nothing in the crate is process-global.
//!
//! The catalog applies structural rules only (a book must exist to be lent,
//! lent copies cannot vanish). Borrow limits, account status and access
//! control belong to the caller.
//!
//! All methods take `&self` or `&mut self`; a caller sharing a catalog
//! across threads must wrap it in its own lock.

use serde::Serialize;

use crate::books::BookIndex;
use crate::config::StoreConfig;
use crate::errors::{Error, Result};
use crate::model::{Book, NewUser, Transaction, TransactionKind, User};
use crate::observability::Logger;
use crate::search::SearchIndex;
use crate::transactions::TransactionLog;
use crate::users::UserIndex;

/// Which field a catalog search matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Author,
    Isbn,
    /// Title or author
    Keyword,
}

/// Point-in-time counters for the whole catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    /// Distinct ISBNs
    pub books: usize,
    /// ISBNs with at least one copy on the shelf
    pub available_books: usize,
    /// Copies across all ISBNs
    pub total_copies: u64,
    /// Copies currently lent out
    pub lent_copies: u64,
    pub users: usize,
    pub transactions: usize,
    pub book_tree_height: u32,
    pub book_rotations: u64,
    pub user_capacity: usize,
    pub user_load_factor: f64,
    pub user_resizes: u64,
    pub search_keys: usize,
}

/// The record store: books, users, transactions and the search index
#[derive(Debug)]
pub struct Catalog {
    config: StoreConfig,
    books: BookIndex,
    users: UserIndex,
    transactions: TransactionLog,
    search: SearchIndex,
    logger: Logger,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::with_config(StoreConfig::default())
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StoreConfig) -> Self {
        let logger = config.logger();
        Self {
            books: BookIndex::new(),
            users: UserIndex::from_config(&config),
            transactions: TransactionLog::new(),
            search: SearchIndex::with_logger(logger),
            logger,
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn books(&self) -> &BookIndex {
        &self.books
    }

    pub fn users(&self) -> &UserIndex {
        &self.users
    }

    /// Users have no derived index to keep in step. Removing through this
    /// skips the loan check of [`remove_user`](Self::remove_user).
    pub fn users_mut(&mut self) -> &mut UserIndex {
        &mut self.users
    }

    pub fn transactions(&self) -> &TransactionLog {
        &self.transactions
    }

    pub fn transactions_mut(&mut self) -> &mut TransactionLog {
        &mut self.transactions
    }

    pub fn search(&self) -> &SearchIndex {
        &self.search
    }

    /// Mutable access to a book's copy counts
    pub fn book_mut(&mut self, isbn: &str) -> Option<&mut Book> {
        self.books.search_mut(isbn)
    }

    // ==================
    // Books
    // ==================

    /// Catalog a new book and index its title and author
    pub fn add_book(&mut self, book: Book) -> Result<()> {
        if self.books.contains(book.isbn()) {
            return Err(Error::DuplicateIsbn(book.isbn().to_owned()));
        }
        self.search.add_book_to_index(&book);
        self.books.insert(book);
        Ok(())
    }

    /// Remove a book that has no copies lent out
    pub fn remove_book(&mut self, isbn: &str) -> Result<Book> {
        let book = self
            .books
            .search(isbn)
            .ok_or_else(|| Error::UnknownIsbn(isbn.to_owned()))?;
        if book.lent_copies() > 0 {
            return Err(Error::BookOnLoan {
                isbn: isbn.to_owned(),
                lent: book.lent_copies(),
            });
        }
        self.search.remove_book_from_index(book);
        self.books
            .take(isbn)
            .ok_or_else(|| Error::UnknownIsbn(isbn.to_owned()))
    }

    /// Change a book's title and author, re-indexing it
    pub fn update_book_details(&mut self, isbn: &str, title: &str, author: &str) -> Result<()> {
        let book = self
            .books
            .search_mut(isbn)
            .ok_or_else(|| Error::UnknownIsbn(isbn.to_owned()))?;
        self.search.remove_book_from_index(book);
        book.set_details(title, author);
        self.search.add_book_to_index(book);
        Ok(())
    }

    /// Change the number of copies owned, keeping lent copies lent
    pub fn update_book_quantity(&mut self, isbn: &str, quantity: u32) -> Result<()> {
        let book = self
            .books
            .search_mut(isbn)
            .ok_or_else(|| Error::UnknownIsbn(isbn.to_owned()))?;
        let lent = book.lent_copies();
        if quantity < lent {
            return Err(Error::InvalidQuantity {
                isbn: isbn.to_owned(),
                requested: quantity,
                lent,
            });
        }
        book.set_quantity(quantity);
        book.set_available_copies(quantity - lent);
        Ok(())
    }

    /// Search one field; an ISBN search yields at most one book
    pub fn search_books(&self, query: &str, field: SearchField) -> Vec<&Book> {
        match field {
            SearchField::Title => self.search.search_by_title(&self.books, query),
            SearchField::Author => self.search.search_by_author(&self.books, query),
            SearchField::Keyword => self.search.search_by_keyword(&self.books, query),
            SearchField::Isbn => self
                .search
                .search_by_isbn(&self.books, query)
                .into_iter()
                .collect(),
        }
    }

    /// Books with a copy on the shelf, ascending ISBN
    pub fn available_books(&self) -> Vec<&Book> {
        self.search.search_available_books(&self.books)
    }

    /// Re-derive the search index from the book index
    pub fn rebuild_search(&mut self) {
        self.search.rebuild_indices(&self.books);
    }

    // ==================
    // Users
    // ==================

    /// Register a user under the next free ID. `None` if the username is taken.
    pub fn register_user(&mut self, new_user: NewUser) -> Option<&User> {
        self.users.register(new_user)
    }

    /// Remove a user who holds no books
    pub fn remove_user(&mut self, user_id: &str) -> Result<User> {
        let user = self
            .users
            .search_by_id(user_id)
            .ok_or_else(|| Error::UnknownUser(user_id.to_owned()))?;
        if user.borrowed_count() > 0 {
            return Err(Error::UserHasLoans {
                user_id: user_id.to_owned(),
                borrowed: user.borrowed_count(),
            });
        }
        self.users
            .take(user_id)
            .ok_or_else(|| Error::UnknownUser(user_id.to_owned()))
    }

    /// Mark an account inactive. Loans and history are kept.
    pub fn deactivate_user(&mut self, user_id: &str) -> Result<()> {
        self.set_user_active(user_id, false)
    }

    pub fn activate_user(&mut self, user_id: &str) -> Result<()> {
        self.set_user_active(user_id, true)
    }

    // ==================
    // Circulation
    // ==================

    /// Lend one copy of `isbn` to `user_id` and log it.
    ///
    /// Updates the book's available copies, the user's borrowed set and the
    /// transaction log together, or none of them.
    pub fn check_out(&mut self, user_id: &str, isbn: &str) -> Result<&Transaction> {
        let user = self
            .users
            .search_by_id_mut(user_id)
            .ok_or_else(|| Error::UnknownUser(user_id.to_owned()))?;
        let book = self
            .books
            .search_mut(isbn)
            .ok_or_else(|| Error::UnknownIsbn(isbn.to_owned()))?;

        if user.has_borrowed(isbn) {
            return Err(Error::LoanState {
                user_id: user_id.to_owned(),
                isbn: isbn.to_owned(),
                state: "already holds",
            });
        }
        if !book.checkout() {
            return Err(Error::NoCopies(isbn.to_owned()));
        }
        user.add_borrowed(isbn);

        Ok(self.transactions.record(
            user_id,
            isbn,
            TransactionKind::Borrow,
            user.username(),
            book.title(),
        ))
    }

    /// Take back one copy of `isbn` from `user_id` and log it.
    pub fn check_in(&mut self, user_id: &str, isbn: &str) -> Result<&Transaction> {
        let user = self
            .users
            .search_by_id_mut(user_id)
            .ok_or_else(|| Error::UnknownUser(user_id.to_owned()))?;
        let book = self
            .books
            .search_mut(isbn)
            .ok_or_else(|| Error::UnknownIsbn(isbn.to_owned()))?;

        if !user.has_borrowed(isbn) {
            return Err(Error::LoanState {
                user_id: user_id.to_owned(),
                isbn: isbn.to_owned(),
                state: "does not hold",
            });
        }
        user.remove_borrowed(isbn);
        book.checkin();

        Ok(self.transactions.record(
            user_id,
            isbn,
            TransactionKind::Return,
            user.username(),
            book.title(),
        ))
    }

    /// The configured number of most recent transactions, newest first
    pub fn recent_transactions(&self) -> Vec<&Transaction> {
        self.transactions.get_recent(self.config.recent_transactions)
    }

    // ==================
    // Bulk load
    // ==================

    /// Insert parsed books, then rebuild the search index once.
    ///
    /// Duplicate ISBNs are skipped. Returns how many were inserted.
    pub fn load_books(&mut self, books: impl IntoIterator<Item = Book>) -> usize {
        let loaded = books
            .into_iter()
            .map(|book| self.books.insert(book))
            .filter(|&inserted| inserted)
            .count();
        self.rebuild_search();
        self.log_loaded("books", loaded);
        loaded
    }

    /// Insert parsed users. Users whose ID or username is taken are skipped.
    pub fn load_users(&mut self, users: impl IntoIterator<Item = User>) -> usize {
        let loaded = users
            .into_iter()
            .map(|user| self.users.insert(user))
            .filter(|&inserted| inserted)
            .count();
        self.log_loaded("users", loaded);
        loaded
    }

    /// Append parsed transactions in the order given
    pub fn load_transactions(&mut self, transactions: impl IntoIterator<Item = Transaction>) -> usize {
        let mut loaded = 0;
        for transaction in transactions {
            self.transactions.append(transaction);
            loaded += 1;
        }
        self.log_loaded("transactions", loaded);
        loaded
    }

    // ==================
    // Whole-catalog
    // ==================

    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats {
            books: self.books.count(),
            available_books: 0,
            total_copies: 0,
            lent_copies: 0,
            users: self.users.count(),
            transactions: self.transactions.count(),
            book_tree_height: self.books.height(),
            book_rotations: self.books.rotations(),
            user_capacity: self.users.capacity(),
            user_load_factor: self.users.load_factor(),
            user_resizes: self.users.resize_count(),
            search_keys: self.search.bucket_count(),
        };
        for book in &self.books {
            if book.is_available() {
                stats.available_books += 1;
            }
            stats.total_copies += u64::from(book.quantity());
            stats.lent_copies += u64::from(book.lent_copies());
        }
        stats
    }

    /// Drop every record from every index. ID numbering continues.
    pub fn clear(&mut self) {
        let dropped = (
            self.books.count().to_string(),
            self.users.count().to_string(),
            self.transactions.count().to_string(),
        );
        self.search.clear();
        self.books.clear();
        self.users.clear();
        self.transactions.clear();

        self.logger.info(
            "CATALOG_CLEARED",
            &[
                ("books", &dropped.0),
                ("transactions", &dropped.2),
                ("users", &dropped.1),
            ],
        );
    }

    /// Restart user and transaction numbering
    pub fn reset_ids(&mut self) {
        self.users.reset_ids();
        self.transactions.reset_ids();
    }

    /// Validate every index, and that the search index holds exactly the
    /// buckets the cataloged books derive.
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.books.validate()?;
        self.users.validate()?;
        self.transactions.validate()?;

        let mut expected = SearchIndex::new();
        for book in &self.books {
            expected.add_book_to_index(book);
        }
        if !expected.same_buckets(&self.search) {
            return Err(format!(
                "search index ({} keys, {} entries) differs from the one books derive ({} keys, {} entries)",
                self.search.bucket_count(),
                self.search.entry_count(),
                expected.bucket_count(),
                expected.entry_count()
            ));
        }
        Ok(())
    }

    fn set_user_active(&mut self, user_id: &str, active: bool) -> Result<()> {
        let user = self
            .users
            .search_by_id_mut(user_id)
            .ok_or_else(|| Error::UnknownUser(user_id.to_owned()))?;
        user.set_active(active);
        Ok(())
    }

    fn log_loaded(&self, kind: &str, loaded: usize) {
        self.logger.info(
            "CATALOG_BULK_LOADED",
            &[("kind", kind), ("loaded", &loaded.to_string())],
        );
    }
}
