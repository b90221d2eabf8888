//! Book record

use serde::{Deserialize, Serialize};

/// A cataloged title with its copy counts.
///
/// Invariant: `available_copies <= quantity`. The ISBN never changes after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    isbn: String,
    title: String,
    author: String,
    quantity: u32,
    available_copies: u32,
}

impl Book {
    /// New book with every copy on the shelf
    pub fn new(
        isbn: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
            author: author.into(),
            quantity,
            available_copies: quantity,
        }
    }

    /// Rebuild a book from stored counts.
    ///
    /// An out-of-range `available_copies` is clamped to `quantity`.
    pub fn restore(
        isbn: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        quantity: u32,
        available_copies: u32,
    ) -> Self {
        let mut book = Self::new(isbn, title, author, quantity);
        book.available_copies = available_copies.min(quantity);
        book
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn available_copies(&self) -> u32 {
        self.available_copies
    }

    /// Copies currently lent out
    pub fn lent_copies(&self) -> u32 {
        self.quantity.saturating_sub(self.available_copies)
    }

    /// True when at least one copy is on the shelf
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    /// Set the total quantity, clamping available copies down to it
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        if self.available_copies > quantity {
            self.available_copies = quantity;
        }
    }

    /// Set available copies. Ignored (returns false) above `quantity`.
    pub fn set_available_copies(&mut self, copies: u32) -> bool {
        if copies > self.quantity {
            return false;
        }
        self.available_copies = copies;
        true
    }

    /// Take one copy off the shelf
    pub fn checkout(&mut self) -> bool {
        if self.available_copies == 0 {
            return false;
        }
        self.available_copies -= 1;
        true
    }

    /// Put one copy back on the shelf
    pub fn checkin(&mut self) -> bool {
        if self.available_copies >= self.quantity {
            return false;
        }
        self.available_copies += 1;
        true
    }

    /// Text fields are indexed by the search index; callers must re-index.
    pub(crate) fn set_details(&mut self, title: impl Into<String>, author: impl Into<String>) {
        self.title = title.into();
        self.author = author.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_book_fully_available() {
        let book = Book::new("978-1", "Dune", "Frank Herbert", 3);
        assert_eq!(book.available_copies(), 3);
        assert_eq!(book.lent_copies(), 0);
        assert!(book.is_available());
    }

    #[test]
    fn test_checkout_and_checkin_bounds() {
        let mut book = Book::new("978-1", "Dune", "Frank Herbert", 1);
        assert!(book.checkout());
        assert!(!book.checkout());
        assert!(!book.is_available());
        assert!(book.checkin());
        assert!(!book.checkin());
        assert_eq!(book.available_copies(), 1);
    }

    #[test]
    fn test_set_quantity_clamps_available() {
        let mut book = Book::new("978-1", "Dune", "Frank Herbert", 5);
        book.set_quantity(2);
        assert_eq!(book.available_copies(), 2);

        book.set_quantity(4);
        assert_eq!(book.available_copies(), 2);
    }

    #[test]
    fn test_set_available_rejects_overflow() {
        let mut book = Book::new("978-1", "Dune", "Frank Herbert", 2);
        assert!(!book.set_available_copies(3));
        assert_eq!(book.available_copies(), 2);
        assert!(book.set_available_copies(0));
        assert_eq!(book.available_copies(), 0);
    }

    #[test]
    fn test_restore_clamps() {
        let book = Book::restore("978-1", "Dune", "Frank Herbert", 2, 9);
        assert_eq!(book.available_copies(), 2);
    }
}
