//! Title/author search index

use crate::books::BookIndex;
use crate::model::Book;
use crate::observability::Logger;

use super::buckets::TokenBuckets;
use super::text::{normalize, tokenize};

/// Where the search index reads books from.
///
/// The index stores only ISBNs; every result is resolved through the source
/// at lookup time, so a book removed from the source can never be returned.
pub trait BookSource {
    /// Look up one book by ISBN
    fn resolve(&self, isbn: &str) -> Option<&Book>;

    /// Every book, in ascending ISBN order
    fn snapshot(&self) -> Vec<&Book>;
}

impl BookSource for BookIndex {
    fn resolve(&self, isbn: &str) -> Option<&Book> {
        self.search(isbn)
    }

    fn snapshot(&self) -> Vec<&Book> {
        self.get_all_sorted()
    }
}

/// Exact-match index over normalized titles, authors and their words
#[derive(Debug, Default)]
pub struct SearchIndex {
    titles: TokenBuckets,
    authors: TokenBuckets,
    logger: Logger,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index that reports rebuilds through `logger`
    pub fn with_logger(logger: Logger) -> Self {
        Self {
            logger,
            ..Self::default()
        }
    }

    /// Clear and re-derive every bucket from the source
    pub fn build_indices<S: BookSource + ?Sized>(&mut self, source: &S) {
        self.clear();
        let books = source.snapshot();
        for book in &books {
            self.add_book_to_index(book);
        }

        self.logger.info(
            "SEARCH_INDEX_REBUILT",
            &[
                ("author_keys", &self.authors.key_count().to_string()),
                ("books", &books.len().to_string()),
                ("title_keys", &self.titles.key_count().to_string()),
            ],
        );
    }

    /// Same as [`build_indices`](Self::build_indices)
    pub fn rebuild_indices<S: BookSource + ?Sized>(&mut self, source: &S) {
        self.build_indices(source);
    }

    /// File a book under its full title, each title word, its full author
    /// and each author word.
    pub fn add_book_to_index(&mut self, book: &Book) {
        let isbn = book.isbn();
        file_text(&mut self.titles, book.title(), |buckets, key| {
            buckets.insert(key, isbn)
        });
        file_text(&mut self.authors, book.author(), |buckets, key| {
            buckets.insert(key, isbn)
        });
    }

    /// Remove this book's ISBN from every bucket its title and author map to.
    ///
    /// Other books in the same buckets stay indexed.
    pub fn remove_book_from_index(&mut self, book: &Book) {
        let isbn = book.isbn();
        file_text(&mut self.titles, book.title(), |buckets, key| {
            buckets.remove(key, isbn)
        });
        file_text(&mut self.authors, book.author(), |buckets, key| {
            buckets.remove(key, isbn)
        });
    }

    /// Books whose normalized title, or one of its words, equals the term
    pub fn search_by_title<'s, S: BookSource + ?Sized>(
        &self,
        source: &'s S,
        term: &str,
    ) -> Vec<&'s Book> {
        let isbns = self.titles.lookup_eq(&normalize(term));
        resolve_all(source, isbns.iter())
    }

    /// Books whose normalized author, or one of its words, equals the term
    pub fn search_by_author<'s, S: BookSource + ?Sized>(
        &self,
        source: &'s S,
        term: &str,
    ) -> Vec<&'s Book> {
        let isbns = self.authors.lookup_eq(&normalize(term));
        resolve_all(source, isbns.iter())
    }

    /// Union of title and author matches, without duplicates
    pub fn search_by_keyword<'s, S: BookSource + ?Sized>(
        &self,
        source: &'s S,
        term: &str,
    ) -> Vec<&'s Book> {
        let key = normalize(term);
        let mut isbns: Vec<&String> = self
            .titles
            .lookup_eq(&key)
            .iter()
            .chain(self.authors.lookup_eq(&key))
            .collect();
        isbns.sort();
        isbns.dedup();
        resolve_all(source, isbns)
    }

    /// Direct ISBN lookup through the source
    pub fn search_by_isbn<'s, S: BookSource + ?Sized>(
        &self,
        source: &'s S,
        isbn: &str,
    ) -> Option<&'s Book> {
        source.resolve(isbn)
    }

    /// Books with at least one copy on the shelf, ascending ISBN
    pub fn search_available_books<'s, S: BookSource + ?Sized>(&self, source: &'s S) -> Vec<&'s Book> {
        source
            .snapshot()
            .into_iter()
            .filter(|book| book.is_available())
            .collect()
    }

    /// Drop every bucket
    pub fn clear(&mut self) {
        self.titles.clear();
        self.authors.clear();
    }

    /// Distinct title and author keys
    pub fn bucket_count(&self) -> usize {
        self.titles.key_count() + self.authors.key_count()
    }

    /// Total (key, ISBN) entries across both bucket sets
    pub fn entry_count(&self) -> usize {
        self.titles.entry_count() + self.authors.entry_count()
    }

    /// Whether any bucket still lists this ISBN
    pub fn references(&self, isbn: &str) -> bool {
        self.titles.references(isbn) || self.authors.references(isbn)
    }

    /// Whether both indexes file the same ISBNs under the same keys
    pub fn same_buckets(&self, other: &SearchIndex) -> bool {
        self.titles == other.titles && self.authors == other.authors
    }
}

/// Apply `op` to the whole normalized text and to each of its words
fn file_text(buckets: &mut TokenBuckets, text: &str, op: impl Fn(&mut TokenBuckets, &str)) {
    let full = normalize(text);
    op(buckets, &full);
    for word in tokenize(&full) {
        op(buckets, word);
    }
}

fn resolve_all<'s, 'k, S: BookSource + ?Sized>(
    source: &'s S,
    isbns: impl IntoIterator<Item = &'k String>,
) -> Vec<&'s Book> {
    isbns
        .into_iter()
        .filter_map(|isbn| source.resolve(isbn))
        .collect()
}
