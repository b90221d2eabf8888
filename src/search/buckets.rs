//! BTreeMap-based token buckets
//!
//! Each bucket maps a normalized key to the ISBNs filed under it. ISBNs in
//! a bucket are kept sorted ascending and unique.

use std::collections::BTreeMap;

/// Multimap from normalized keys to sorted ISBN lists
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenBuckets {
    tree: BTreeMap<String, Vec<String>>,
}

impl TokenBuckets {
    /// Creates an empty bucket set
    pub fn new() -> Self {
        Self {
            tree: BTreeMap::new(),
        }
    }

    /// File an ISBN under a key.
    ///
    /// Maintains sorted ascending order; filing twice is a no-op.
    pub fn insert(&mut self, key: &str, isbn: &str) {
        let isbns = self.tree.entry(key.to_owned()).or_default();

        match isbns.binary_search_by(|probe| probe.as_str().cmp(isbn)) {
            Ok(_) => {}
            Err(pos) => isbns.insert(pos, isbn.to_owned()),
        }
    }

    /// Remove one ISBN from a key's bucket.
    ///
    /// Other ISBNs in the bucket are untouched. An emptied bucket is dropped.
    pub fn remove(&mut self, key: &str, isbn: &str) {
        if let Some(isbns) = self.tree.get_mut(key) {
            if let Ok(pos) = isbns.binary_search_by(|probe| probe.as_str().cmp(isbn)) {
                isbns.remove(pos);
            }
            if isbns.is_empty() {
                self.tree.remove(key);
            }
        }
    }

    /// ISBNs filed under exactly this key, ascending
    pub fn lookup_eq(&self, key: &str) -> &[String] {
        self.tree.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the number of distinct keys
    pub fn key_count(&self) -> usize {
        self.tree.len()
    }

    /// Returns the total number of (key, ISBN) entries
    pub fn entry_count(&self) -> usize {
        self.tree.values().map(Vec::len).sum()
    }

    /// Whether any bucket still lists this ISBN
    pub fn references(&self, isbn: &str) -> bool {
        self.tree.values().any(|isbns| isbns.iter().any(|i| i == isbn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut buckets = TokenBuckets::new();

        buckets.insert("dune", "978-2");
        buckets.insert("dune", "978-1");
        buckets.insert("messiah", "978-2");

        assert_eq!(buckets.lookup_eq("dune"), ["978-1", "978-2"]);
        assert_eq!(buckets.lookup_eq("messiah"), ["978-2"]);
        assert!(buckets.lookup_eq("arrakis").is_empty());
    }

    #[test]
    fn test_duplicate_filing_collapses() {
        let mut buckets = TokenBuckets::new();
        buckets.insert("the", "978-1");
        buckets.insert("the", "978-1");
        assert_eq!(buckets.entry_count(), 1);
    }

    #[test]
    fn test_remove_only_that_isbn() {
        let mut buckets = TokenBuckets::new();
        buckets.insert("dune", "978-1");
        buckets.insert("dune", "978-2");

        buckets.remove("dune", "978-1");
        assert_eq!(buckets.lookup_eq("dune"), ["978-2"]);

        // Remove last ISBN, key should be removed
        buckets.remove("dune", "978-2");
        assert_eq!(buckets.key_count(), 0);
        assert!(!buckets.references("978-2"));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut buckets = TokenBuckets::new();
        buckets.insert("dune", "978-1");
        buckets.remove("dune", "978-9");
        buckets.remove("absent", "978-1");
        assert_eq!(buckets.entry_count(), 1);
    }
}
