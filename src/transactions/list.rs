//! Slab-backed doubly linked transaction list

use std::collections::HashMap;

use slab::Slab;

use crate::model::{IdAllocator, Transaction, TransactionKind};

type NodeId = usize;

#[derive(Debug)]
struct TxNode {
    transaction: Transaction,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// Append log of transactions.
///
/// Records are only ever added at either end or dropped all at once by
/// [`clear`](TransactionLog::clear), so a record's slot never changes while
/// it is live. The by-user and by-book maps hold those slots.
#[derive(Debug)]
pub struct TransactionLog {
    nodes: Slab<TxNode>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    by_user: HashMap<String, Vec<NodeId>>,
    by_isbn: HashMap<String, Vec<NodeId>>,
    ids: IdAllocator,
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self {
            nodes: Slab::new(),
            head: None,
            tail: None,
            by_user: HashMap::new(),
            by_isbn: HashMap::new(),
            ids: IdAllocator::transactions(),
        }
    }
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record at the newest end
    pub fn append(&mut self, transaction: Transaction) {
        self.push_back(transaction);
    }

    /// Add a record at the oldest end.
    ///
    /// The per-key sequences still receive it last: they follow call order,
    /// not list position.
    pub fn prepend(&mut self, transaction: Transaction) {
        let id = self.link(transaction);
        match self.head {
            Some(head) => {
                self.nodes[head].prev = Some(id);
                self.nodes[id].next = Some(head);
            }
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    /// Build a transaction with the next ID and the current time, append it
    /// and return it.
    pub fn record(
        &mut self,
        user_id: &str,
        isbn: &str,
        kind: TransactionKind,
        user_name: &str,
        book_title: &str,
    ) -> &Transaction {
        let transaction = Transaction::new(
            self.ids.next_id(),
            user_id,
            isbn,
            kind,
            Transaction::now(),
            user_name,
            book_title,
        );
        let id = self.push_back(transaction);
        &self.nodes[id].transaction
    }

    /// All records, oldest first
    pub fn get_all(&self) -> Vec<&Transaction> {
        self.iter().collect()
    }

    /// Up to `n` records, newest first
    pub fn get_recent(&self, n: usize) -> Vec<&Transaction> {
        self.iter().rev().take(n).collect()
    }

    /// Records appended under this user, in insertion order
    pub fn get_by_user_id(&self, user_id: &str) -> Vec<&Transaction> {
        self.resolve(self.by_user.get(user_id))
    }

    /// Records appended under this ISBN, in insertion order
    pub fn get_by_isbn(&self, isbn: &str) -> Vec<&Transaction> {
        self.resolve(self.by_isbn.get(isbn))
    }

    /// Double-ended iterator, oldest to newest
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            nodes: &self.nodes,
            front: self.head,
            back: self.tail,
            remaining: self.nodes.len(),
        }
    }

    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The ID `record` would assign next
    pub fn next_transaction_id(&self) -> String {
        self.ids.peek()
    }

    /// Restart transaction numbering at `T0001`
    pub fn reset_ids(&mut self) {
        self.ids.reset();
    }

    /// Drop every record and both lookups. ID numbering is kept.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
        self.by_user.clear();
        self.by_isbn.clear();
    }

    /// Check list links and that each lookup partitions the records by key.
    pub fn validate(&self) -> Result<(), String> {
        let mut forward = 0;
        let mut prev = None;
        let mut current = self.head;
        while let Some(id) = current {
            let node = self
                .nodes
                .get(id)
                .ok_or_else(|| format!("link to free slot {}", id))?;
            if node.prev != prev {
                return Err(format!(
                    "{} has a broken back link",
                    node.transaction.transaction_id()
                ));
            }
            forward += 1;
            if forward > self.nodes.len() {
                return Err("cycle in forward links".to_string());
            }
            prev = current;
            current = node.next;
        }
        if forward != self.nodes.len() || prev != self.tail {
            return Err(format!(
                "{} records reachable, {} stored",
                forward,
                self.nodes.len()
            ));
        }

        self.validate_lookup("user", &self.by_user, Transaction::user_id)?;
        self.validate_lookup("isbn", &self.by_isbn, Transaction::isbn)
    }

    fn validate_lookup(
        &self,
        name: &str,
        lookup: &HashMap<String, Vec<NodeId>>,
        key_of: impl Fn(&Transaction) -> &str,
    ) -> Result<(), String> {
        let total: usize = lookup.values().map(Vec::len).sum();
        if total != self.nodes.len() {
            return Err(format!(
                "{} lookup lists {} records, log holds {}",
                name,
                total,
                self.nodes.len()
            ));
        }
        for (key, ids) in lookup {
            for &id in ids {
                let node = self
                    .nodes
                    .get(id)
                    .ok_or_else(|| format!("{} lookup {} points at a free slot", name, key))?;
                if key_of(&node.transaction) != key.as_str() {
                    return Err(format!(
                        "{} filed under {} {}",
                        node.transaction.transaction_id(),
                        name,
                        key
                    ));
                }
            }
        }
        Ok(())
    }

    fn push_back(&mut self, transaction: Transaction) -> NodeId {
        let id = self.link(transaction);
        match self.tail {
            Some(tail) => {
                self.nodes[tail].next = Some(id);
                self.nodes[id].prev = Some(tail);
            }
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        id
    }

    /// Store an unlinked node and file it under its user and ISBN
    fn link(&mut self, transaction: Transaction) -> NodeId {
        self.ids.observe(transaction.transaction_id());
        let user_id = transaction.user_id().to_owned();
        let isbn = transaction.isbn().to_owned();

        let id = self.nodes.insert(TxNode {
            transaction,
            prev: None,
            next: None,
        });
        self.by_user.entry(user_id).or_default().push(id);
        self.by_isbn.entry(isbn).or_default().push(id);
        id
    }

    fn resolve(&self, ids: Option<&Vec<NodeId>>) -> Vec<&Transaction> {
        ids.map(|ids| ids.iter().map(|&id| &self.nodes[id].transaction).collect())
            .unwrap_or_default()
    }
}

impl<'a> IntoIterator for &'a TransactionLog {
    type Item = &'a Transaction;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`TransactionLog`] from either end
#[derive(Debug)]
pub struct Iter<'a> {
    nodes: &'a Slab<TxNode>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Transaction;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let nodes = self.nodes;
        let node = &nodes[self.front?];
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.transaction)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let nodes = self.nodes;
        let node = &nodes[self.back?];
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.transaction)
    }
}

impl ExactSizeIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str, user: &str, isbn: &str) -> Transaction {
        let ts = Transaction::parse_timestamp("2024-01-01 10:00:00").unwrap();
        Transaction::new(id, user, isbn, TransactionKind::Borrow, ts, user, isbn)
    }

    fn ids<'a>(records: impl IntoIterator<Item = &'a Transaction>) -> Vec<&'a str> {
        records.into_iter().map(|t| t.transaction_id()).collect()
    }

    #[test]
    fn test_empty_log() {
        let log = TransactionLog::new();
        assert!(log.is_empty());
        assert!(log.get_all().is_empty());
        assert!(log.get_recent(5).is_empty());
        assert!(log.get_by_user_id("U001").is_empty());
        assert!(log.get_by_isbn("978-1").is_empty());
        log.validate().unwrap();
    }

    #[test]
    fn test_append_order() {
        let mut log = TransactionLog::new();
        log.append(tx("T0001", "U001", "A"));
        log.append(tx("T0002", "U002", "B"));
        log.append(tx("T0003", "U001", "A"));

        assert_eq!(ids(log.get_all()), vec!["T0001", "T0002", "T0003"]);
        assert_eq!(ids(log.get_recent(2)), vec!["T0003", "T0002"]);
        assert_eq!(ids(log.get_recent(10)), vec!["T0003", "T0002", "T0001"]);
        assert!(log.get_recent(0).is_empty());
        log.validate().unwrap();
    }

    #[test]
    fn test_prepend_goes_to_head() {
        let mut log = TransactionLog::new();
        log.append(tx("T0002", "U001", "A"));
        log.prepend(tx("T0001", "U001", "B"));
        log.append(tx("T0003", "U001", "A"));

        assert_eq!(ids(log.get_all()), vec!["T0001", "T0002", "T0003"]);
        assert_eq!(ids(log.get_recent(3)), vec!["T0003", "T0002", "T0001"]);
        // lookups follow call order
        assert_eq!(ids(log.get_by_user_id("U001")), vec!["T0002", "T0001", "T0003"]);
        log.validate().unwrap();
    }

    #[test]
    fn test_prepend_into_empty() {
        let mut log = TransactionLog::new();
        log.prepend(tx("T0001", "U001", "A"));
        assert_eq!(ids(log.get_recent(1)), vec!["T0001"]);
        assert_eq!(ids(log.get_all()), vec!["T0001"]);
        log.validate().unwrap();
    }

    #[test]
    fn test_lookups_by_key() {
        let mut log = TransactionLog::new();
        log.append(tx("T0001", "U001", "A"));
        log.append(tx("T0002", "U002", "A"));
        log.append(tx("T0003", "U001", "B"));

        assert_eq!(ids(log.get_by_user_id("U001")), vec!["T0001", "T0003"]);
        assert_eq!(ids(log.get_by_user_id("U002")), vec!["T0002"]);
        assert_eq!(ids(log.get_by_isbn("A")), vec!["T0001", "T0002"]);
        assert!(log.get_by_isbn("C").is_empty());
    }

    #[test]
    fn test_record_assigns_ids() {
        let mut log = TransactionLog::new();
        let first = log
            .record("U001", "A", TransactionKind::Borrow, "alice", "Dune")
            .transaction_id()
            .to_string();
        assert_eq!(first, "T0001");

        log.append(tx("T0041", "U002", "B"));
        let next = log
            .record("U001", "A", TransactionKind::Return, "alice", "Dune")
            .clone();
        assert_eq!(next.transaction_id(), "T0042");
        assert_eq!(next.kind(), TransactionKind::Return);
        assert_eq!(next.book_title(), "Dune");
        assert_eq!(log.next_transaction_id(), "T0043");
    }

    #[test]
    fn test_clear_resets_everything_but_ids() {
        let mut log = TransactionLog::new();
        log.record("U001", "A", TransactionKind::Borrow, "alice", "Dune");
        log.clear();

        assert_eq!(log.count(), 0);
        assert!(log.get_by_user_id("U001").is_empty());
        assert!(log.get_by_isbn("A").is_empty());
        assert_eq!(log.next_transaction_id(), "T0002");
        log.validate().unwrap();

        log.reset_ids();
        assert_eq!(log.next_transaction_id(), "T0001");
    }

    #[test]
    fn test_iterator_meets_in_the_middle() {
        let mut log = TransactionLog::new();
        for i in 1..=4 {
            log.append(tx(&format!("T{:04}", i), "U001", "A"));
        }
        let mut iter = log.iter();
        assert_eq!(iter.next().unwrap().transaction_id(), "T0001");
        assert_eq!(iter.next_back().unwrap().transaction_id(), "T0004");
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.next().unwrap().transaction_id(), "T0002");
        assert_eq!(iter.next_back().unwrap().transaction_id(), "T0003");
        assert!(iter.next().is_none());
        assert!(iter.next_back().is_none());
    }

    #[test]
    fn test_largest_loaded_id() {
        let mut log = TransactionLog::new();
        log.append(tx("T18446744073709551615", "U001", "A"));
        log.prepend(tx("T18446744073709551615", "U002", "B"));
        assert_eq!(log.count(), 2);
        assert_eq!(log.next_transaction_id(), "T18446744073709551615");
        log.validate().unwrap();
    }
}
