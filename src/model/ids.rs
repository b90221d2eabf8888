//! Sequential identifier allocation
//!
//! IDs are a fixed prefix followed by a zero-padded counter: `U001`,
//! `T0042`. Counters wider than the padding simply grow (`U1000`).
//! The counter saturates at `u64::MAX`: once that ID is handed out the
//! allocator is exhausted and keeps repeating it.

use serde::{Deserialize, Serialize};

/// Allocates sequential IDs with a prefix and minimum digit width.
///
/// Owned by the index whose records it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    prefix: char,
    width: usize,
    next: u64,
    #[serde(default)]
    exhausted: bool,
}

impl IdAllocator {
    /// Allocator starting at 1
    pub fn new(prefix: char, width: usize) -> Self {
        Self {
            prefix,
            width,
            next: 1,
            exhausted: false,
        }
    }

    /// User IDs: `U001`
    pub fn users() -> Self {
        Self::new('U', 3)
    }

    /// Transaction IDs: `T0001`
    pub fn transactions() -> Self {
        Self::new('T', 4)
    }

    /// Take the next ID
    pub fn next_id(&mut self) -> String {
        let id = self.format(self.next);
        match self.next.checked_add(1) {
            Some(next) => self.next = next,
            None => self.exhausted = true,
        }
        id
    }

    /// The ID `next_id` would return, without consuming it
    pub fn peek(&self) -> String {
        self.format(self.next)
    }

    /// Advance past an ID produced elsewhere (e.g. loaded from disk).
    ///
    /// IDs with a different prefix or a non-numeric tail are ignored.
    /// Observing the largest representable ID exhausts the allocator.
    pub fn observe(&mut self, id: &str) {
        let mut chars = id.chars();
        if chars.next() != Some(self.prefix) {
            return;
        }
        let Ok(n) = chars.as_str().parse::<u64>() else {
            return;
        };
        if n < self.next {
            return;
        }
        match n.checked_add(1) {
            Some(next) => self.next = next,
            None => {
                self.next = u64::MAX;
                self.exhausted = true;
            }
        }
    }

    /// Whether every ID up to `u64::MAX` has been handed out or observed
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Restart numbering at 1
    pub fn reset(&mut self) {
        self.next = 1;
        self.exhausted = false;
    }

    fn format(&self, n: u64) -> String {
        format!("{}{:0width$}", self.prefix, n, width = self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_padded() {
        let mut ids = IdAllocator::users();
        assert_eq!(ids.next_id(), "U001");
        assert_eq!(ids.next_id(), "U002");

        let mut tx = IdAllocator::transactions();
        assert_eq!(tx.next_id(), "T0001");
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut ids = IdAllocator::users();
        assert_eq!(ids.peek(), "U001");
        assert_eq!(ids.next_id(), "U001");
        assert_eq!(ids.peek(), "U002");
    }

    #[test]
    fn test_observe_advances_past_loaded_ids() {
        let mut ids = IdAllocator::users();
        ids.observe("U041");
        assert_eq!(ids.next_id(), "U042");

        // lower IDs do not move the counter back
        ids.observe("U007");
        assert_eq!(ids.next_id(), "U043");
    }

    #[test]
    fn test_observe_ignores_foreign_ids() {
        let mut ids = IdAllocator::users();
        ids.observe("T0100");
        ids.observe("ADMIN001");
        ids.observe("U");
        ids.observe("Uabc");
        assert_eq!(ids.next_id(), "U001");
    }

    #[test]
    fn test_reset_and_overflow_width() {
        let mut ids = IdAllocator::users();
        ids.observe("U999");
        assert_eq!(ids.next_id(), "U1000");
        ids.reset();
        assert_eq!(ids.next_id(), "U001");
    }

    #[test]
    fn test_observe_largest_id_saturates() {
        let mut ids = IdAllocator::users();
        ids.observe("U18446744073709551615");
        assert!(ids.is_exhausted());
        assert_eq!(ids.peek(), "U18446744073709551615");
        assert_eq!(ids.next_id(), "U18446744073709551615");

        ids.reset();
        assert!(!ids.is_exhausted());
        assert_eq!(ids.next_id(), "U001");
    }

    #[test]
    fn test_next_id_saturates_at_max() {
        let mut ids = IdAllocator::transactions();
        ids.observe("T18446744073709551614");
        assert!(!ids.is_exhausted());
        assert_eq!(ids.next_id(), "T18446744073709551615");
        assert!(ids.is_exhausted());
        assert_eq!(ids.next_id(), "T18446744073709551615");
    }
}
