//! Dual-keyed user index

use slab::Slab;

use crate::config::StoreConfig;
use crate::model::{IdAllocator, NewUser, User};
use crate::observability::Logger;

use super::chain::ChainTable;

/// User records addressable by ID and by username.
///
/// The index owns the records; both hash tables map a key to the record's
/// slot. When an insert pushes the load factor past the configured maximum,
/// both tables double and every entry is rehashed before `insert` returns.
#[derive(Debug)]
pub struct UserIndex {
    records: Slab<User>,
    by_id: ChainTable,
    by_username: ChainTable,
    max_load_factor: f64,
    resizes: u64,
    ids: IdAllocator,
    logger: Logger,
}

impl Default for UserIndex {
    fn default() -> Self {
        Self::from_config(&StoreConfig::default())
    }
}

impl UserIndex {
    /// Index with the default capacity (101) and load factor (0.75)
    pub fn new() -> Self {
        Self::default()
    }

    /// Index with an explicit initial capacity and maximum load factor
    pub fn with_capacity(capacity: usize, max_load_factor: f64) -> Self {
        Self {
            records: Slab::new(),
            by_id: ChainTable::with_capacity(capacity),
            by_username: ChainTable::with_capacity(capacity),
            max_load_factor,
            resizes: 0,
            ids: IdAllocator::users(),
            logger: Logger::default(),
        }
    }

    /// Index sized and logged per `config`
    pub fn from_config(config: &StoreConfig) -> Self {
        let mut index = Self::with_capacity(config.initial_user_capacity, config.max_load_factor);
        index.logger = config.logger();
        index
    }

    /// Insert a user under its ID and username.
    ///
    /// Returns false, leaving the index unchanged, if either key is already
    /// taken. The user ID counter is advanced past the inserted ID.
    pub fn insert(&mut self, user: User) -> bool {
        if self.by_id.get(user.user_id()).is_some()
            || self.by_username.get(user.username()).is_some()
        {
            return false;
        }

        self.ids.observe(user.user_id());
        let id = user.user_id().to_owned();
        let username = user.username().to_owned();
        let slot = self.records.insert(user);
        self.by_id.push(id, slot);
        self.by_username.push(username, slot);

        if self.load_factor() > self.max_load_factor {
            self.grow();
        }
        true
    }

    /// Allocate the next user ID and insert the new user.
    ///
    /// Returns `None` if the username is taken (no ID is consumed then) or
    /// the ID space is exhausted.
    pub fn register(&mut self, new_user: NewUser) -> Option<&User> {
        if self.exists_username(&new_user.username) {
            return None;
        }
        // skip IDs a caller inserted directly
        let user_id = loop {
            if self.ids.is_exhausted() {
                return None;
            }
            let candidate = self.ids.next_id();
            if self.by_id.get(&candidate).is_none() {
                break candidate;
            }
        };
        let user = User::from_registration(user_id.clone(), new_user);
        if !self.insert(user) {
            return None;
        }
        self.search_by_id(&user_id)
    }

    pub fn search_by_id(&self, user_id: &str) -> Option<&User> {
        self.by_id.get(user_id).map(|slot| &self.records[slot])
    }

    pub fn search_by_username(&self, username: &str) -> Option<&User> {
        self.by_username.get(username).map(|slot| &self.records[slot])
    }

    /// Mutable lookup; ID and username stay fixed
    pub fn search_by_id_mut(&mut self, user_id: &str) -> Option<&mut User> {
        let slot = self.by_id.get(user_id)?;
        Some(&mut self.records[slot])
    }

    /// Mutable lookup; ID and username stay fixed
    pub fn search_by_username_mut(&mut self, username: &str) -> Option<&mut User> {
        let slot = self.by_username.get(username)?;
        Some(&mut self.records[slot])
    }

    pub fn exists_username(&self, username: &str) -> bool {
        self.by_username.get(username).is_some()
    }

    /// Remove a user by ID from both tables, returning the record
    pub fn take(&mut self, user_id: &str) -> Option<User> {
        let slot = self.by_id.unlink(user_id)?;
        let username = self.records[slot].username().to_owned();
        self.by_username.unlink(&username);
        Some(self.records.remove(slot))
    }

    /// Remove a user by ID. Returns false if no such user exists.
    pub fn remove(&mut self, user_id: &str) -> bool {
        self.take(user_id).is_some()
    }

    /// Every user, in ID-table bucket order
    pub fn get_all(&self) -> Vec<&User> {
        self.by_id
            .entries()
            .map(|(_, _, slot)| &self.records[slot])
            .collect()
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Bucket count shared by both tables
    pub fn capacity(&self) -> usize {
        self.by_id.capacity()
    }

    pub fn load_factor(&self) -> f64 {
        self.count() as f64 / self.capacity() as f64
    }

    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    /// Number of times the tables have doubled
    pub fn resize_count(&self) -> u64 {
        self.resizes
    }

    /// The ID `register` would allocate next
    pub fn next_user_id(&self) -> String {
        self.ids.peek()
    }

    /// Restart user ID numbering at `U001`
    pub fn reset_ids(&mut self) {
        self.ids.reset();
    }

    /// Drop every user. Capacity and ID numbering are kept.
    pub fn clear(&mut self) {
        self.by_id.clear();
        self.by_username.clear();
        self.records.clear();
    }

    /// Check that both tables hold exactly one entry per record, in the
    /// right bucket, resolving to the same slot.
    pub fn validate(&self) -> Result<(), String> {
        if self.by_id.capacity() != self.by_username.capacity() {
            return Err(format!(
                "table capacities differ: {} by ID, {} by username",
                self.by_id.capacity(),
                self.by_username.capacity()
            ));
        }
        if self.by_id.len() != self.records.len() || self.by_username.len() != self.records.len() {
            return Err(format!(
                "{} records but {} ID entries and {} username entries",
                self.records.len(),
                self.by_id.len(),
                self.by_username.len()
            ));
        }

        for (bucket, key, slot) in self.by_id.entries() {
            let user = self
                .records
                .get(slot)
                .ok_or_else(|| format!("ID {} points at a free slot", key))?;
            if user.user_id() != key || self.by_id.bucket_of(key) != bucket {
                return Err(format!("ID entry {} is misplaced", key));
            }
            if self.by_username.get(user.username()) != Some(slot) {
                return Err(format!("username of {} resolves to another record", key));
            }
        }

        for (bucket, key, slot) in self.by_username.entries() {
            let user = self
                .records
                .get(slot)
                .ok_or_else(|| format!("username {} points at a free slot", key))?;
            if user.username() != key || self.by_username.bucket_of(key) != bucket {
                return Err(format!("username entry {} is misplaced", key));
            }
        }
        Ok(())
    }

    fn grow(&mut self) {
        let from = self.capacity();
        let to = from * 2;
        self.by_id.rehash(to);
        self.by_username.rehash(to);
        self.resizes += 1;

        self.logger.info(
            "USER_INDEX_RESIZED",
            &[
                ("count", &self.count().to_string()),
                ("from", &from.to_string()),
                ("to", &to.to_string()),
            ],
        );
    }
}
