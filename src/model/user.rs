//! User record

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Digest stored in place of a plain password.
///
/// djb2 over the password bytes, rendered as decimal. This is what existing
/// user files contain; it is not a password-hardening scheme.
pub fn hash_password(password: &str) -> String {
    let mut hash: u64 = 5381;
    for byte in password.bytes() {
        hash = (hash << 5).wrapping_add(hash).wrapping_add(u64::from(byte));
    }
    hash.to_string()
}

/// Registration data for a user whose ID is not yet allocated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

/// A registered user.
///
/// `user_id` and `username` are the two keys of the user index and never
/// change. The borrowed set holds ISBNs; its size is the borrowed count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    user_id: String,
    username: String,
    password_hash: String,
    full_name: String,
    email: String,
    phone: String,
    borrowed: BTreeSet<String>,
    is_active: bool,
}

impl User {
    /// Active user with no borrowed books. `password_hash` is stored as given.
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        full_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            password_hash: password_hash.into(),
            full_name: full_name.into(),
            email: email.into(),
            phone: phone.into(),
            borrowed: BTreeSet::new(),
            is_active: true,
        }
    }

    /// Build from registration data, hashing the password
    pub fn from_registration(user_id: impl Into<String>, new_user: NewUser) -> Self {
        Self::new(
            user_id,
            new_user.username,
            hash_password(&new_user.password),
            new_user.full_name,
            new_user.email,
            new_user.phone,
        )
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Compare a plain password against the stored digest
    pub fn verify_password(&self, password: &str) -> bool {
        self.password_hash == hash_password(password)
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    pub fn update_contact(&mut self, email: impl Into<String>, phone: impl Into<String>) {
        self.email = email.into();
        self.phone = phone.into();
    }

    /// ISBNs currently borrowed, ascending
    pub fn borrowed(&self) -> &BTreeSet<String> {
        &self.borrowed
    }

    pub fn borrowed_count(&self) -> usize {
        self.borrowed.len()
    }

    pub fn has_borrowed(&self, isbn: &str) -> bool {
        self.borrowed.contains(isbn)
    }

    /// Record a borrowed ISBN. False if it was already recorded.
    pub fn add_borrowed(&mut self, isbn: impl Into<String>) -> bool {
        self.borrowed.insert(isbn.into())
    }

    /// Forget a borrowed ISBN. False if it was not recorded.
    pub fn remove_borrowed(&mut self, isbn: &str) -> bool {
        self.borrowed.remove(isbn)
    }
}
