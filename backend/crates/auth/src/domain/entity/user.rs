//! User Entity
//!
//! Account record owned by the credential store. Created unverified;
//! sign-in is refused until the verification flow flips the flag.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{Email, PasswordHash, UserId, UserName};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Immutable internal identifier
    pub user_id: UserId,
    /// Unique handle for login and display
    pub user_name: UserName,
    /// Unique, lowercased email address
    pub email: Email,
    /// Argon2id PHC string
    pub password_hash: PasswordHash,
    /// Whether the email address has been proven via verification token
    pub is_verified: bool,
    /// Optional profile fields, filled in after registration
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i16>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, unverified user
    pub fn new(user_name: UserName, email: Email, password_hash: PasswordHash) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            user_name,
            email,
            password_hash,
            is_verified: false,
            first_name: None,
            last_name: None,
            age: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Flip the verification flag. Idempotent.
    pub fn mark_verified(&mut self) {
        self.is_verified = true;
        self.updated_at = Utc::now();
    }

    /// Replace the stored password hash
    pub fn set_password_hash(&mut self, hash: PasswordHash) {
        self.password_hash = hash;
        self.updated_at = Utc::now();
    }

    /// Janitor staleness predicate: unverified and created before `cutoff`
    pub fn is_stale_unverified(&self, cutoff: DateTime<Utc>) -> bool {
        !self.is_verified && self.created_at < cutoff
    }
}
