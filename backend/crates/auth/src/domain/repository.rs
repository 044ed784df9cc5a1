//! Repository Traits
//!
//! Persistence ports. Implementations live in the infrastructure layer.
//! Correctness relies on store-level atomicity: `replace_for_user` must be
//! a single atomic upsert and `consume` a single atomic claim, so that the
//! one-live-token and single-use invariants hold without in-process locks.

use chrono::{DateTime, Utc};

use crate::domain::entity::{OneTimeToken, Session, User};
use crate::domain::value_object::{Email, PasswordHash, UserId, UserName};
use crate::error::AuthResult;

/// Per-field result of the uniqueness check. Both flags may be set; the
/// response must name every offending field, not just the first match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldConflicts {
    pub username_taken: bool,
    pub email_taken: bool,
}

impl FieldConflicts {
    pub fn any(&self) -> bool {
        self.username_taken || self.email_taken
    }
}

/// User repository trait (credential store)
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Persist a new user
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Check both uniqueness fields against all colliding rows
    async fn conflicts(&self, user_name: &UserName, email: &Email) -> AuthResult<FieldConflicts>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by canonical user name
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Set the verification flag. Idempotent.
    async fn mark_verified(&self, user_id: &UserId) -> AuthResult<()>;

    /// Replace the stored password hash. Idempotent.
    async fn update_password_hash(&self, user_id: &UserId, hash: &PasswordHash) -> AuthResult<()>;

    /// Delete a user account
    async fn delete(&self, user_id: &UserId) -> AuthResult<()>;

    /// Bulk delete unverified users created before `cutoff`. Janitor only.
    async fn delete_unverified_before(&self, cutoff: DateTime<Utc>) -> AuthResult<u64>;
}

/// Session repository trait (refresh-token registry)
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Persist a new session row
    async fn create(&self, session: &Session) -> AuthResult<()>;

    /// Find the session row holding this refresh token
    async fn find_by_token(&self, refresh_token: &str) -> AuthResult<Option<Session>>;

    /// Delete the matching row. Returns rows affected; deleting an absent
    /// token is not an error (sign-out is idempotent).
    async fn delete_by_token(&self, refresh_token: &str) -> AuthResult<u64>;

    /// Delete every session for a user (terminate all devices)
    async fn delete_for_user(&self, user_id: &UserId) -> AuthResult<u64>;

    /// Bulk delete expired sessions. Janitor only.
    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

/// Store for email-verification tokens
#[trait_variant::make(VerificationTokenRepository: Send)]
pub trait LocalVerificationTokenRepository {
    /// Atomically replace any live token for the owning user with this one
    async fn replace_for_user(&self, token: &OneTimeToken) -> AuthResult<()>;

    /// Read-only lookup by token string
    async fn find_by_token(&self, token: &str) -> AuthResult<Option<OneTimeToken>>;

    /// Atomically claim and delete the row for this token string. A second
    /// concurrent claim of the same string observes `None`.
    async fn consume(&self, token: &str) -> AuthResult<Option<OneTimeToken>>;

    /// Bulk delete expired tokens. Janitor only.
    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

/// Store for password-reset tokens. Same contract as verification tokens,
/// held in its own table.
#[trait_variant::make(ResetTokenRepository: Send)]
pub trait LocalResetTokenRepository {
    /// Atomically replace any live token for the owning user with this one
    async fn replace_for_user(&self, token: &OneTimeToken) -> AuthResult<()>;

    /// Read-only lookup by token string (the reset form probe)
    async fn find_by_token(&self, token: &str) -> AuthResult<Option<OneTimeToken>>;

    /// Atomically claim and delete the row for this token string
    async fn consume(&self, token: &str) -> AuthResult<Option<OneTimeToken>>;

    /// Bulk delete expired tokens. Janitor only.
    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

/// Combined store bound for code that needs every port at once (the
/// gateway state and the janitor)
pub trait AuthStore:
    UserRepository
    + SessionRepository
    + VerificationTokenRepository
    + ResetTokenRepository
    + Send
    + Sync
    + 'static
{
}

impl<T> AuthStore for T where
    T: UserRepository
        + SessionRepository
        + VerificationTokenRepository
        + ResetTokenRepository
        + Send
        + Sync
        + 'static
{
}
