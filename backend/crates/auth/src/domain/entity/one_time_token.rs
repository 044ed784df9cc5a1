//! One-Time Token Entity
//!
//! Single-use, time-boxed credential. The same record shape backs both
//! email verification and password reset; the two differ only in which
//! store holds them and which side effect redemption triggers.
//!
//! Lifecycle: Created -> Consumed (redeemed) or Created -> Swept (expired,
//! unredeemed). Never reactivated. At most one live token per user and
//! kind; issuing a new one replaces the previous row.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::{OneTimeTokenId, UserId};

/// Random bytes per token string (URL-safe encoded)
const TOKEN_BYTES: usize = 32;

/// Single-use token entity
#[derive(Debug, Clone)]
pub struct OneTimeToken {
    pub token_id: OneTimeTokenId,
    pub user_id: UserId,
    /// Unguessable URL-safe token string, unique per store
    pub token: String,
    /// Fixed at issuance, never extended
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl OneTimeToken {
    /// Issue a fresh token for `user_id`, valid for `ttl`.
    pub fn issue(user_id: UserId, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            token_id: OneTimeTokenId::new(),
            user_id,
            token: platform::crypto::random_url_token(TOKEN_BYTES),
            expires_at: now + ttl,
            created_at: now,
        }
    }

    /// Passive expiry check performed at redemption time
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}
