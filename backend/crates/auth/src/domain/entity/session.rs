//! Session Entity
//!
//! One row per refresh token. A user holds many concurrent sessions
//! (multi-device); revoking a session deletes its row, which is what makes
//! an otherwise valid-by-signature refresh token dead.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{SessionId, UserId};

/// Refresh-token session entity
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: SessionId,
    /// Owning user (reference, not ownership)
    pub user_id: UserId,
    /// The signed refresh token string, unique across all sessions
    pub refresh_token: String,
    /// Expiry fixed at creation, never extended
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Open a new session. The expiry comes from the token codec so the
    /// row and the token signature always agree.
    pub fn new(user_id: UserId, refresh_token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            session_id: SessionId::new(),
            user_id,
            refresh_token,
            expires_at,
            created_at: Utc::now(),
        }
    }

    /// Passive expiry check performed at use time
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}
