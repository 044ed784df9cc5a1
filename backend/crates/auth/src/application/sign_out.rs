//! Sign Out Use Case
//!
//! Revokes refresh sessions: one by token, or every session a user holds.

use std::sync::Arc;

use crate::domain::repository::SessionRepository;
use crate::domain::value_object::UserId;
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: SessionRepository,
{
    sessions: Arc<S>,
}

impl<S> SignOutUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(sessions: Arc<S>) -> Self {
        Self { sessions }
    }

    /// Revoke the session holding this refresh token. Idempotent: a token
    /// with no row (already signed out, never issued) is not an error.
    pub async fn execute(&self, refresh_token: &str) -> AuthResult<()> {
        let deleted = self.sessions.delete_by_token(refresh_token).await?;

        if deleted > 0 {
            tracing::info!("User signed out");
        }

        Ok(())
    }

    /// Revoke every session for the user (terminate all devices)
    pub async fn terminate_all(&self, user_id: &UserId) -> AuthResult<u64> {
        let deleted = self.sessions.delete_for_user(user_id).await?;

        tracing::info!(
            user_id = %user_id,
            deleted = deleted,
            "Terminated all sessions"
        );

        Ok(deleted)
    }
}
