//! Refresh Access Use Case
//!
//! Exchanges a live refresh session for a new access token. Validity
//! requires BOTH a verifiable signature AND a matching persisted,
//! non-expired session row: a revoked session must fail here even though
//! its token still verifies cryptographically. The refresh token itself is
//! not rotated.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::domain::repository::SessionRepository;
use crate::domain::token::TokenKind;
use crate::error::{AuthError, AuthResult};

/// Refresh output
pub struct RefreshOutput {
    pub access_token: String,
}

/// Refresh access use case
pub struct RefreshAccessUseCase<S>
where
    S: SessionRepository,
{
    sessions: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> RefreshAccessUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(sessions: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self { sessions, config }
    }

    pub async fn execute(&self, refresh_token: &str) -> AuthResult<RefreshOutput> {
        let codec = self.config.codec();

        // First gate: the signature. Internal causes stay in logs; the
        // caller sees one unauthorized outcome.
        let claimed_user = codec
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|e| {
                tracing::debug!(cause = %e, "Refresh token failed verification");
                AuthError::SessionInvalid
            })?;

        // Second gate: the persisted session row. A signature with no row
        // means the session was revoked (or never issued here).
        let session = self
            .sessions
            .find_by_token(refresh_token)
            .await?
            .ok_or_else(|| {
                tracing::debug!("Refresh token has no live session");
                AuthError::SessionInvalid
            })?;

        if session.is_expired(Utc::now()) {
            // Expired rows are dead weight; drop eagerly rather than
            // waiting for the janitor.
            self.sessions.delete_by_token(refresh_token).await?;
            tracing::debug!(session_id = %session.session_id, "Refresh session expired");
            return Err(AuthError::SessionInvalid);
        }

        if session.user_id != claimed_user {
            tracing::warn!(
                session_id = %session.session_id,
                "Session owner does not match token subject"
            );
            return Err(AuthError::SessionInvalid);
        }

        let access = codec
            .issue_access(&session.user_id)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(RefreshOutput {
            access_token: access.token,
        })
    }
}
