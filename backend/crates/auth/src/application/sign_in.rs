//! Sign In Use Case
//!
//! Authenticates a user and opens a refresh-token session.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::AuthConfig;
use crate::domain::entity::{Session, User};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{Email, RawPassword, UserId, UserName};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    /// User name or email
    pub login: String,
    /// Password
    pub password: String,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    pub user_id: UserId,
    pub access_token: String,
    /// Refresh token for the session cookie
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Sign in use case
pub struct SignInUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    users: Arc<U>,
    sessions: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> SignInUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(users: Arc<U>, sessions: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            users,
            sessions,
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let user = self
            .find_by_login(&input.login)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // A password that fails policy can never match a stored hash;
        // collapse it into the same generic failure.
        let raw =
            RawPassword::new(input.password).map_err(|_| AuthError::InvalidCredentials)?;

        if !user.password_hash.verify(&raw, self.config.pepper()) {
            return Err(AuthError::InvalidCredentials);
        }

        // Correct credentials are necessary but not sufficient
        if !user.is_verified {
            return Err(AuthError::NotVerified);
        }

        let codec = self.config.codec();

        let refresh = codec
            .issue_refresh(&user.user_id)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let session = Session::new(user.user_id, refresh.token.clone(), refresh.expires_at);
        self.sessions.create(&session).await?;

        let access = codec
            .issue_access(&user.user_id)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::info!(
            user_id = %user.user_id,
            session_id = %session.session_id,
            "User signed in"
        );

        Ok(SignInOutput {
            user_id: user.user_id,
            access_token: access.token,
            refresh_token: refresh.token,
            refresh_expires_at: refresh.expires_at,
        })
    }

    /// Look up by user name or email, whichever the login string is.
    /// A login that fails validation cannot name any account.
    async fn find_by_login(&self, login: &str) -> AuthResult<Option<User>> {
        if login.contains('@') {
            let Ok(email) = Email::new(login) else {
                return Ok(None);
            };
            self.users.find_by_email(&email).await
        } else {
            let Ok(user_name) = UserName::new(login) else {
                return Ok(None);
            };
            self.users.find_by_user_name(&user_name).await
        }
    }
}
