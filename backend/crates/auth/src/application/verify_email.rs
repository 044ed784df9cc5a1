//! Email Verification Use Case
//!
//! Issues and redeems single-use verification tokens. Issuing replaces any
//! prior live token for the user (upsert at the store, so two concurrent
//! requests can never leave two redeemable tokens); redemption is an
//! atomic claim, so a token string redeems at most once.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::domain::entity::{OneTimeToken, User};
use crate::domain::mailer::Mailer;
use crate::domain::repository::{UserRepository, VerificationTokenRepository};
use crate::domain::value_object::{Email, UserId};
use crate::error::{AuthError, AuthResult};

/// Email verification use case
pub struct VerifyEmailUseCase<U, V, M>
where
    U: UserRepository,
    V: VerificationTokenRepository,
    M: Mailer,
{
    users: Arc<U>,
    tokens: Arc<V>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<U, V, M> VerifyEmailUseCase<U, V, M>
where
    U: UserRepository,
    V: VerificationTokenRepository,
    M: Mailer,
{
    pub fn new(users: Arc<U>, tokens: Arc<V>, mailer: Arc<M>, config: Arc<AuthConfig>) -> Self {
        Self {
            users,
            tokens,
            mailer,
            config,
        }
    }

    /// Issue a fresh token for the user and queue the verification mail.
    /// Any previously issued token stops being redeemable.
    pub async fn request(&self, user: &User) -> AuthResult<()> {
        let token = OneTimeToken::issue(user.user_id, self.config.verification_ttl);
        self.tokens.replace_for_user(&token).await?;

        let link = format!("{}/auth/verify_user/{}", self.config.base_url, token.token);
        let body = format!(
            "Hello {},\n\n\
             Confirm your email address by opening the link below. \
             The link expires in {} minutes.\n\n{}\n\n\
             If you did not create an account, you can ignore this message.\n",
            user.user_name,
            self.config.verification_ttl.num_minutes(),
            link,
        );

        self.mailer
            .send(user.email.as_str(), "Verify your account", &body)
            .await?;

        tracing::info!(user_id = %user.user_id, "Verification token issued");

        Ok(())
    }

    /// Re-request verification for an email address
    pub async fn resend(&self, email: &str) -> AuthResult<()> {
        let email = Email::new(email)?;
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.is_verified {
            return Err(AuthError::AlreadyVerified);
        }

        self.request(&user).await
    }

    /// Redeem a token: claim it, then mark the owner verified.
    ///
    /// The claim deletes the row in the same statement, so a repeat call
    /// with the same string lands on TokenNotFound, the correct terminal
    /// state for an already-redeemed token.
    pub async fn redeem(&self, token: &str) -> AuthResult<UserId> {
        let claimed = self
            .tokens
            .consume(token)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        if claimed.is_expired(Utc::now()) {
            tracing::debug!(user_id = %claimed.user_id, "Verification token expired at redemption");
            return Err(AuthError::TokenExpired);
        }

        self.users.mark_verified(&claimed.user_id).await?;

        tracing::info!(user_id = %claimed.user_id, "Account verified");

        Ok(claimed.user_id)
    }
}
