//! Password Reset Use Case
//!
//! Mirrors the verification flow's one-live-token and single-use contract,
//! but redemption replaces the password hash instead of flipping the
//! verification flag, and it revokes every session the user holds so a
//! stolen refresh token dies with the old password. Reset is independent
//! of verification status.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::domain::entity::OneTimeToken;
use crate::domain::mailer::Mailer;
use crate::domain::repository::{ResetTokenRepository, SessionRepository, UserRepository};
use crate::domain::value_object::{Email, PasswordHash, RawPassword, UserId};
use crate::error::{AuthError, AuthResult};

/// Password reset use case
pub struct PasswordResetUseCase<U, R, S, M>
where
    U: UserRepository,
    R: ResetTokenRepository,
    S: SessionRepository,
    M: Mailer,
{
    users: Arc<U>,
    tokens: Arc<R>,
    sessions: Arc<S>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<U, R, S, M> PasswordResetUseCase<U, R, S, M>
where
    U: UserRepository,
    R: ResetTokenRepository,
    S: SessionRepository,
    M: Mailer,
{
    pub fn new(
        users: Arc<U>,
        tokens: Arc<R>,
        sessions: Arc<S>,
        mailer: Arc<M>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            users,
            tokens,
            sessions,
            mailer,
            config,
        }
    }

    /// Issue a reset token for the account behind this email and queue the
    /// reset mail. Lookup is by email only.
    pub async fn request(&self, email: &str) -> AuthResult<()> {
        let email = Email::new(email)?;
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let token = OneTimeToken::issue(user.user_id, self.config.reset_ttl);
        self.tokens.replace_for_user(&token).await?;

        let link = format!("{}/reset_password/{}", self.config.base_url, token.token);
        let body = format!(
            "Hello {},\n\n\
             A password reset was requested for your account. Open the link \
             below to choose a new password. The link expires in {} minutes.\n\n{}\n\n\
             If you did not request this, you can ignore this message; your \
             password is unchanged.\n",
            user.user_name,
            self.config.reset_ttl.num_minutes(),
            link,
        );

        self.mailer
            .send(user.email.as_str(), "Reset your password", &body)
            .await?;

        tracing::info!(user_id = %user.user_id, "Password reset token issued");

        Ok(())
    }

    /// Read-only probe used by the client to decide whether to render the
    /// reset form. Mutates nothing.
    pub async fn check(&self, token: &str) -> AuthResult<()> {
        let found = self
            .tokens
            .find_by_token(token)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        if found.is_expired(Utc::now()) {
            return Err(AuthError::TokenExpired);
        }

        Ok(())
    }

    /// Redeem the token and set the new password.
    ///
    /// Input is validated before the token is claimed so a policy failure
    /// does not burn the single use.
    pub async fn redeem(
        &self,
        token: &str,
        new_password: String,
        confirm_password: String,
    ) -> AuthResult<UserId> {
        if new_password != confirm_password {
            return Err(AuthError::Validation("Passwords must match".to_string()));
        }
        let raw = RawPassword::new(new_password)?;

        let claimed = self
            .tokens
            .consume(token)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        if claimed.is_expired(Utc::now()) {
            tracing::debug!(user_id = %claimed.user_id, "Reset token expired at redemption");
            return Err(AuthError::TokenExpired);
        }

        let hash = PasswordHash::from_raw(&raw, self.config.pepper())?;
        self.users
            .update_password_hash(&claimed.user_id, &hash)
            .await?;

        // Force re-authentication everywhere the old password was used
        let revoked = self.sessions.delete_for_user(&claimed.user_id).await?;

        tracing::info!(
            user_id = %claimed.user_id,
            sessions_revoked = revoked,
            "Password reset completed"
        );

        Ok(claimed.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sign_in::{SignInInput, SignInUseCase};
    use crate::testing::{MemoryStore, RecordingMailer};
    use chrono::Duration;

    struct Fixture {
        store: Arc<MemoryStore>,
        mailer: Arc<RecordingMailer>,
        config: Arc<AuthConfig>,
        use_case: PasswordResetUseCase<MemoryStore, MemoryStore, MemoryStore, RecordingMailer>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(RecordingMailer::new());
        let config = Arc::new(AuthConfig::default());
        let use_case = PasswordResetUseCase::new(
            store.clone(),
            store.clone(),
            store.clone(),
            mailer.clone(),
            config.clone(),
        );
        Fixture {
            store,
            mailer,
            config,
            use_case,
        }
    }

    #[tokio::test]
    async fn test_request_requires_known_email() {
        let f = fixture();
        let result = f.use_case.request("ghost@x.com").await;
        assert!(matches!(result, Err(AuthError::UserNotFound)));
        assert_eq!(f.mailer.count().await, 0);
    }

    #[tokio::test]
    async fn test_second_request_invalidates_first_token() {
        let f = fixture();
        let user = f.store.insert_user("alice", "alice@x.com", "secret1", true).await;

        f.use_case.request("alice@x.com").await.unwrap();
        let first = f.store.reset_token_for(&user.user_id).await.unwrap();

        f.use_case.request("alice@x.com").await.unwrap();

        let redeemed_old = f
            .use_case
            .redeem(&first.token, "newpass1".to_string(), "newpass1".to_string())
            .await;
        assert!(matches!(redeemed_old, Err(AuthError::TokenNotFound)));
    }

    #[tokio::test]
    async fn test_redeem_changes_password_and_revokes_sessions() {
        let f = fixture();
        f.store.insert_user("alice", "alice@x.com", "secret1", true).await;
        let user = f.store.find_user_by_email("alice@x.com").await.unwrap();

        // Two live sessions before the reset
        let sign_in = SignInUseCase::new(f.store.clone(), f.store.clone(), f.config.clone());
        for _ in 0..2 {
            sign_in
                .execute(SignInInput {
                    login: "alice".to_string(),
                    password: "secret1".to_string(),
                })
                .await
                .unwrap();
        }
        assert_eq!(f.store.session_count().await, 2);

        f.use_case.request("alice@x.com").await.unwrap();
        let token = f.store.reset_token_for(&user.user_id).await.unwrap();
        f.use_case
            .redeem(&token.token, "newpass1".to_string(), "newpass1".to_string())
            .await
            .unwrap();

        assert_eq!(f.store.session_count().await, 0);

        // Old password is dead, new one works
        assert!(matches!(
            sign_in
                .execute(SignInInput {
                    login: "alice".to_string(),
                    password: "secret1".to_string(),
                })
                .await,
            Err(AuthError::InvalidCredentials)
        ));
        sign_in
            .execute(SignInInput {
                login: "alice".to_string(),
                password: "newpass1".to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reset_does_not_require_verification() {
        let f = fixture();
        let user = f.store.insert_user("alice", "alice@x.com", "secret1", false).await;

        f.use_case.request("alice@x.com").await.unwrap();
        let token = f.store.reset_token_for(&user.user_id).await.unwrap();
        f.use_case
            .redeem(&token.token, "newpass1".to_string(), "newpass1".to_string())
            .await
            .unwrap();

        // Verification state is untouched by a reset
        assert!(!f.store.get_user(&user.user_id).await.unwrap().is_verified);
    }

    #[tokio::test]
    async fn test_check_is_read_only() {
        let f = fixture();
        let user = f.store.insert_user("alice", "alice@x.com", "secret1", true).await;
        f.use_case.request("alice@x.com").await.unwrap();
        let token = f.store.reset_token_for(&user.user_id).await.unwrap();

        f.use_case.check(&token.token).await.unwrap();
        f.use_case.check(&token.token).await.unwrap();

        // Probing never consumes the token
        assert!(f.store.reset_token_for(&user.user_id).await.is_some());

        assert!(matches!(
            f.use_case.check("unknown").await,
            Err(AuthError::TokenNotFound)
        ));
    }

    #[tokio::test]
    async fn test_bad_input_does_not_burn_the_token() {
        let f = fixture();
        let user = f.store.insert_user("alice", "alice@x.com", "secret1", true).await;
        f.use_case.request("alice@x.com").await.unwrap();
        let token = f.store.reset_token_for(&user.user_id).await.unwrap();

        // Mismatch and policy failures are rejected before the claim
        assert!(matches!(
            f.use_case
                .redeem(&token.token, "newpass1".to_string(), "different".to_string())
                .await,
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            f.use_case
                .redeem(&token.token, "tiny".to_string(), "tiny".to_string())
                .await,
            Err(AuthError::Validation(_))
        ));

        // Token is still live and redeems fine afterwards
        f.use_case
            .redeem(&token.token, "newpass1".to_string(), "newpass1".to_string())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_expired_token_is_distinct_from_unknown() {
        let f = fixture();
        let user = f.store.insert_user("alice", "alice@x.com", "secret1", true).await;

        let mut token = OneTimeToken::issue(user.user_id, Duration::hours(1));
        token.expires_at = Utc::now() - Duration::minutes(1);
        let token_string = token.token.clone();
        f.store.insert_reset_token(token).await;

        assert!(matches!(
            f.use_case.check(&token_string).await,
            Err(AuthError::TokenExpired)
        ));
        assert!(matches!(
            f.use_case
                .redeem(&token_string, "newpass1".to_string(), "newpass1".to_string())
                .await,
            Err(AuthError::TokenExpired)
        ));
    }
}
