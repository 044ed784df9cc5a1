//! Account Use Case
//!
//! Profile retrieval for the authenticated user, and account deletion.

use std::sync::Arc;

use crate::domain::entity::User;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::UserId;
use crate::error::{AuthError, AuthResult};

/// Account use case
pub struct AccountUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    users: Arc<U>,
    sessions: Arc<S>,
}

impl<U, S> AccountUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(users: Arc<U>, sessions: Arc<S>) -> Self {
        Self { users, sessions }
    }

    /// Load the profile for an authenticated user ID. A valid token whose
    /// account has since been deleted is no longer authorized.
    pub async fn profile(&self, user_id: &UserId) -> AuthResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::Unauthorized)
    }

    /// Delete the account and every session it holds
    pub async fn delete_account(&self, user_id: &UserId) -> AuthResult<()> {
        self.sessions.delete_for_user(user_id).await?;
        self.users.delete(user_id).await?;

        tracing::info!(user_id = %user_id, "Account deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Session;
    use crate::testing::MemoryStore;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_profile_for_live_and_deleted_user() {
        let store = Arc::new(MemoryStore::new());
        let user = store.insert_user("alice", "alice@x.com", "secret1", true).await;
        let use_case = AccountUseCase::new(store.clone(), store.clone());

        let profile = use_case.profile(&user.user_id).await.unwrap();
        assert_eq!(profile.email.as_str(), "alice@x.com");

        use_case.delete_account(&user.user_id).await.unwrap();
        assert!(matches!(
            use_case.profile(&user.user_id).await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_delete_account_revokes_sessions() {
        let store = Arc::new(MemoryStore::new());
        let user = store.insert_user("alice", "alice@x.com", "secret1", true).await;
        store
            .insert_session(Session::new(
                user.user_id,
                "tok".to_string(),
                Utc::now() + Duration::days(30),
            ))
            .await;

        AccountUseCase::new(store.clone(), store.clone())
            .delete_account(&user.user_id)
            .await
            .unwrap();

        assert_eq!(store.session_count().await, 0);
        assert!(store.get_user(&user.user_id).await.is_none());
    }
}
