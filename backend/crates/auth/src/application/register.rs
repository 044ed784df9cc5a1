//! Register Use Case
//!
//! Creates a new, unverified user account with per-field conflict
//! reporting, and backs the standalone availability check.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::User;
use crate::domain::repository::{FieldConflicts, UserRepository};
use crate::domain::value_object::{Email, PasswordHash, RawPassword, UserName};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Register use case
pub struct RegisterUseCase<U>
where
    U: UserRepository,
{
    users: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> RegisterUseCase<U>
where
    U: UserRepository,
{
    pub fn new(users: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { users, config }
    }

    /// Create the account. Returns the persisted user so the caller can
    /// start the verification flow.
    pub async fn execute(&self, input: RegisterInput) -> AuthResult<User> {
        if input.password != input.confirm_password {
            return Err(AuthError::Validation("Passwords must match".to_string()));
        }

        let user_name =
            UserName::new(&input.user_name).map_err(|e| AuthError::Validation(e.to_string()))?;
        let email = Email::new(&input.email)?;
        let raw = RawPassword::new(input.password)?;

        let conflicts = self.users.conflicts(&user_name, &email).await?;
        if conflicts.any() {
            return Err(conflict_error(conflicts));
        }

        let password_hash = PasswordHash::from_raw(&raw, self.config.pepper())?;
        let user = User::new(user_name, email, password_hash);

        if let Err(e) = self.users.create(&user).await {
            // Two concurrent registrations can both pass the pre-insert
            // check; the unique index decides, and we re-read which field
            // lost the race.
            if e.is_unique_violation() {
                let conflicts = self.users.conflicts(&user.user_name, &user.email).await?;
                return Err(conflict_error(conflicts));
            }
            return Err(e);
        }

        tracing::info!(
            user_id = %user.user_id,
            user_name = %user.user_name,
            "User registered"
        );

        Ok(user)
    }

    /// Standalone availability probe for the sign-up form
    pub async fn check_availability(&self, user_name: &str, email: &str) -> AuthResult<()> {
        let user_name =
            UserName::new(user_name).map_err(|e| AuthError::Validation(e.to_string()))?;
        let email = Email::new(email)?;

        let conflicts = self.users.conflicts(&user_name, &email).await?;
        if conflicts.any() {
            return Err(conflict_error(conflicts));
        }

        Ok(())
    }
}

fn conflict_error(conflicts: FieldConflicts) -> AuthError {
    AuthError::Conflict {
        username_taken: conflicts.username_taken,
        email_taken: conflicts.email_taken,
    }
}
