//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. Every flow returns one of these;
//! the presentation layer is the only place they become status codes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed or missing fields
    #[error("{0}")]
    Validation(String),

    /// Username and/or email already taken. The flags report which of the
    /// two fields collided; both may be set.
    #[error("Username or email already exists")]
    Conflict {
        username_taken: bool,
        email_taken: bool,
    },

    /// Unknown login or wrong password. One message for both causes so the
    /// response never confirms whether an account exists.
    #[error("Invalid username/email or password")]
    InvalidCredentials,

    /// Missing or unverifiable access token
    #[error("Unauthorized")]
    Unauthorized,

    /// Refresh session rejected: bad signature, expired, or revoked.
    /// The causes are distinguished in logs only.
    #[error("Session is invalid or expired")]
    SessionInvalid,

    /// Account exists but the email is not verified yet
    #[error("Account is not verified")]
    NotVerified,

    /// Verification requested for an already verified account
    #[error("Account is already verified")]
    AlreadyVerified,

    /// Single-use token matched but its expiry has passed
    #[error("Token has expired")]
    TokenExpired,

    /// Single-use token does not match any live row
    #[error("Token not found")]
    TokenNotFound,

    /// No account for the given email
    #[error("User not found")]
    UserNotFound,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Mail transport failure
    #[error("Mail delivery failed: {0}")]
    Mail(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Conflict { .. } => StatusCode::CONFLICT,
            AuthError::InvalidCredentials
            | AuthError::Unauthorized
            | AuthError::SessionInvalid => StatusCode::UNAUTHORIZED,
            AuthError::NotVerified | AuthError::AlreadyVerified | AuthError::TokenExpired => {
                StatusCode::FORBIDDEN
            }
            AuthError::TokenNotFound | AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Database(_) | AuthError::Mail(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::Conflict { .. } => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::Unauthorized
            | AuthError::SessionInvalid => ErrorKind::Unauthorized,
            AuthError::NotVerified | AuthError::AlreadyVerified | AuthError::TokenExpired => {
                ErrorKind::Forbidden
            }
            AuthError::TokenNotFound | AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::Database(_) | AuthError::Mail(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// True when the wrapped sqlx error is a unique-constraint violation.
    /// Used to detect registration races the pre-insert conflict check
    /// cannot see.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AuthError::Database(sqlx::Error::Database(db_err)) => {
                db_err.code().as_deref() == Some("23505")
            }
            _ => false,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Mail(msg) => {
                tracing::error!(message = %msg, "Auth mail transport error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::SessionInvalid => {
                tracing::debug!("Refresh session rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let mut body = serde_json::json!({
            "status": status.as_u16(),
            "kind": self.kind(),
            "message": self.to_string(),
        });

        // Conflicts additionally say which field(s) collided
        if let AuthError::Conflict {
            username_taken,
            email_taken,
        } = &self
        {
            let mut fields = serde_json::Map::new();
            if *username_taken {
                fields.insert(
                    "username".to_string(),
                    "Username already exists".into(),
                );
            }
            if *email_taken {
                fields.insert("email".to_string(), "Email already exists".into());
            }
            body["fields"] = fields.into();
        }

        (status, Json(body)).into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => AuthError::Validation(err.message().to_string()),
            ErrorKind::NotFound => AuthError::UserNotFound,
            _ => AuthError::Internal(err.to_string()),
        }
    }
}
