//! Application Error - Unified error type
//!
//! Defines [`AppError`] and the [`AppResult<T>`] alias used across crates.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use super::kind::ErrorKind;

/// Unified application error: a classification plus a user-facing message,
/// optionally wrapping the underlying cause for logs.
///
/// ## Examples
/// ```rust
/// use kernel::error::app_error::AppError;
///
/// let err = AppError::not_found("Token not found");
/// assert_eq!(err.status_code(), 404);
/// ```
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

/// Shorthand for `Result<T, AppError>`.
pub type AppResult<T> = Result<T, AppError>;

/// One constructor per kind the flows actually produce.
macro_rules! kind_constructors {
    ($( $(#[$doc:meta])* $name:ident => $kind:ident ),* $(,)?) => {
        $(
            $(#[$doc])*
            #[inline]
            pub fn $name(message: impl Into<Cow<'static, str>>) -> Self {
                Self::new(ErrorKind::$kind, message)
            }
        )*
    };
}

impl AppError {
    /// Create a new error with an explicit kind.
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    kind_constructors! {
        /// 400 Bad Request
        bad_request => BadRequest,
        /// 403 Forbidden
        forbidden => Forbidden,
        /// 404 Not Found
        not_found => NotFound,
        /// 409 Conflict
        conflict => Conflict,
        /// 500 Internal Server Error
        internal => InternalServerError,
        /// 503 Service Unavailable
        service_unavailable => ServiceUnavailable,
    }

    /// Attach the underlying cause (kept out of responses, surfaced in logs).
    #[inline]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn is_server_error(&self) -> bool {
        self.kind.is_server_error()
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("AppError");
        builder.field("kind", &self.kind);
        builder.field("message", &self.message);
        if let Some(source) = &self.source {
            builder.field("source", source);
        }
        builder.finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_carries_status() {
        let err = AppError::new(ErrorKind::NotFound, "User not found");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.message(), "User not found");
    }

    #[test]
    fn test_constructors_map_to_kinds() {
        assert_eq!(AppError::bad_request("x").status_code(), 400);
        assert_eq!(AppError::forbidden("x").status_code(), 403);
        assert_eq!(AppError::not_found("x").status_code(), 404);
        assert_eq!(AppError::conflict("x").status_code(), 409);
        assert_eq!(AppError::internal("x").status_code(), 500);
        assert_eq!(AppError::service_unavailable("x").status_code(), 503);
        assert!(AppError::internal("x").is_server_error());
        assert!(!AppError::conflict("x").is_server_error());
    }

    #[test]
    fn test_source_is_preserved_for_logs() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = AppError::internal("Failed to read file").with_source(io_err);
        assert!(err.source().is_some());

        // Display stays user-facing: kind and message, no cause
        assert_eq!(err.to_string(), "[Internal Server Error] Failed to read file");
    }
}
