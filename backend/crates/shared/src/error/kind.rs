//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum that maps to HTTP status codes.

use serde::Serialize;

/// Error classification, one variant per HTTP status the API produces.
///
/// Flows return typed errors carrying one of these kinds; the presentation
/// layer is the only place a kind becomes a transport status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 400 - malformed or missing fields
    BadRequest,
    /// 401 - authentication required or credentials rejected
    Unauthorized,
    /// 403 - authenticated but not permitted in the current state
    Forbidden,
    /// 404 - resource or token unknown
    NotFound,
    /// 409 - conflicts with existing state (duplicate username/email)
    Conflict,
    /// 500 - unexpected store/mailer failure
    InternalServerError,
    /// 503 - a backing service is unavailable
    ServiceUnavailable,
}

impl ErrorKind {
    /// Status code and standard reason phrase as one unit, so the two can
    /// never drift apart.
    const fn meta(&self) -> (u16, &'static str) {
        match self {
            ErrorKind::BadRequest => (400, "Bad Request"),
            ErrorKind::Unauthorized => (401, "Unauthorized"),
            ErrorKind::Forbidden => (403, "Forbidden"),
            ErrorKind::NotFound => (404, "Not Found"),
            ErrorKind::Conflict => (409, "Conflict"),
            ErrorKind::InternalServerError => (500, "Internal Server Error"),
            ErrorKind::ServiceUnavailable => (503, "Service Unavailable"),
        }
    }

    /// HTTP status code for this kind.
    #[inline]
    pub const fn status_code(&self) -> u16 {
        self.meta().0
    }

    /// Standard reason phrase for this kind.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.meta().1
    }

    /// 5xx errors. These should be logged at error level.
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[ErrorKind] = &[
        ErrorKind::BadRequest,
        ErrorKind::Unauthorized,
        ErrorKind::Forbidden,
        ErrorKind::NotFound,
        ErrorKind::Conflict,
        ErrorKind::InternalServerError,
        ErrorKind::ServiceUnavailable,
    ];

    #[test]
    fn test_status_codes_are_http_statuses() {
        for kind in ALL {
            let code = kind.status_code();
            assert!((400..=599).contains(&code), "{kind}: {code}");
        }
        assert_eq!(ErrorKind::BadRequest.status_code(), 400);
        assert_eq!(ErrorKind::Conflict.status_code(), 409);
        assert_eq!(ErrorKind::InternalServerError.status_code(), 500);
    }

    #[test]
    fn test_server_errors_are_5xx_only() {
        for kind in ALL {
            assert_eq!(kind.is_server_error(), kind.status_code() >= 500);
        }
    }

    #[test]
    fn test_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorKind::NotFound).unwrap();
        assert_eq!(json, "\"NOT_FOUND\"");
    }
}
