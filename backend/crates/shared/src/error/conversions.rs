//! Error conversions - From implementations for common error types
//!
//! Library-error conversions into [`AppError`], plus the axum response
//! mapping that renders the shared `{status, kind, message}` envelope.

use super::app_error::AppError;
use super::kind::ErrorKind;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_data() {
            AppError::bad_request(format!("JSON parse error: {}", err)).with_source(err)
        } else {
            AppError::internal("JSON serialization error").with_source(err)
        }
    }
}

// ============================================================================
// SQLx conversions (feature-gated)
// ============================================================================

/// Map a PostgreSQL error class to a kind.
/// https://www.postgresql.org/docs/current/errcodes-appendix.html
#[cfg(feature = "sqlx")]
fn classify_pg_code(code: &str) -> (ErrorKind, &'static str) {
    match code {
        // Class 23 — Integrity Constraint Violation
        "23502" => (ErrorKind::BadRequest, "Required field is null"),
        "23503" => (ErrorKind::Conflict, "Foreign key violation"),
        "23505" => (ErrorKind::Conflict, "Duplicate key value"),
        // Class 53 — Insufficient Resources
        c if c.starts_with("53") => {
            (ErrorKind::ServiceUnavailable, "Database resource exhausted")
        }
        // Class 57 — Operator Intervention (shutdown, query cancel)
        c if c.starts_with("57") => (ErrorKind::ServiceUnavailable, "Database unavailable"),
        _ => (ErrorKind::InternalServerError, "Database error"),
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let app_err = match &err {
            sqlx::Error::RowNotFound => AppError::not_found("Record not found"),
            sqlx::Error::PoolTimedOut => {
                AppError::service_unavailable("Database connection pool exhausted")
            }
            sqlx::Error::Io(_) => AppError::service_unavailable("Database connection error"),
            sqlx::Error::Database(db_err) => match db_err.code() {
                Some(code) => {
                    let (kind, message) = classify_pg_code(code.as_ref());
                    AppError::new(kind, message)
                }
                None => AppError::internal("Database error"),
            },
            _ => AppError::internal("Database error"),
        };

        app_err.with_source(err)
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = serde_json::json!({
            "status": self.status_code(),
            "kind": self.kind(),
            "message": self.message(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_syntax_error_is_client_fault() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let app_err: AppError = json_err.into();
        assert_eq!(app_err.kind(), ErrorKind::BadRequest);
    }

    #[cfg(feature = "sqlx")]
    #[test]
    fn test_pg_code_classes() {
        assert_eq!(classify_pg_code("23505").0, ErrorKind::Conflict);
        assert_eq!(classify_pg_code("23502").0, ErrorKind::BadRequest);
        assert_eq!(classify_pg_code("53300").0, ErrorKind::ServiceUnavailable);
        assert_eq!(classify_pg_code("57P01").0, ErrorKind::ServiceUnavailable);
        assert_eq!(classify_pg_code("42P01").0, ErrorKind::InternalServerError);
    }

    #[cfg(feature = "sqlx")]
    #[test]
    fn test_row_not_found_maps_to_404() {
        let app_err: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(app_err.kind(), ErrorKind::NotFound);
    }
}
