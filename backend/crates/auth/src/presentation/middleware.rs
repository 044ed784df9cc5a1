//! Auth Middleware
//!
//! Verifies the bearer access token and attaches the resolved identity to
//! the request as a typed extension value, scoped to this request only.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::application::config::AuthConfig;
use crate::domain::token::TokenKind;
use crate::domain::value_object::UserId;
use crate::error::AuthError;

/// Authenticated identity attached to the request by [`require_auth`]
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: UserId,
}

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState {
    pub config: Arc<AuthConfig>,
}

/// Middleware that requires a valid bearer access token.
///
/// Every internal failure (missing header, bad signature, expired token)
/// collapses into one unauthorized response.
pub async fn require_auth(
    State(state): State<AuthMiddlewareState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| AuthError::Unauthorized.into_response())?;

    let user_id = state
        .config
        .codec()
        .verify(&token, TokenKind::Access)
        .map_err(|e| {
            tracing::debug!(cause = %e, "Access token rejected");
            AuthError::Unauthorized.into_response()
        })?;

    req.extensions_mut().insert(CurrentUser { user_id });

    Ok(next.run(req).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_bearer_token_missing_or_malformed() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(bearer_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
