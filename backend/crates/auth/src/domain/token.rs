//! Token Codec
//!
//! Stateless signer/verifier for bearer tokens. Access and refresh tokens
//! are HS256 JWTs signed with distinct secrets, so compromise of the
//! access secret cannot forge refresh tokens. Signing and verification are
//! pure functions with no I/O; a verifiable signature says nothing about
//! revocation, which the session registry owns.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind as JwtErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::value_object::UserId;

/// Which of the two token families a string claims to belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    /// Claim discriminator; a token of one kind never verifies as the other
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Verification outcome for a rejected token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signature does not verify, payload is malformed, or the kind
    /// discriminator does not match
    #[error("token is invalid")]
    Invalid,

    /// Signature verifies but the TTL has lapsed
    #[error("token has expired")]
    Expired,

    /// Encoding failed (key material problem)
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Owning user ID
    sub: String,
    /// Unique token ID
    jti: String,
    /// Kind discriminator ("access" / "refresh")
    token_use: String,
    /// Issued at (Unix seconds)
    iat: i64,
    /// Expiry (Unix seconds)
    exp: i64,
}

/// A signed token together with the expiry baked into it
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Stateless bearer-token codec
#[derive(Clone)]
pub struct TokenCodec {
    access_secret: Vec<u8>,
    refresh_secret: Vec<u8>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    pub fn new(
        access_secret: impl Into<Vec<u8>>,
        refresh_secret: impl Into<Vec<u8>>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Issue a short-lived access token
    pub fn issue_access(&self, user_id: &UserId) -> Result<IssuedToken, TokenError> {
        self.issue(user_id, TokenKind::Access)
    }

    /// Issue a long-lived refresh token
    pub fn issue_refresh(&self, user_id: &UserId) -> Result<IssuedToken, TokenError> {
        self.issue(user_id, TokenKind::Refresh)
    }

    fn issue(&self, user_id: &UserId, kind: TokenKind) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();
        let expires_at = now + self.ttl(kind);

        let claims = Claims {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            token_use: kind.as_str().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret(kind)),
        )
        .map_err(|e| TokenError::Encoding(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a token of the expected kind and extract the owning user.
    ///
    /// Expiry is checked with zero leeway so tests and the janitor agree
    /// with the wall clock.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<UserId, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret(kind)),
            &validation,
        )
        .map_err(|e| match e.kind() {
            JwtErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;

        if data.claims.token_use != kind.as_str() {
            return Err(TokenError::Invalid);
        }

        let uuid: Uuid = data.claims.sub.parse().map_err(|_| TokenError::Invalid)?;
        Ok(UserId::from_uuid(uuid))
    }

    fn secret(&self, kind: TokenKind) -> &[u8] {
        match kind {
            TokenKind::Access => &self.access_secret,
            TokenKind::Refresh => &self.refresh_secret,
        }
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(
            b"access-secret".to_vec(),
            b"refresh-secret".to_vec(),
            Duration::minutes(30),
            Duration::days(30),
        )
    }

    #[test]
    fn test_roundtrip_per_kind() {
        let codec = codec();
        let user_id = UserId::new();

        let access = codec.issue_access(&user_id).unwrap();
        assert_eq!(codec.verify(&access.token, TokenKind::Access).unwrap(), user_id);

        let refresh = codec.issue_refresh(&user_id).unwrap();
        assert_eq!(
            codec.verify(&refresh.token, TokenKind::Refresh).unwrap(),
            user_id
        );
    }

    #[test]
    fn test_kinds_do_not_cross_verify() {
        let codec = codec();
        let user_id = UserId::new();

        let access = codec.issue_access(&user_id).unwrap();
        let refresh = codec.issue_refresh(&user_id).unwrap();

        // Distinct secrets: the signature itself fails across kinds
        assert_eq!(
            codec.verify(&access.token, TokenKind::Refresh),
            Err(TokenError::Invalid)
        );
        assert_eq!(
            codec.verify(&refresh.token, TokenKind::Access),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_kind_discriminator_checked_even_with_same_secret() {
        // Same secret for both kinds: the token_use claim must still
        // prevent cross-kind acceptance.
        let codec = TokenCodec::new(
            b"shared".to_vec(),
            b"shared".to_vec(),
            Duration::minutes(30),
            Duration::days(30),
        );
        let user_id = UserId::new();

        let access = codec.issue_access(&user_id).unwrap();
        assert_eq!(
            codec.verify(&access.token, TokenKind::Refresh),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let codec_a = codec();
        let codec_b = TokenCodec::new(
            b"other-access".to_vec(),
            b"other-refresh".to_vec(),
            Duration::minutes(30),
            Duration::days(30),
        );

        let token = codec_a.issue_access(&UserId::new()).unwrap();
        assert_eq!(
            codec_b.verify(&token.token, TokenKind::Access),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_malformed_token_rejected() {
        let codec = codec();
        assert_eq!(
            codec.verify("not-a-jwt", TokenKind::Access),
            Err(TokenError::Invalid)
        );
        assert_eq!(codec.verify("", TokenKind::Access), Err(TokenError::Invalid));
    }

    #[test]
    fn test_expired_token_is_distinct_outcome() {
        let codec = codec();
        let now = Utc::now();

        // Hand-craft a token whose exp is already in the past
        let claims = Claims {
            sub: UserId::new().to_string(),
            jti: Uuid::new_v4().to_string(),
            token_use: "access".to_string(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&codec.access_secret),
        )
        .unwrap();

        assert_eq!(
            codec.verify(&token, TokenKind::Access),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_issued_expiry_matches_ttl() {
        let codec = codec();
        let issued = codec.issue_access(&UserId::new()).unwrap();
        let delta = issued.expires_at - Utc::now();

        assert!(delta <= Duration::minutes(30));
        assert!(delta > Duration::minutes(29));
    }
}
