//! Application Configuration

use chrono::Duration;
use std::time::Duration as StdDuration;

use platform::cookie::{CookiePolicy, SameSite};

use crate::domain::token::TokenCodec;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret for signing access tokens (distinct from the refresh secret)
    pub access_secret: Vec<u8>,
    /// Secret for signing refresh tokens
    pub refresh_secret: Vec<u8>,
    /// Access token TTL (30 minutes)
    pub access_ttl: Duration,
    /// Refresh token / session TTL (30 days)
    pub refresh_ttl: Duration,
    /// Email-verification token TTL (1 hour)
    pub verification_ttl: Duration,
    /// Password-reset token TTL (1 hour)
    pub reset_ttl: Duration,
    /// Unverified accounts older than this are swept (24 hours)
    pub unverified_max_age: Duration,
    /// Janitor cadence (once daily)
    pub janitor_interval: StdDuration,
    /// Policy for the refresh-token cookie
    pub refresh_cookie: CookiePolicy,
    /// Public base URL used in emailed links
    pub base_url: String,
    /// Optional application-wide password pepper
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: vec![0u8; 32],
            refresh_secret: vec![0u8; 32],
            access_ttl: Duration::minutes(30),
            refresh_ttl: Duration::days(30),
            verification_ttl: Duration::hours(1),
            reset_ttl: Duration::hours(1),
            unverified_max_age: Duration::hours(24),
            janitor_interval: StdDuration::from_secs(24 * 3600),
            refresh_cookie: CookiePolicy {
                name: "refresh_token".to_string(),
                secure: true,
                same_site: SameSite::Strict,
                path: "/".to_string(),
            },
            base_url: "http://localhost:3000".to_string(),
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Create config with random signing secrets
    pub fn with_random_secrets() -> Self {
        use rand::RngCore;

        let mut access = vec![0u8; 32];
        let mut refresh = vec![0u8; 32];
        rand::rng().fill_bytes(&mut access);
        rand::rng().fill_bytes(&mut refresh);

        Self {
            access_secret: access,
            refresh_secret: refresh,
            ..Default::default()
        }
    }

    /// Config for development (insecure cookie, random secrets)
    pub fn development() -> Self {
        let mut config = Self::with_random_secrets();
        config.refresh_cookie.secure = false;
        config
    }

    /// Build the stateless token codec from this config
    pub fn codec(&self) -> TokenCodec {
        TokenCodec::new(
            self.access_secret.clone(),
            self.refresh_secret.clone(),
            self.access_ttl,
            self.refresh_ttl,
        )
    }

    /// Refresh cookie Max-Age in seconds
    pub fn refresh_max_age_secs(&self) -> u64 {
        self.refresh_ttl.num_seconds().max(0) as u64
    }

    /// Password pepper as a slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}
