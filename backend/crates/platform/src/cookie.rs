//! Cookie Management Infrastructure
//!
//! Construction and extraction of the session cookie. The cookie value is
//! opaque to this module; policy attributes come from the caller's config.

use axum::http::{HeaderMap, header};

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Policy for a single named cookie.
///
/// HttpOnly is unconditional: every cookie this service sets carries a
/// bearer credential and must be invisible to scripts.
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    pub name: String,
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            name: "session".to_string(),
            secure: true,
            same_site: SameSite::Lax,
            path: "/".to_string(),
        }
    }
}

impl CookiePolicy {
    /// Build a Set-Cookie header value carrying `value` for `max_age_secs`.
    pub fn set(&self, value: &str, max_age_secs: u64) -> String {
        format!(
            "{}={}; HttpOnly; Path={}; Max-Age={}{}; SameSite={}",
            self.name,
            value,
            self.path,
            max_age_secs,
            if self.secure { "; Secure" } else { "" },
            self.same_site.as_str(),
        )
    }

    /// Build a Set-Cookie header value that removes the cookie.
    pub fn clear(&self) -> String {
        format!(
            "{}=; HttpOnly; Path={}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT{}; SameSite={}",
            self.name,
            self.path,
            if self.secure { "; Secure" } else { "" },
            self.same_site.as_str(),
        )
    }
}

/// Extract a cookie value from request headers
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;

            if key == name {
                Some(value.to_string())
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_set_cookie_attributes() {
        let policy = CookiePolicy {
            name: "refresh_token".to_string(),
            secure: true,
            same_site: SameSite::Strict,
            path: "/".to_string(),
        };

        let cookie = policy.set("abc123", 2_592_000);
        assert!(cookie.starts_with("refresh_token=abc123"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=2592000"));
    }

    #[test]
    fn test_insecure_dev_cookie() {
        let policy = CookiePolicy {
            secure: false,
            ..CookiePolicy::default()
        };
        let cookie = policy.set("v", 60);
        assert!(!cookie.contains("Secure"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn test_clear_cookie() {
        let policy = CookiePolicy::default();
        let cookie = policy.clear();
        assert!(cookie.starts_with("session=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("Expires=Thu, 01 Jan 1970"));
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; refresh_token=abc123; other=xyz"),
        );

        assert_eq!(
            extract_cookie(&headers, "refresh_token"),
            Some("abc123".to_string())
        );
        assert_eq!(extract_cookie(&headers, "foo"), Some("bar".to_string()));
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }
}
