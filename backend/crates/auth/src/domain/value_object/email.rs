//! Email Value Object
//!
//! Syntactic validation only; proof of ownership comes from the
//! verification flow. Addresses are lowercased on the way in so the
//! store's uniqueness constraint compares one canonical form.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// RFC 5321 limits: whole address, then the part before the '@'
const MAX_ADDRESS_LEN: usize = 254;
const MAX_LOCAL_LEN: usize = 64;

/// Email address value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Validate and normalize an address
    pub fn new(email: impl Into<String>) -> AppResult<Self> {
        let email = email.into().trim().to_lowercase();

        if email.is_empty() {
            return Err(AppError::bad_request("Email cannot be empty"));
        }
        if email.len() > MAX_ADDRESS_LEN {
            return Err(AppError::bad_request(format!(
                "Email must be at most {} characters",
                MAX_ADDRESS_LEN
            )));
        }

        let Some((local, domain)) = email.split_once('@') else {
            return Err(AppError::bad_request("Invalid email format"));
        };
        if local.is_empty() || local.len() > MAX_LOCAL_LEN || !domain_is_plausible(domain) {
            return Err(AppError::bad_request("Invalid email format"));
        }

        Ok(Self(email))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    /// Get the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The domain must look like a dotted hostname: two or more labels, each
/// alphanumeric-or-hyphen with no hyphen at either edge. A second '@'
/// lands in the domain and fails the label charset check.
fn domain_is_plausible(domain: &str) -> bool {
    let mut labels = 0;

    for label in domain.split('.') {
        if label.is_empty()
            || label.starts_with('-')
            || label.ends_with('-')
            || !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return false;
        }
        labels += 1;
    }

    labels >= 2
}

impl FromStr for Email {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Email::new(s)
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
