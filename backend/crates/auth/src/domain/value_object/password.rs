//! Password Value Objects
//!
//! Domain wrappers over `platform::password`: `RawPassword` is validated
//! user input (zeroized on drop), `PasswordHash` is the Argon2id PHC
//! string stored for the user.

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{ClearTextPassword, HashedPassword, PasswordPolicyError};
use std::fmt;

/// Raw password from user input
///
/// Memory is automatically zeroized when dropped; Debug is redacted.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Create a new raw password with policy validation
    pub fn new(raw: String) -> AppResult<Self> {
        let clear = ClearTextPassword::new(raw).map_err(|e| match e {
            PasswordPolicyError::TooShort { .. }
            | PasswordPolicyError::TooLong { .. }
            | PasswordPolicyError::EmptyOrWhitespace
            | PasswordPolicyError::InvalidCharacter => AppError::bad_request(e.to_string()),
        })?;

        Ok(Self(clear))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

/// Hashed user password for storage
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(HashedPassword);

impl PasswordHash {
    /// Hash a validated raw password. The optional pepper is an
    /// application-wide secret mixed into the hash material.
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> AppResult<Self> {
        let hashed = raw
            .inner()
            .hash(pepper)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;

        Ok(Self(hashed))
    }

    /// Restore from the PHC string stored in the database
    pub fn from_phc_string(phc: impl Into<String>) -> AppResult<Self> {
        let hashed = HashedPassword::from_phc_string(phc)
            .map_err(|_| AppError::internal("Invalid password hash in database"))?;

        Ok(Self(hashed))
    }

    /// PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Constant-time verification of a raw password against this hash
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHash")
            .field("hash", &"[HASH]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_applied() {
        assert!(RawPassword::new("secret1".to_string()).is_ok());
        assert!(RawPassword::new("short".to_string()).is_err());
        assert!(RawPassword::new("x".repeat(100)).is_err());
    }

    #[test]
    fn test_hash_and_verify() {
        let raw = RawPassword::new("secret-password".to_string()).unwrap();
        let hash = PasswordHash::from_raw(&raw, None).unwrap();

        assert!(hash.verify(&raw, None));

        let wrong = RawPassword::new("another-password".to_string()).unwrap();
        assert!(!hash.verify(&wrong, None));
    }

    #[test]
    fn test_storage_roundtrip() {
        let raw = RawPassword::new("roundtrip-pass".to_string()).unwrap();
        let hash = PasswordHash::from_raw(&raw, None).unwrap();

        let restored = PasswordHash::from_phc_string(hash.as_phc_string()).unwrap();
        assert!(restored.verify(&raw, None));
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::new("secret1".to_string()).unwrap();
        assert!(!format!("{:?}", raw).contains("secret1"));
    }
}
