//! Password Hashing and Verification
//!
//! - Argon2id hashing (memory-hard, recommended by OWASP)
//! - Zeroization of sensitive data
//! - Constant-time comparison
//! - Optional application-wide pepper

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Constants
// ============================================================================

/// Minimum password length in characters
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum password length in characters
pub const MAX_PASSWORD_LENGTH: usize = 36;

/// Argon2id memory cost in KiB. Together with the time cost this puts a
/// single hash in the hundreds-of-milliseconds range on current hardware.
const ARGON2_MEMORY_KIB: u32 = 64 * 1024;

/// Argon2id iteration count
const ARGON2_ITERATIONS: u32 = 3;

/// Argon2id parallelism
const ARGON2_PARALLELISM: u32 = 1;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    /// Password is too short
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    /// Password is too long
    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    /// Password contains only whitespace
    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    /// Password contains control characters
    #[error("Password contains invalid control characters")]
    InvalidCharacter,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Invalid hash format
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization.
///
/// Does not implement `Clone`; Debug output is redacted. The value is
/// securely erased from memory when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a new clear text password with validation.
    ///
    /// Unicode is normalized using NFKC before length is counted in
    /// code points. Control characters are rejected.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let normalized: String = raw.nfkc().collect();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        let char_count = normalized.chars().count();

        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if normalized.chars().any(|ch| ch.is_control()) {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        Ok(Self(normalized))
    }

    /// Hash this password into PHC string form.
    ///
    /// The optional pepper is mixed into the hashed material and must be
    /// supplied again at verification time.
    pub fn hash(&self, pepper: Option<&[u8]>) -> Result<HashedPassword, PasswordHashError> {
        let material = self.material(pepper);
        let salt = SaltString::generate(&mut OsRng);

        let phc = argon2_instance()
            .hash_password(&material, &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?
            .to_string();

        Ok(HashedPassword(phc))
    }

    /// Password bytes with the pepper appended
    fn material(&self, pepper: Option<&[u8]>) -> Vec<u8> {
        let mut material = self.0.as_bytes().to_vec();
        if let Some(pepper) = pepper {
            material.extend_from_slice(pepper);
        }
        material
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (PHC string, safe to store)
// ============================================================================

/// Hashed password in Argon2id PHC string format.
///
/// Safe to store in the database; parameters and salt are carried inside
/// the string, so verification works across parameter changes.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Restore from a PHC string loaded from storage.
    pub fn from_phc_string(phc: impl Into<String>) -> Result<Self, PasswordHashError> {
        let phc = phc.into();
        PasswordHash::new(&phc).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self(phc))
    }

    /// PHC string for storage.
    pub fn as_phc_string(&self) -> &str {
        &self.0
    }

    /// Verify a clear text password against this hash.
    ///
    /// Comparison inside argon2 is constant-time. The pepper must match
    /// the one used when hashing.
    pub fn verify(&self, clear: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.0) else {
            return false;
        };
        let material = clear.material(pepper);
        argon2_instance()
            .verify_password(&material, &parsed)
            .is_ok()
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

fn argon2_instance() -> Argon2<'static> {
    let params = Params::new(ARGON2_MEMORY_KIB, ARGON2_ITERATIONS, ARGON2_PARALLELISM, None)
        .expect("static Argon2 parameters are valid");
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

// ============================================================================
// Tests
// ============================================================================
