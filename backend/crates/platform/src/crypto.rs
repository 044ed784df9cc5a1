//! Cryptographic Utilities
//!
//! Random material for single-use tokens. Generation goes through the
//! operating system CSPRNG.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rngs::OsRng};

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generate an unguessable URL-safe token string from `len` random bytes.
///
/// Encoded as unpadded base64url so it can travel inside an emailed link
/// without escaping.
pub fn random_url_token(len: usize) -> String {
    URL_SAFE_NO_PAD.encode(random_bytes(len))
}
