//! Platform - Shared Infrastructure Utilities
//!
//! Cross-cutting technical concerns with no domain knowledge:
//! - `password`: Argon2id hashing and password policy
//! - `crypto`: random token generation
//! - `cookie`: session cookie construction and extraction

pub mod cookie;
pub mod crypto;
pub mod password;
