//! User Name Value Object
//!
//! Public handle used for login and display.
//!
//! ## Invariants
//! - 3 to 30 characters after NFKC normalization
//! - ASCII lowercase letters, digits, `_`, `.`, `-` (case preserved for
//!   display, lowercased for uniqueness)
//! - starts and ends with a letter, digit, or `_`
//! - no consecutive dots, at least one letter or digit
//! - not a reserved route/system word

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Minimum length for user name (in characters)
pub const USER_NAME_MIN_LENGTH: usize = 3;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 30;

const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-'];

/// Names that collide with routes or system accounts
const RESERVED_WORDS: &[&str] = &[
    "admin",
    "administrator",
    "root",
    "system",
    "support",
    "api",
    "auth",
    "login",
    "logout",
    "signin",
    "signout",
    "signup",
    "register",
    "password",
    "reset",
    "verify",
    "user",
    "users",
    "account",
    "settings",
    "me",
    "anonymous",
    "guest",
    "null",
    "undefined",
];

/// Error returned when user name validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    Empty,
    TooShort { length: usize, min: usize },
    TooLong { length: usize, max: usize },
    InvalidCharacter { char: char, position: usize },
    InvalidStart { char: char },
    InvalidEnd { char: char },
    ConsecutiveDots,
    NoAlphanumeric,
    Reserved { word: String },
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Username cannot be empty"),
            Self::TooShort { length, min } => {
                write!(f, "Username is too short ({length} chars, minimum {min})")
            }
            Self::TooLong { length, max } => {
                write!(f, "Username is too long ({length} chars, maximum {max})")
            }
            Self::InvalidCharacter { char, position } => {
                write!(
                    f,
                    "Invalid character '{char}' at position {position}. Only a-z, 0-9, _, ., - are allowed"
                )
            }
            Self::InvalidStart { char } => {
                write!(f, "Username cannot start with '{char}'")
            }
            Self::InvalidEnd { char } => {
                write!(f, "Username cannot end with '{char}'")
            }
            Self::ConsecutiveDots => {
                write!(f, "Username cannot contain consecutive dots (..)")
            }
            Self::NoAlphanumeric => {
                write!(f, "Username must contain at least one letter or digit")
            }
            Self::Reserved { word } => {
                write!(f, "'{word}' is a reserved username")
            }
        }
    }
}

impl std::error::Error for UserNameError {}

/// Validated, normalized user name
///
/// `original` preserves the case the user typed; `canonical` is the
/// lowercase form used for uniqueness checks and lookups.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName {
    original: String,
    canonical: String,
}

impl UserName {
    /// Create a new UserName from raw input (trim, NFKC, validate)
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let original: String = input.as_ref().nfkc().collect::<String>().trim().to_string();
        let canonical = original.to_lowercase();
        Self::validate(&canonical)?;
        Ok(Self {
            original,
            canonical,
        })
    }

    /// Original user input (preserves case)
    #[inline]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Canonical (lowercase) form used for uniqueness
    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Create from a database value (already validated on the way in)
    pub fn from_db(original: impl Into<String>) -> Self {
        let original = original.into();
        let canonical = original.to_lowercase();
        Self {
            original,
            canonical,
        }
    }

    fn validate(canonical: &str) -> Result<(), UserNameError> {
        if canonical.is_empty() {
            return Err(UserNameError::Empty);
        }

        let length = canonical.chars().count();
        if length < USER_NAME_MIN_LENGTH {
            return Err(UserNameError::TooShort {
                length,
                min: USER_NAME_MIN_LENGTH,
            });
        }
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        for (pos, ch) in canonical.chars().enumerate() {
            if !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || ALLOWED_SPECIAL_CHARS.contains(&ch))
            {
                return Err(UserNameError::InvalidCharacter {
                    char: ch,
                    position: pos,
                });
            }
        }

        let first = canonical.chars().next().unwrap();
        if !Self::is_valid_edge_char(first) {
            return Err(UserNameError::InvalidStart { char: first });
        }
        let last = canonical.chars().next_back().unwrap();
        if !Self::is_valid_edge_char(last) {
            return Err(UserNameError::InvalidEnd { char: last });
        }

        if canonical.contains("..") {
            return Err(UserNameError::ConsecutiveDots);
        }

        if !canonical.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(UserNameError::NoAlphanumeric);
        }

        if RESERVED_WORDS.iter().any(|&w| w == canonical) {
            return Err(UserNameError::Reserved {
                word: canonical.to_string(),
            });
        }

        Ok(())
    }

    #[inline]
    fn is_valid_edge_char(c: char) -> bool {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserName")
            .field("original", &self.original)
            .field("canonical", &self.canonical)
            .finish()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.canonical
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.original
    }
}
