//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, ports, token codec
//! - `application/` - Use cases, config, background janitor
//! - `infra/` - PostgreSQL store, SMTP mailer
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Registration gated by single-use email verification tokens
//! - Sign-in with username or email against Argon2id hashes
//! - Short-lived access JWTs + long-lived refresh sessions (distinct
//!   signing secrets; revocation checked against the session store, not
//!   the signature alone)
//! - Multi-session tracking with single and bulk revocation
//! - Single-use, time-boxed password-reset tokens
//! - Daily janitor purging expired sessions/tokens and stale unverified
//!   accounts

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::janitor::{Janitor, run_sweep};
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthStore;
pub use infra::smtp::AnyMailer;
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::domain::repository::*;
    pub use crate::infra::postgres::PgAuthStore;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
