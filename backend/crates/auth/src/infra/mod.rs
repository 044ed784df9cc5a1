//! Infrastructure Layer
//!
//! PostgreSQL store and SMTP mailer implementations of the domain ports.

pub mod postgres;
pub mod smtp;

pub use postgres::PgAuthStore;
pub use smtp::{AnyMailer, LogMailer, SmtpConfig, SmtpMailer};
