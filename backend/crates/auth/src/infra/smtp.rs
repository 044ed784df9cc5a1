//! Mailer Implementations
//!
//! `SmtpMailer` delivers over SMTP via lettre; `LogMailer` writes to the
//! log for development. `AnyMailer` lets the binary pick at startup.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::mailer::Mailer;
use crate::error::{AuthError, AuthResult};

/// SMTP transport configuration
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// From address, e.g. "Notes <no-reply@example.com>"
    pub from: String,
}

impl SmtpConfig {
    /// Read from environment variables. Returns `None` when SMTP_HOST is
    /// not set, letting the binary fall back to the log mailer.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok()?;

        Some(Self {
            host,
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
            password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
            from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "Notes <no-reply@localhost>".to_string()),
        })
    }
}

/// Lettre-backed SMTP mailer
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> AuthResult<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|_| AuthError::Internal("Invalid MAIL_FROM address".to_string()))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| AuthError::Internal(format!("SMTP relay setup failed: {}", e)))?
            .port(config.port)
            .credentials(Credentials::new(config.username, config.password))
            .build();

        Ok(Self { transport, from })
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AuthResult<()> {
        let recipient: Mailbox = to
            .parse()
            .map_err(|_| AuthError::Mail(format!("Invalid recipient address: {}", to)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AuthError::Mail(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AuthError::Mail(e.to_string()))?;

        tracing::debug!(to = %to, subject = %subject, "Mail sent");

        Ok(())
    }
}

/// Development mailer: the message only reaches the log
pub struct LogMailer;

impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AuthResult<()> {
        tracing::info!(to = %to, subject = %subject, "Mail delivery suppressed (log mailer)");
        tracing::debug!(body = %body, "Suppressed mail body");
        Ok(())
    }
}

/// Runtime-selected mailer
pub enum AnyMailer {
    Smtp(SmtpMailer),
    Log(LogMailer),
}

impl AnyMailer {
    /// SMTP when configured in the environment, log otherwise
    pub fn from_env() -> AuthResult<Self> {
        match SmtpConfig::from_env() {
            Some(config) => {
                tracing::info!(host = %config.host, "Using SMTP mailer");
                Ok(AnyMailer::Smtp(SmtpMailer::new(config)?))
            }
            None => {
                tracing::warn!("SMTP_HOST not set; outbound mail goes to the log only");
                Ok(AnyMailer::Log(LogMailer))
            }
        }
    }
}

impl Mailer for AnyMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AuthResult<()> {
        match self {
            AnyMailer::Smtp(mailer) => mailer.send(to, subject, body).await,
            AnyMailer::Log(mailer) => mailer.send(to, subject, body).await,
        }
    }
}
