//! Mailer Port
//!
//! Outbound mail collaborator contract. The core hands over a recipient,
//! a subject, and a body containing the action link; delivery mechanics
//! are an infrastructure concern.

use crate::error::AuthResult;

/// Mailer capability required by the verification and reset flows
#[trait_variant::make(Mailer: Send)]
pub trait LocalMailer {
    /// Deliver one message. Failures surface as 500 and are not retried
    /// by the core.
    async fn send(&self, to: &str, subject: &str, body: &str) -> AuthResult<()>;
}
