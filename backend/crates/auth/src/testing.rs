//! In-memory implementations of the domain ports for use-case tests.
//!
//! `MemoryStore` holds the same invariants the PostgreSQL store enforces
//! with constraints: `replace_for_user` swaps the user's token under one
//! lock, `consume` removes the row in the same critical section it reads
//! it.

use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::domain::entity::{OneTimeToken, Session, User};
use crate::domain::mailer::Mailer;
use crate::domain::repository::{
    FieldConflicts, ResetTokenRepository, SessionRepository, UserRepository,
    VerificationTokenRepository,
};
use crate::domain::value_object::{Email, PasswordHash, RawPassword, UserId, UserName};
use crate::error::AuthResult;

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    sessions: Mutex<Vec<Session>>,
    verification_tokens: Mutex<Vec<OneTimeToken>>,
    reset_tokens: Mutex<Vec<OneTimeToken>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Test fixtures
    // ------------------------------------------------------------------

    pub async fn insert_user(
        &self,
        user_name: &str,
        email: &str,
        password: &str,
        verified: bool,
    ) -> User {
        let raw = RawPassword::new(password.to_string()).unwrap();
        let mut user = User::new(
            UserName::new(user_name).unwrap(),
            Email::new(email).unwrap(),
            PasswordHash::from_raw(&raw, None).unwrap(),
        );
        user.is_verified = verified;

        self.users.lock().unwrap().push(user.clone());
        user
    }

    pub async fn get_user(&self, user_id: &UserId) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| &u.user_id == user_id)
            .cloned()
    }

    pub async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email.as_str() == email)
            .cloned()
    }

    pub async fn set_created_at(&self, user_id: &UserId, created_at: DateTime<Utc>) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| &u.user_id == user_id) {
            user.created_at = created_at;
        }
    }

    pub async fn insert_session(&self, session: Session) {
        self.sessions.lock().unwrap().push(session);
    }

    pub async fn find_session(&self, refresh_token: &str) -> Option<Session> {
        self.sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.refresh_token == refresh_token)
            .cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub async fn insert_verification_token(&self, token: OneTimeToken) {
        self.verification_tokens.lock().unwrap().push(token);
    }

    pub async fn insert_reset_token(&self, token: OneTimeToken) {
        self.reset_tokens.lock().unwrap().push(token);
    }

    pub async fn verification_token_for(&self, user_id: &UserId) -> Option<OneTimeToken> {
        self.verification_tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| &t.user_id == user_id)
            .cloned()
    }

    pub async fn reset_token_for(&self, user_id: &UserId) -> Option<OneTimeToken> {
        self.reset_tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| &t.user_id == user_id)
            .cloned()
    }
}

// ----------------------------------------------------------------------
// Port implementations
// ----------------------------------------------------------------------

impl UserRepository for MemoryStore {
    async fn create(&self, user: &User) -> AuthResult<()> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn conflicts(&self, user_name: &UserName, email: &Email) -> AuthResult<FieldConflicts> {
        let users = self.users.lock().unwrap();
        let mut conflicts = FieldConflicts::default();

        for user in users.iter() {
            if user.user_name.canonical() == user_name.canonical() {
                conflicts.username_taken = true;
            }
            if user.email.as_str() == email.as_str() {
                conflicts.email_taken = true;
            }
        }

        Ok(conflicts)
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| &u.user_id == user_id)
            .cloned())
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user_name.canonical() == user_name.canonical())
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email.as_str() == email.as_str())
            .cloned())
    }

    async fn mark_verified(&self, user_id: &UserId) -> AuthResult<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| &u.user_id == user_id) {
            user.mark_verified();
        }
        Ok(())
    }

    async fn update_password_hash(&self, user_id: &UserId, hash: &PasswordHash) -> AuthResult<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| &u.user_id == user_id) {
            user.set_password_hash(hash.clone());
        }
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<()> {
        self.users.lock().unwrap().retain(|u| &u.user_id != user_id);
        Ok(())
    }

    async fn delete_unverified_before(&self, cutoff: DateTime<Utc>) -> AuthResult<u64> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| !u.is_stale_unverified(cutoff));
        Ok((before - users.len()) as u64)
    }
}

impl SessionRepository for MemoryStore {
    async fn create(&self, session: &Session) -> AuthResult<()> {
        self.sessions.lock().unwrap().push(session.clone());
        Ok(())
    }

    async fn find_by_token(&self, refresh_token: &str) -> AuthResult<Option<Session>> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.refresh_token == refresh_token)
            .cloned())
    }

    async fn delete_by_token(&self, refresh_token: &str) -> AuthResult<u64> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| s.refresh_token != refresh_token);
        Ok((before - sessions.len()) as u64)
    }

    async fn delete_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| &s.user_id != user_id);
        Ok((before - sessions.len()) as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| !s.is_expired(now));
        Ok((before - sessions.len()) as u64)
    }
}

fn replace_in(tokens: &Mutex<Vec<OneTimeToken>>, token: &OneTimeToken) {
    let mut tokens = tokens.lock().unwrap();
    tokens.retain(|t| t.user_id != token.user_id);
    tokens.push(token.clone());
}

fn find_in(tokens: &Mutex<Vec<OneTimeToken>>, token: &str) -> Option<OneTimeToken> {
    tokens
        .lock()
        .unwrap()
        .iter()
        .find(|t| t.token == token)
        .cloned()
}

fn consume_in(tokens: &Mutex<Vec<OneTimeToken>>, token: &str) -> Option<OneTimeToken> {
    let mut tokens = tokens.lock().unwrap();
    let index = tokens.iter().position(|t| t.token == token)?;
    Some(tokens.remove(index))
}

fn expire_in(tokens: &Mutex<Vec<OneTimeToken>>, now: DateTime<Utc>) -> u64 {
    let mut tokens = tokens.lock().unwrap();
    let before = tokens.len();
    tokens.retain(|t| !t.is_expired(now));
    (before - tokens.len()) as u64
}

impl VerificationTokenRepository for MemoryStore {
    async fn replace_for_user(&self, token: &OneTimeToken) -> AuthResult<()> {
        replace_in(&self.verification_tokens, token);
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> AuthResult<Option<OneTimeToken>> {
        Ok(find_in(&self.verification_tokens, token))
    }

    async fn consume(&self, token: &str) -> AuthResult<Option<OneTimeToken>> {
        Ok(consume_in(&self.verification_tokens, token))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        Ok(expire_in(&self.verification_tokens, now))
    }
}

impl ResetTokenRepository for MemoryStore {
    async fn replace_for_user(&self, token: &OneTimeToken) -> AuthResult<()> {
        replace_in(&self.reset_tokens, token);
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> AuthResult<Option<OneTimeToken>> {
        Ok(find_in(&self.reset_tokens, token))
    }

    async fn consume(&self, token: &str) -> AuthResult<Option<OneTimeToken>> {
        Ok(consume_in(&self.reset_tokens, token))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        Ok(expire_in(&self.reset_tokens, now))
    }
}

// ----------------------------------------------------------------------
// Recording mailer
// ----------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn last(&self) -> Option<SentMail> {
        self.sent.lock().unwrap().last().cloned()
    }

    pub async fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AuthResult<()> {
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
