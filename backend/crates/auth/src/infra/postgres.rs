//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{OneTimeToken, Session, User};
use crate::domain::repository::{
    FieldConflicts, ResetTokenRepository, SessionRepository, UserRepository,
    VerificationTokenRepository,
};
use crate::domain::value_object::{
    Email, OneTimeTokenId, PasswordHash, SessionId, UserId, UserName,
};
use crate::error::AuthResult;

const VERIFICATION_TOKENS: &str = "verification_tokens";
const RESET_TOKENS: &str = "reset_tokens";

/// PostgreSQL-backed auth store
#[derive(Clone)]
pub struct PgAuthStore {
    pool: PgPool,
}

impl PgAuthStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // One-time tokens live in two identically shaped tables; these helpers
    // carry the shared SQL. `table` is always one of the two constants
    // above, never external input.

    async fn upsert_token(&self, table: &str, token: &OneTimeToken) -> AuthResult<()> {
        let sql = format!(
            r#"
            INSERT INTO {table} (token_id, user_id, token, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                token_id = EXCLUDED.token_id,
                token = EXCLUDED.token,
                expires_at = EXCLUDED.expires_at,
                created_at = EXCLUDED.created_at
            "#
        );

        sqlx::query(&sql)
            .bind(token.token_id.as_uuid())
            .bind(token.user_id.as_uuid())
            .bind(&token.token)
            .bind(token.expires_at)
            .bind(token.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_token(&self, table: &str, token: &str) -> AuthResult<Option<OneTimeToken>> {
        let sql = format!(
            "SELECT token_id, user_id, token, expires_at, created_at FROM {table} WHERE token = $1"
        );

        let row = sqlx::query_as::<_, OneTimeTokenRow>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(OneTimeTokenRow::into_token))
    }

    async fn consume_token(&self, table: &str, token: &str) -> AuthResult<Option<OneTimeToken>> {
        // Single-statement claim: the row is gone the moment it is read, so
        // a concurrent redemption of the same string sees nothing.
        let sql = format!(
            r#"
            DELETE FROM {table}
            WHERE token = $1
            RETURNING token_id, user_id, token, expires_at, created_at
            "#
        );

        let row = sqlx::query_as::<_, OneTimeTokenRow>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(OneTimeTokenRow::into_token))
    }

    async fn delete_expired_tokens(&self, table: &str, now: DateTime<Utc>) -> AuthResult<u64> {
        let sql = format!("DELETE FROM {table} WHERE expires_at < $1");

        let deleted = sqlx::query(&sql)
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthStore {
    async fn create(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                user_name,
                user_name_canonical,
                email,
                password_hash,
                is_verified,
                first_name,
                last_name,
                age,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.user_name.original())
        .bind(user.user_name.canonical())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .bind(user.is_verified)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.age)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn conflicts(&self, user_name: &UserName, email: &Email) -> AuthResult<FieldConflicts> {
        // One pass over every colliding row so the caller learns about
        // both fields, not just the first match.
        let rows = sqlx::query_as::<_, ConflictRow>(
            r#"
            SELECT user_name_canonical, email
            FROM users
            WHERE user_name_canonical = $1 OR email = $2
            "#,
        )
        .bind(user_name.canonical())
        .bind(email.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut conflicts = FieldConflicts::default();
        for row in rows {
            if row.user_name_canonical == user_name.canonical() {
                conflicts.username_taken = true;
            }
            if row.email == email.as_str() {
                conflicts.email_taken = true;
            }
        }

        Ok(conflicts)
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} WHERE user_id = $1"))
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        let row =
            sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} WHERE user_name_canonical = $1"))
                .bind(user_name.canonical())
                .fetch_optional(&self.pool)
                .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} WHERE email = $1"))
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn mark_verified(&self, user_id: &UserId) -> AuthResult<()> {
        sqlx::query("UPDATE users SET is_verified = TRUE, updated_at = $2 WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_password_hash(&self, user_id: &UserId, hash: &PasswordHash) -> AuthResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .bind(hash.as_phc_string())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<()> {
        sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_unverified_before(&self, cutoff: DateTime<Utc>) -> AuthResult<u64> {
        let deleted =
            sqlx::query("DELETE FROM users WHERE is_verified = FALSE AND created_at < $1")
                .bind(cutoff)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthStore {
    async fn create(&self, session: &Session) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (session_id, user_id, refresh_token, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(session.session_id.as_uuid())
        .bind(session.user_id.as_uuid())
        .bind(&session.refresh_token)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_token(&self, refresh_token: &str) -> AuthResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT session_id, user_id, refresh_token, expires_at, created_at
            FROM sessions
            WHERE refresh_token = $1
            "#,
        )
        .bind(refresh_token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRow::into_session))
    }

    async fn delete_by_token(&self, refresh_token: &str) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE refresh_token = $1")
            .bind(refresh_token)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn delete_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// One-Time Token Repository Implementations
// ============================================================================

impl VerificationTokenRepository for PgAuthStore {
    async fn replace_for_user(&self, token: &OneTimeToken) -> AuthResult<()> {
        self.upsert_token(VERIFICATION_TOKENS, token).await
    }

    async fn find_by_token(&self, token: &str) -> AuthResult<Option<OneTimeToken>> {
        self.find_token(VERIFICATION_TOKENS, token).await
    }

    async fn consume(&self, token: &str) -> AuthResult<Option<OneTimeToken>> {
        self.consume_token(VERIFICATION_TOKENS, token).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        self.delete_expired_tokens(VERIFICATION_TOKENS, now).await
    }
}

impl ResetTokenRepository for PgAuthStore {
    async fn replace_for_user(&self, token: &OneTimeToken) -> AuthResult<()> {
        self.upsert_token(RESET_TOKENS, token).await
    }

    async fn find_by_token(&self, token: &str) -> AuthResult<Option<OneTimeToken>> {
        self.find_token(RESET_TOKENS, token).await
    }

    async fn consume(&self, token: &str) -> AuthResult<Option<OneTimeToken>> {
        self.consume_token(RESET_TOKENS, token).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        self.delete_expired_tokens(RESET_TOKENS, now).await
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

const USER_SELECT: &str = r#"
    SELECT
        user_id,
        user_name,
        email,
        password_hash,
        is_verified,
        first_name,
        last_name,
        age,
        created_at,
        updated_at
    FROM users
"#;

#[derive(sqlx::FromRow)]
struct ConflictRow {
    user_name_canonical: String,
    email: String,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    user_name: String,
    email: String,
    password_hash: String,
    is_verified: bool,
    first_name: Option<String>,
    last_name: Option<String>,
    age: Option<i16>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            user_name: UserName::from_db(self.user_name),
            email: Email::from_db(self.email),
            password_hash: PasswordHash::from_phc_string(self.password_hash)?,
            is_verified: self.is_verified,
            first_name: self.first_name,
            last_name: self.last_name,
            age: self.age,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: Uuid,
    user_id: Uuid,
    refresh_token: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> Session {
        Session {
            session_id: SessionId::from_uuid(self.session_id),
            user_id: UserId::from_uuid(self.user_id),
            refresh_token: self.refresh_token,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OneTimeTokenRow {
    token_id: Uuid,
    user_id: Uuid,
    token: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl OneTimeTokenRow {
    fn into_token(self) -> OneTimeToken {
        OneTimeToken {
            token_id: OneTimeTokenId::from_uuid(self.token_id),
            user_id: UserId::from_uuid(self.user_id),
            token: self.token,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}
