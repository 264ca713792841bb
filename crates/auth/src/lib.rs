//! Registration, login, and the bearer-token authority.
//!
//! Tokens are opaque random strings persisted in the `sessions` table.
//! Revocation goes through a dedicated `revoked_tokens` list which is
//! consulted before any session lookup, so a logged-out token stays dead
//! even if its session row were ever resurrected from a backup.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use duolog_config::AuthConfig;
use rand::RngCore;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Clone)]
pub struct Authenticator {
    pool: SqlitePool,
    token_ttl: Duration,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user already exists")]
    UserExists,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("token not found")]
    TokenNotFound,
    #[error("token expired")]
    TokenExpired,
    #[error("token revoked")]
    TokenRevoked,
    #[error("invalid token")]
    InvalidToken,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

impl Authenticator {
    pub fn new(pool: SqlitePool, config: AuthConfig) -> Self {
        let token_ttl = Duration::seconds(config.token_ttl_seconds as i64);
        Self { pool, token_ttl }
    }

    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id FROM users WHERE email = ? OR username = ?")
            .bind(email)
            .bind(username)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_some() {
            return Err(AuthError::UserExists);
        }

        let now = Utc::now().to_rfc3339();
        let password_hash = self.hash_password(password)?;

        sqlx::query(
            "INSERT INTO users (username, email, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(&password_hash)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&mut *tx)
            .await?;
        let user_id: i64 = row.try_get("id")?;

        tx.commit().await?;

        info!(user_id = user_id, username = username, "registered new user");

        Ok(User {
            id: user_id,
            username: username.to_owned(),
            email: email.to_owned(),
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let row = sqlx::query("SELECT id, password_hash FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AuthError::InvalidCredentials);
        };

        let secret: String = row.try_get("password_hash")?;
        let stored_hash = PasswordHash::new(&secret)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &stored_hash)
            .map_err(|_| AuthError::InvalidCredentials)?;

        let user_id: i64 = row.try_get("id")?;
        self.issue_token(user_id).await
    }

    /// Resolve a bearer token into the authenticated user. This is the
    /// `current_user_id` every core entry point consumes.
    pub async fn authenticate_token(&self, token: &str) -> Result<(User, AuthSession), AuthError> {
        let revoked: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE token = ?)")
                .bind(token)
                .fetch_one(&self.pool)
                .await?;
        if revoked != 0 {
            return Err(AuthError::TokenRevoked);
        }

        let row = sqlx::query("SELECT user_id, expires_at FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AuthError::TokenNotFound);
        };

        let user_id: i64 = row.try_get("user_id")?;
        let expires_at: String = row.try_get("expires_at")?;

        let expires_at = DateTime::parse_from_rfc3339(&expires_at)
            .map_err(|_| AuthError::InvalidToken)?
            .with_timezone(&Utc);

        if expires_at <= Utc::now() {
            sqlx::query("DELETE FROM sessions WHERE token = ?")
                .bind(token)
                .execute(&self.pool)
                .await?;
            return Err(AuthError::TokenExpired);
        }

        let user = self.fetch_user(user_id).await?;
        let session = AuthSession {
            token: token.to_owned(),
            user_id,
            expires_at,
        };

        Ok((user, session))
    }

    /// Log a token out by adding it to the revocation list. The revocation
    /// row carries the session's expiry so it can be purged once the token
    /// could no longer have been valid anyway.
    pub async fn revoke_token(&self, token: &str) -> Result<(), AuthError> {
        let now = Utc::now();

        let session_expiry: Option<String> =
            sqlx::query_scalar("SELECT expires_at FROM sessions WHERE token = ?")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        let expires_at = session_expiry
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc))
            .unwrap_or_else(|| now + self.token_ttl);

        let result = sqlx::query(
            "INSERT INTO revoked_tokens (token, revoked_at, expires_at) VALUES (?, ?, ?)",
        )
        .bind(token)
        .bind(now.to_rfc3339())
        .bind(expires_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            // Revoking the same token twice is fine.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {}
            Err(e) => return Err(AuthError::Database(e)),
        }

        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        debug!("token revoked");
        Ok(())
    }

    /// Drop expired sessions and revocation rows whose tokens could no
    /// longer authenticate regardless.
    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        let now = Utc::now().to_rfc3339();

        let sessions = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(&now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        let revocations = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= ?")
            .bind(&now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if sessions + revocations > 0 {
            info!(
                sessions = sessions,
                revocations = revocations,
                "purged expired auth rows"
            );
        }

        Ok(sessions + revocations)
    }

    pub async fn user_profile(&self, user_id: i64) -> Result<User, AuthError> {
        self.fetch_user(user_id).await
    }

    async fn fetch_user(&self, id: i64) -> Result<User, AuthError> {
        let row = sqlx::query("SELECT id, username, email FROM users WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(User {
            id,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
        })
    }

    async fn issue_token(&self, user_id: i64) -> Result<AuthSession, AuthError> {
        let token = self.generate_token();
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        sqlx::query(
            "INSERT INTO sessions (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&token)
        .bind(now.to_rfc3339())
        .bind(expires_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(AuthSession {
            token,
            user_id,
            expires_at,
        })
    }

    fn hash_password(&self, password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    fn generate_token(&self) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}
