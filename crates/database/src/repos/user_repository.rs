//! Repository for user data access operations.

use crate::entities::{CreateUserRequest, User};
use crate::types::{ChatError, ChatResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

/// Repository for user database operations
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a user by id
    pub async fn find_by_id(&self, user_id: i64) -> ChatResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Check whether a user id refers to an existing user
    pub async fn exists(&self, user_id: i64) -> ChatResult<bool> {
        let present: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(present != 0)
    }

    /// Create a new user
    pub async fn create(&self, request: &CreateUserRequest) -> ChatResult<User> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&request.username)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ChatError::validation("username or email already in use")
            }
            _ => ChatError::DatabaseError(e.to_string()),
        })?;

        let user_id = result.last_insert_rowid();

        info!(user_id = user_id, username = %request.username, "created new user");

        Ok(User {
            id: user_id,
            username: request.username.clone(),
            email: request.email.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }
}

fn user_from_row(row: &SqliteRow) -> ChatResult<User> {
    Ok(User {
        id: row
            .try_get("id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        username: row
            .try_get("username")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        email: row
            .try_get("email")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        updated_at: row
            .try_get("updated_at")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
    })
}
