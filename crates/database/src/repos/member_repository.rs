//! Repository for membership data access operations.

use crate::entities::{ChatMember, MemberRole, MemberStatus};
use crate::types::{ChatError, ChatResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

/// Repository for chat membership database operations
pub struct MemberRepository {
    pool: SqlitePool,
}

impl MemberRepository {
    /// Create a new member repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find the ACTIVE membership row for a user in a chat
    pub async fn find_active(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> ChatResult<Option<ChatMember>> {
        let row = sqlx::query(
            "SELECT id, chat_id, user_id, role, status, joined_at
             FROM chat_members WHERE chat_id = ? AND user_id = ? AND status = 'active'",
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        row.as_ref().map(member_from_row).transpose()
    }

    /// Insert an ACTIVE participant row. Returns `false` without error when an
    /// ACTIVE row already exists (a concurrent insert racing past the caller's
    /// lookup lands on the partial unique index and is treated as present).
    pub async fn insert_active(&self, chat_id: i64, user_id: i64) -> ChatResult<bool> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO chat_members (chat_id, user_id, role, status, joined_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(chat_id)
        .bind(user_id)
        .bind(MemberRole::Participant.to_string())
        .bind(MemberStatus::Active.to_string())
        .bind(&now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!(chat_id = chat_id, user_id = user_id, "added active membership");
                Ok(true)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Ok(false),
            Err(e) => Err(ChatError::DatabaseError(e.to_string())),
        }
    }

    /// User ids holding an ACTIVE membership in a chat, ascending.
    pub async fn active_user_ids(&self, chat_id: i64) -> ChatResult<Vec<i64>> {
        sqlx::query_scalar(
            "SELECT user_id FROM chat_members
             WHERE chat_id = ? AND status = 'active' ORDER BY user_id ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))
    }
}

fn member_from_row(row: &SqliteRow) -> ChatResult<ChatMember> {
    let role_str: String = row
        .try_get("role")
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;
    let status_str: String = row
        .try_get("status")
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

    Ok(ChatMember {
        id: row
            .try_get("id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        chat_id: row
            .try_get("chat_id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        user_id: row
            .try_get("user_id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        role: MemberRole::from(role_str.as_str()),
        status: MemberStatus::from(status_str.as_str()),
        joined_at: row
            .try_get("joined_at")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;
    use tempfile::TempDir;

    async fn create_test_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test_members.db");
        // Repository tests run without FK enforcement so fixtures stay minimal.
        let options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))
                .unwrap()
                .create_if_missing(true)
                .foreign_keys(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();

        crate::migrations::MIGRATOR.run(&pool).await.unwrap();
        (pool, temp_dir)
    }

    #[tokio::test]
    async fn test_insert_active_then_find() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = MemberRepository::new(pool);

        assert!(repo.insert_active(1, 7).await.unwrap());

        let member = repo.find_active(1, 7).await.unwrap().unwrap();
        assert_eq!(member.role, MemberRole::Participant);
        assert_eq!(member.status, MemberStatus::Active);
    }

    #[tokio::test]
    async fn test_second_active_insert_is_a_noop() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = MemberRepository::new(pool.clone());

        assert!(repo.insert_active(1, 7).await.unwrap());
        assert!(!repo.insert_active(1, 7).await.unwrap());

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM chat_members WHERE chat_id = 1 AND user_id = 7",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_historical_rows_do_not_block_reactivation() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = MemberRepository::new(pool.clone());

        // A user who previously left keeps the historical row.
        sqlx::query(
            "INSERT INTO chat_members (chat_id, user_id, role, status, joined_at)
             VALUES (1, 7, 'participant', 'left', '2020-01-01T00:00:00+00:00')",
        )
        .execute(&pool)
        .await
        .unwrap();

        assert!(repo.find_active(1, 7).await.unwrap().is_none());
        assert!(repo.insert_active(1, 7).await.unwrap());
        assert!(repo.find_active(1, 7).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_active_user_ids_sorted() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = MemberRepository::new(pool);

        repo.insert_active(1, 9).await.unwrap();
        repo.insert_active(1, 4).await.unwrap();
        repo.insert_active(2, 5).await.unwrap();

        assert_eq!(repo.active_user_ids(1).await.unwrap(), vec![4, 9]);
    }
}
