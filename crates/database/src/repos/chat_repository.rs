//! Repository for chat data access operations.

use crate::entities::{Chat, ChatType, MemberRole, MemberStatus};
use crate::types::{ChatError, ChatResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

/// Repository for chat database operations
pub struct ChatRepository {
    pool: SqlitePool,
}

impl ChatRepository {
    /// Create a new chat repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a chat by id
    pub async fn find_by_id(&self, chat_id: i64) -> ChatResult<Option<Chat>> {
        let row = sqlx::query(
            "SELECT id, chat_type, creator_id, recipient_id, created_at, is_active
             FROM chats WHERE id = ?",
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        row.as_ref().map(chat_from_row).transpose()
    }

    /// Find the private chat between two users, in either creation order.
    /// Creator/recipient ordering is an artifact of who opened the chat, so
    /// the lookup matches the unordered pair.
    pub async fn find_private_between(
        &self,
        user_a: i64,
        user_b: i64,
    ) -> ChatResult<Option<Chat>> {
        let row = sqlx::query(
            "SELECT id, chat_type, creator_id, recipient_id, created_at, is_active
             FROM chats
             WHERE chat_type = 'private'
               AND ((creator_id = ? AND recipient_id = ?) OR (creator_id = ? AND recipient_id = ?))",
        )
        .bind(user_a)
        .bind(user_b)
        .bind(user_b)
        .bind(user_a)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        row.as_ref().map(chat_from_row).transpose()
    }

    /// Create a private chat together with ACTIVE membership rows for both
    /// participants, committed as one transaction. A raced duplicate insert
    /// surfaces as [`ChatError::DuplicateChat`] via the unordered-pair index.
    pub async fn create_private(&self, creator_id: i64, recipient_id: i64) -> ChatResult<Chat> {
        let now = chrono::Utc::now().to_rfc3339();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO chats (chat_type, creator_id, recipient_id, created_at, is_active)
             VALUES ('private', ?, ?, ?, 1)",
        )
        .bind(creator_id)
        .bind(recipient_id)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(map_chat_insert_err)?;

        let chat_id = result.last_insert_rowid();

        for user_id in [creator_id, recipient_id] {
            sqlx::query(
                "INSERT INTO chat_members (chat_id, user_id, role, status, joined_at)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(chat_id)
            .bind(user_id)
            .bind(MemberRole::Participant.to_string())
            .bind(MemberStatus::Active.to_string())
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        info!(
            chat_id = chat_id,
            creator_id = creator_id,
            recipient_id = recipient_id,
            "created private chat with both memberships"
        );

        Ok(Chat {
            id: chat_id,
            chat_type: ChatType::Private,
            creator_id,
            recipient_id,
            created_at: now,
            is_active: true,
        })
    }

    /// Find chats reachable by a user, through an explicit ACTIVE membership
    /// row or by being named creator/recipient on the chat itself.
    pub async fn find_by_user_id(&self, user_id: i64) -> ChatResult<Vec<Chat>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT c.id, c.chat_type, c.creator_id, c.recipient_id, c.created_at, c.is_active
            FROM chats c
            LEFT JOIN chat_members cm ON c.id = cm.chat_id AND cm.status = 'active'
            WHERE c.creator_id = ? OR c.recipient_id = ? OR cm.user_id = ?
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        rows.iter().map(chat_from_row).collect()
    }

    /// Ids of every chat, for the startup membership sweep.
    pub async fn all_ids(&self) -> ChatResult<Vec<i64>> {
        sqlx::query_scalar("SELECT id FROM chats ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))
    }
}

fn map_chat_insert_err(e: sqlx::Error) -> ChatError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => ChatError::DuplicateChat,
        _ => ChatError::DatabaseError(e.to_string()),
    }
}

fn chat_from_row(row: &SqliteRow) -> ChatResult<Chat> {
    let chat_type_str: String = row
        .try_get("chat_type")
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

    Ok(Chat {
        id: row
            .try_get("id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        chat_type: ChatType::from(chat_type_str.as_str()),
        creator_id: row
            .try_get("creator_id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        recipient_id: row
            .try_get("recipient_id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        is_active: row
            .try_get("is_active")
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
        let db_path = temp_dir.path().join("test_chats.db");
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
    async fn test_create_private_chat_inserts_memberships() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = ChatRepository::new(pool.clone());

        let chat = repo.create_private(1, 2).await.unwrap();
        assert!(chat.id > 0);
        assert_eq!(chat.creator_id, 1);
        assert_eq!(chat.recipient_id, 2);
        assert!(chat.is_active);

        let members: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM chat_members WHERE chat_id = ? AND status = 'active'",
        )
        .bind(chat.id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(members, 2);
    }

    #[tokio::test]
    async fn test_lookup_is_symmetric() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = ChatRepository::new(pool);

        let chat = repo.create_private(1, 2).await.unwrap();

        let forward = repo.find_private_between(1, 2).await.unwrap().unwrap();
        let reverse = repo.find_private_between(2, 1).await.unwrap().unwrap();
        assert_eq!(forward.id, chat.id);
        assert_eq!(reverse.id, chat.id);
    }

    #[tokio::test]
    async fn test_duplicate_pair_is_conflict() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = ChatRepository::new(pool);

        repo.create_private(1, 2).await.unwrap();

        let err = repo.create_private(2, 1).await.unwrap_err();
        assert!(matches!(err, ChatError::DuplicateChat));
    }

    #[tokio::test]
    async fn test_find_by_user_id_covers_implicit_reachability() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = ChatRepository::new(pool.clone());

        // Simulate a legacy chat row without any membership rows.
        sqlx::query(
            "INSERT INTO chats (chat_type, creator_id, recipient_id, created_at, is_active)
             VALUES ('private', 1, 2, '2020-01-01T00:00:00+00:00', 1)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let chats = repo.find_by_user_id(2).await.unwrap();
        assert_eq!(chats.len(), 1);

        let none = repo.find_by_user_id(3).await.unwrap();
        assert!(none.is_empty());
    }
}
