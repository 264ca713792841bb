//! Repository for message data access operations.

use crate::entities::{CreateMessageRequest, Message, MessageState, MessageType};
use crate::types::{ChatError, ChatResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

/// Repository for message database operations
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a message by id
    pub async fn find_by_id(&self, message_id: i64) -> ChatResult<Option<Message>> {
        let row = sqlx::query(
            "SELECT id, chat_id, author_id, content, message_type, state, created_at, updated_at
             FROM messages WHERE id = ?",
        )
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        row.as_ref().map(message_from_row).transpose()
    }

    /// Create a new message
    pub async fn create(&self, request: &CreateMessageRequest) -> ChatResult<Message> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO messages (chat_id, author_id, content, message_type, state, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, NULL)",
        )
        .bind(request.chat_id)
        .bind(request.author_id)
        .bind(&request.content)
        .bind(request.message_type.to_string())
        .bind(MessageState::Active.to_string())
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        let message_id = result.last_insert_rowid();

        info!(
            message_id = message_id,
            chat_id = request.chat_id,
            author_id = request.author_id,
            "created new message"
        );

        Ok(Message {
            id: message_id,
            chat_id: request.chat_id,
            author_id: request.author_id,
            content: request.content.clone(),
            message_type: request.message_type.clone(),
            state: MessageState::Active,
            created_at: now,
            updated_at: None,
        })
    }

    /// Replace a message's content and stamp `updated_at`
    pub async fn update_content(&self, message_id: i64, content: &str) -> ChatResult<Message> {
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query("UPDATE messages SET content = ?, updated_at = ? WHERE id = ?")
            .bind(content)
            .bind(&now)
            .bind(message_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        self.find_by_id(message_id)
            .await?
            .ok_or(ChatError::MessageNotFound)
    }

    /// Transition a message into the deleted state
    pub async fn mark_deleted(&self, message_id: i64) -> ChatResult<()> {
        sqlx::query("UPDATE messages SET state = 'deleted' WHERE id = ?")
            .bind(message_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        info!(message_id = message_id, "soft deleted message");
        Ok(())
    }

    /// List non-deleted messages for a chat, newest first, with pagination.
    pub async fn list_by_chat(
        &self,
        chat_id: i64,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> ChatResult<Vec<Message>> {
        let limit = limit.unwrap_or(50);
        let offset = offset.unwrap_or(0);

        let rows = sqlx::query(
            "SELECT id, chat_id, author_id, content, message_type, state, created_at, updated_at
             FROM messages
             WHERE chat_id = ? AND state != 'deleted'
             ORDER BY created_at DESC, id DESC
             LIMIT ? OFFSET ?",
        )
        .bind(chat_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        rows.iter().map(message_from_row).collect()
    }
}

fn message_from_row(row: &SqliteRow) -> ChatResult<Message> {
    let message_type_str: String = row
        .try_get("message_type")
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;
    let state_str: String = row
        .try_get("state")
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

    Ok(Message {
        id: row
            .try_get("id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        chat_id: row
            .try_get("chat_id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        author_id: row
            .try_get("author_id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        content: row
            .try_get("content")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        message_type: MessageType::from(message_type_str.as_str()),
        state: MessageState::from(state_str.as_str()),
        created_at: row
            .try_get("created_at")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        updated_at: row
            .try_get("updated_at")
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
        let db_path = temp_dir.path().join("test_messages.db");
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

    fn text_message(chat_id: i64, author_id: i64, content: &str) -> CreateMessageRequest {
        CreateMessageRequest {
            chat_id,
            author_id,
            content: content.to_string(),
            message_type: MessageType::Text,
        }
    }

    #[tokio::test]
    async fn test_create_message_starts_active() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = MessageRepository::new(pool);

        let message = repo.create(&text_message(1, 1, "hello")).await.unwrap();
        assert!(message.id > 0);
        assert_eq!(message.state, MessageState::Active);
        assert!(message.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_update_content_stamps_updated_at() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = MessageRepository::new(pool);

        let message = repo.create(&text_message(1, 1, "hello")).await.unwrap();
        let edited = repo.update_content(message.id, "hello again").await.unwrap();

        assert_eq!(edited.content, "hello again");
        assert!(edited.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_list_by_chat_hides_deleted_and_orders_newest_first() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = MessageRepository::new(pool);

        let first = repo.create(&text_message(1, 1, "first")).await.unwrap();
        let second = repo.create(&text_message(1, 2, "second")).await.unwrap();
        let third = repo.create(&text_message(1, 1, "third")).await.unwrap();
        repo.create(&text_message(2, 1, "other chat")).await.unwrap();

        repo.mark_deleted(second.id).await.unwrap();

        let messages = repo.list_by_chat(1, None, None).await.unwrap();
        let ids: Vec<i64> = messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![third.id, first.id]);
    }

    #[tokio::test]
    async fn test_pagination_is_restartable() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = MessageRepository::new(pool);

        for i in 0..5 {
            repo.create(&text_message(1, 1, &format!("message {i}")))
                .await
                .unwrap();
        }

        let page_one = repo.list_by_chat(1, Some(2), Some(0)).await.unwrap();
        let page_two = repo.list_by_chat(1, Some(2), Some(2)).await.unwrap();

        assert_eq!(page_one.len(), 2);
        assert_eq!(page_two.len(), 2);
        assert!(page_one[1].id > page_two[0].id);
    }
}
