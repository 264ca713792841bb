//! Repository for attachment metadata operations.

use crate::entities::{CreateAttachmentRequest, FileAttachment};
use crate::types::{ChatError, ChatResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

/// Repository for file attachment database operations
pub struct AttachmentRepository {
    pool: SqlitePool,
}

impl AttachmentRepository {
    /// Create a new attachment repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record attachment metadata for a message
    pub async fn create(&self, request: &CreateAttachmentRequest) -> ChatResult<FileAttachment> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO file_attachments (message_id, filename, stored_name, file_size, mime_type, uploaded_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(request.message_id)
        .bind(&request.filename)
        .bind(&request.stored_name)
        .bind(request.file_size)
        .bind(&request.mime_type)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        let attachment_id = result.last_insert_rowid();

        info!(
            attachment_id = attachment_id,
            message_id = request.message_id,
            filename = %request.filename,
            file_size = request.file_size,
            "recorded file attachment"
        );

        Ok(FileAttachment {
            id: attachment_id,
            message_id: request.message_id,
            filename: request.filename.clone(),
            stored_name: request.stored_name.clone(),
            file_size: request.file_size,
            mime_type: request.mime_type.clone(),
            uploaded_at: now,
        })
    }

    /// All attachments recorded against a message, oldest first.
    pub async fn find_by_message_id(&self, message_id: i64) -> ChatResult<Vec<FileAttachment>> {
        let rows = sqlx::query(
            "SELECT id, message_id, filename, stored_name, file_size, mime_type, uploaded_at
             FROM file_attachments WHERE message_id = ? ORDER BY uploaded_at ASC, id ASC",
        )
        .bind(message_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        rows.iter().map(attachment_from_row).collect()
    }
}

fn attachment_from_row(row: &SqliteRow) -> ChatResult<FileAttachment> {
    Ok(FileAttachment {
        id: row
            .try_get("id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        message_id: row
            .try_get("message_id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        filename: row
            .try_get("filename")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        stored_name: row
            .try_get("stored_name")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        file_size: row
            .try_get("file_size")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        mime_type: row
            .try_get("mime_type")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        uploaded_at: row
            .try_get("uploaded_at")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
    })
}
