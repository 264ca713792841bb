//! File attachment registration.

use std::sync::Arc;

use duolog_config::UploadConfig;
use duolog_database::{
    AttachmentRepository, ChatError, ChatResult, CreateAttachmentRequest, FileAttachment,
    MessageRepository,
};
use sqlx::SqlitePool;
use tracing::info;

use crate::services::member_service::MemberService;
use crate::storage::BlobStore;
use crate::utils::Validator;

/// An uploaded file handed over by the transport layer.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Service associating uploaded files with messages
pub struct AttachmentService {
    attachment_repository: AttachmentRepository,
    message_repository: MessageRepository,
    members: MemberService,
    store: Arc<dyn BlobStore>,
    config: UploadConfig,
}

impl AttachmentService {
    /// Create a new attachment service instance
    pub fn new(pool: SqlitePool, store: Arc<dyn BlobStore>, config: UploadConfig) -> Self {
        Self {
            attachment_repository: AttachmentRepository::new(pool.clone()),
            message_repository: MessageRepository::new(pool.clone()),
            members: MemberService::new(pool),
            store,
            config,
        }
    }

    /// Accept an upload for an existing message and record its metadata.
    ///
    /// The file must fit the configured size limit and extension allow-list,
    /// and the uploader must be a member of the message's chat. Bytes go to
    /// the blob store under a generated collision-resistant name; the
    /// resulting locator is what gets persisted.
    pub async fn attach_file(
        &self,
        message_id: i64,
        uploader_id: i64,
        upload: FileUpload,
    ) -> ChatResult<FileAttachment> {
        Validator::file_name(&upload.filename)?;
        Validator::file_size(upload.bytes.len() as i64, self.config.max_file_size_bytes)?;
        Validator::file_extension(&upload.filename, &self.config.allowed_extensions)?;

        let message = self
            .message_repository
            .find_by_id(message_id)
            .await?
            .ok_or(ChatError::MessageNotFound)?;

        if !self.members.is_member(message.chat_id, uploader_id).await? {
            return Err(ChatError::NotAMember);
        }

        let stored_name = format!("{}_{}", cuid2::cuid(), upload.filename);
        let locator = self
            .store
            .save(&stored_name, &upload.bytes)
            .await
            .map_err(|e| ChatError::storage(e.to_string()))?;
        let file_size = self
            .store
            .size(&locator)
            .await
            .map_err(|e| ChatError::storage(e.to_string()))?;

        let mime_type = upload
            .mime_type
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let attachment = self
            .attachment_repository
            .create(&CreateAttachmentRequest {
                message_id,
                filename: upload.filename,
                stored_name: locator,
                file_size,
                mime_type,
            })
            .await?;

        info!(
            attachment_id = attachment.id,
            message_id = message_id,
            uploader_id = uploader_id,
            "attached file to message"
        );

        Ok(attachment)
    }

    /// Attachments recorded against a message, oldest first.
    pub async fn list_attachments(&self, message_id: i64) -> ChatResult<Vec<FileAttachment>> {
        self.attachment_repository.find_by_message_id(message_id).await
    }
}
