//! Message lifecycle: send, edit, soft-delete, list.

use duolog_database::{
    ChatError, ChatResult, CreateMessageRequest, Message, MessageRepository, MessageType,
};
use sqlx::SqlitePool;
use tracing::debug;

use crate::services::member_service::MemberService;
use crate::utils::Validator;

/// Service for message operations against a chat
pub struct MessageService {
    message_repository: MessageRepository,
    members: MemberService,
}

impl MessageService {
    /// Create a new message service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            message_repository: MessageRepository::new(pool.clone()),
            members: MemberService::new(pool),
        }
    }

    /// Post a message to a chat.
    ///
    /// The author must be a member. The membership check runs through the
    /// reconciling view, so the creator or recipient of a chat may send even
    /// when no membership row has been written yet.
    pub async fn send_message(
        &self,
        chat_id: i64,
        author_id: i64,
        content: &str,
        message_type: MessageType,
    ) -> ChatResult<Message> {
        Validator::message_content(content)?;

        if !self.members.is_member(chat_id, author_id).await? {
            return Err(ChatError::NotAMember);
        }

        self.message_repository
            .create(&CreateMessageRequest {
                chat_id,
                author_id,
                content: content.to_string(),
                message_type,
            })
            .await
    }

    /// Replace a message's content. Author-only; deleted messages are
    /// immutable.
    pub async fn edit_message(
        &self,
        message_id: i64,
        editor_id: i64,
        new_content: &str,
    ) -> ChatResult<Message> {
        Validator::message_content(new_content)?;

        let message = self
            .message_repository
            .find_by_id(message_id)
            .await?
            .ok_or(ChatError::MessageNotFound)?;

        if message.author_id != editor_id {
            return Err(ChatError::NotMessageAuthor);
        }

        if message.is_deleted() {
            return Err(ChatError::MessageDeleted);
        }

        self.message_repository
            .update_content(message_id, new_content)
            .await
    }

    /// Soft-delete a message. Author-only. Deleting an already-deleted
    /// message succeeds as a no-op.
    pub async fn delete_message(&self, message_id: i64, requester_id: i64) -> ChatResult<()> {
        let message = self
            .message_repository
            .find_by_id(message_id)
            .await?
            .ok_or(ChatError::MessageNotFound)?;

        if message.author_id != requester_id {
            return Err(ChatError::NotMessageAuthor);
        }

        if message.is_deleted() {
            debug!(message_id = message_id, "message already deleted");
            return Ok(());
        }

        self.message_repository.mark_deleted(message_id).await
    }

    /// Non-deleted messages for a chat, newest first. `limit` defaults to 50;
    /// `offset` makes the listing restartable.
    pub async fn list_messages(
        &self,
        chat_id: i64,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> ChatResult<Vec<Message>> {
        let (limit, offset) = Validator::pagination(limit, offset)?;
        self.message_repository
            .list_by_chat(chat_id, Some(limit), Some(offset))
            .await
    }
}
