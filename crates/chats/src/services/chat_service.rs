//! Chat directory: resolving and creating private chats.

use duolog_database::{Chat, ChatError, ChatRepository, ChatResult, UserRepository};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::services::member_service::MemberService;

/// Service for locating and creating private chats
pub struct ChatService {
    user_repository: UserRepository,
    chat_repository: ChatRepository,
    members: MemberService,
}

impl ChatService {
    /// Create a new chat service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            user_repository: UserRepository::new(pool.clone()),
            chat_repository: ChatRepository::new(pool.clone()),
            members: MemberService::new(pool),
        }
    }

    /// Resolve the single private chat between two users, creating it if
    /// necessary.
    ///
    /// Both users must exist and be distinct. When the chat already exists
    /// (in either creation order) its membership rows are reconciled before
    /// it is returned, which heals chats created by older code paths that
    /// skipped them. A creation race against another caller is resolved by
    /// re-querying the pair.
    pub async fn get_or_create_private_chat(
        &self,
        user_id: i64,
        recipient_id: i64,
    ) -> ChatResult<Chat> {
        if user_id == recipient_id {
            return Err(ChatError::SelfChat);
        }

        if !self.user_repository.exists(user_id).await? {
            return Err(ChatError::UserNotFound);
        }
        if !self.user_repository.exists(recipient_id).await? {
            return Err(ChatError::UserNotFound);
        }

        if let Some(chat) = self
            .chat_repository
            .find_private_between(user_id, recipient_id)
            .await?
        {
            self.members.repair_chat(&chat).await?;
            return Ok(chat);
        }

        match self.chat_repository.create_private(user_id, recipient_id).await {
            Ok(chat) => {
                info!(
                    chat_id = chat.id,
                    creator_id = user_id,
                    recipient_id = recipient_id,
                    "private chat ready"
                );
                Ok(chat)
            }
            Err(ChatError::DuplicateChat) => {
                // Another request created the pair between our lookup and
                // insert; the existing chat is the answer.
                let chat = self
                    .chat_repository
                    .find_private_between(user_id, recipient_id)
                    .await?
                    .ok_or(ChatError::DuplicateChat)?;
                self.members.repair_chat(&chat).await?;
                Ok(chat)
            }
            Err(e) => Err(e),
        }
    }

    /// Every chat a user can reach, newest first, deduplicated by chat id.
    ///
    /// Reachability is the union of explicit ACTIVE membership and being
    /// named creator/recipient on the chat row. Listed chats get their
    /// membership rows backfilled opportunistically.
    pub async fn list_user_chats(&self, user_id: i64) -> ChatResult<Vec<Chat>> {
        let chats = self.chat_repository.find_by_user_id(user_id).await?;

        for chat in &chats {
            if let Err(e) = self.members.repair_chat(chat).await {
                warn!(chat_id = chat.id, error = %e, "failed to backfill chat memberships");
            }
        }

        Ok(chats)
    }
}
