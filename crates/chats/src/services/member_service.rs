//! Membership reconciliation and checks.
//!
//! A private chat carries its participants in two places: the explicit
//! `chat_members` rows and the implicit creator/recipient pair on the chat
//! row itself. Chats written before the membership table existed only have
//! the implicit form, so every membership question is answered through this
//! service, which treats the chat row as authoritative and lazily backfills
//! the explicit rows to match.

use std::collections::BTreeSet;

use duolog_database::{Chat, ChatError, ChatRepository, ChatResult, MemberRepository};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

/// Single view over explicit membership rows and implicit
/// creator/recipient membership.
pub struct MemberService {
    chat_repository: ChatRepository,
    member_repository: MemberRepository,
}

impl MemberService {
    /// Create a new member service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            chat_repository: ChatRepository::new(pool.clone()),
            member_repository: MemberRepository::new(pool),
        }
    }

    /// Make sure an ACTIVE membership row exists for `(chat_id, user_id)`.
    ///
    /// Safe to call redundantly and concurrently: an existing ACTIVE row is
    /// left untouched, and a concurrent insert racing past the lookup is
    /// absorbed by the partial unique index. Existing rows are never demoted.
    pub async fn ensure_active_membership(&self, chat_id: i64, user_id: i64) -> ChatResult<()> {
        if self
            .member_repository
            .find_active(chat_id, user_id)
            .await?
            .is_some()
        {
            return Ok(());
        }

        if self.member_repository.insert_active(chat_id, user_id).await? {
            debug!(chat_id = chat_id, user_id = user_id, "backfilled membership row");
        }

        Ok(())
    }

    /// Ensure ACTIVE membership rows for both participants named on a chat.
    pub async fn repair_chat(&self, chat: &Chat) -> ChatResult<()> {
        self.ensure_active_membership(chat.id, chat.creator_id).await?;
        self.ensure_active_membership(chat.id, chat.recipient_id).await?;
        Ok(())
    }

    /// Whether `user_id` counts as a member of `chat_id`.
    ///
    /// The explicit ACTIVE row is the fast path. Failing that, being named
    /// creator or recipient on the chat row is sufficient; such a hit also
    /// schedules a best-effort backfill so the next check takes the fast
    /// path. A nonexistent chat simply yields `false`.
    pub async fn is_member(&self, chat_id: i64, user_id: i64) -> ChatResult<bool> {
        if self
            .member_repository
            .find_active(chat_id, user_id)
            .await?
            .is_some()
        {
            return Ok(true);
        }

        let Some(chat) = self.chat_repository.find_by_id(chat_id).await? else {
            return Ok(false);
        };

        if chat.names_participant(user_id) {
            // Repair is opportunistic here; membership holds regardless.
            if let Err(e) = self.ensure_active_membership(chat_id, user_id).await {
                warn!(
                    chat_id = chat_id,
                    user_id = user_id,
                    error = %e,
                    "failed to backfill membership row"
                );
            }
            return Ok(true);
        }

        Ok(false)
    }

    /// The set of user ids participating in a chat.
    ///
    /// The result is the union of ACTIVE membership rows and the pair named
    /// on the chat row, so both parties always appear even when the
    /// backfill write has not landed yet.
    pub async fn list_participants(&self, chat_id: i64) -> ChatResult<BTreeSet<i64>> {
        let chat = self
            .chat_repository
            .find_by_id(chat_id)
            .await?
            .ok_or(ChatError::ChatNotFound)?;

        if let Err(e) = self.repair_chat(&chat).await {
            warn!(chat_id = chat_id, error = %e, "failed to repair chat memberships");
        }

        let mut participants: BTreeSet<i64> = self
            .member_repository
            .active_user_ids(chat_id)
            .await?
            .into_iter()
            .collect();
        participants.insert(chat.creator_id);
        participants.insert(chat.recipient_id);

        Ok(participants)
    }

    /// Startup sweep: backfill membership rows for every existing chat.
    ///
    /// A chat that fails to heal is logged and skipped; the count of
    /// successfully swept chats is returned. Only the initial chat listing
    /// can fail the sweep outright.
    pub async fn heal_all_chats(&self) -> ChatResult<u64> {
        let chat_ids = self.chat_repository.all_ids().await?;
        let total = chat_ids.len();
        let mut failures = 0u64;

        for chat_id in chat_ids {
            let outcome = match self.chat_repository.find_by_id(chat_id).await {
                Ok(Some(chat)) => self.repair_chat(&chat).await,
                Ok(None) => Ok(()),
                Err(e) => Err(e),
            };

            if let Err(e) = outcome {
                failures += 1;
                warn!(chat_id = chat_id, error = %e, "membership sweep failed for chat");
            }
        }

        info!(
            chats = total,
            failures = failures,
            "membership sweep complete"
        );

        Ok(total as u64 - failures)
    }
}
