//! Chat entity definitions

use serde::{Deserialize, Serialize};

/// A private conversation between exactly two users. The creator/recipient
/// split records who opened the chat, not who "owns" it: lookups always treat
/// the pair as unordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub chat_type: ChatType,
    pub creator_id: i64,
    pub recipient_id: i64,
    pub created_at: String,
    pub is_active: bool,
}

impl Chat {
    /// Whether `user_id` is one of the two parties named on the chat row.
    pub fn names_participant(&self, user_id: i64) -> bool {
        self.creator_id == user_id || self.recipient_id == user_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChatType {
    Private,
}

impl ChatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatType::Private => "private",
        }
    }
}

impl From<&str> for ChatType {
    fn from(_s: &str) -> Self {
        ChatType::Private
    }
}

impl ToString for ChatType {
    fn to_string(&self) -> String {
        self.as_str().to_string()
    }
}
