//! Membership entity definitions

use serde::{Deserialize, Serialize};

/// Explicit join record linking a user to a chat. Chats created before this
/// table existed may lack rows; the membership service backfills them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMember {
    pub id: i64,
    pub chat_id: i64,
    pub user_id: i64,
    pub role: MemberRole,
    pub status: MemberStatus,
    pub joined_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemberRole {
    Participant,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Participant => "participant",
        }
    }
}

impl From<&str> for MemberRole {
    fn from(_s: &str) -> Self {
        MemberRole::Participant
    }
}

impl ToString for MemberRole {
    fn to_string(&self) -> String {
        self.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemberStatus {
    Active,
    Blocked,
    Left,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Blocked => "blocked",
            MemberStatus::Left => "left",
        }
    }
}

impl From<&str> for MemberStatus {
    fn from(s: &str) -> Self {
        match s {
            "blocked" => MemberStatus::Blocked,
            "left" => MemberStatus::Left,
            _ => MemberStatus::Active,
        }
    }
}

impl ToString for MemberStatus {
    fn to_string(&self) -> String {
        self.as_str().to_string()
    }
}
