//! Message entity definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub chat_id: i64,
    pub author_id: i64,
    pub content: String,
    pub message_type: MessageType,
    pub state: MessageState,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl Message {
    pub fn is_deleted(&self) -> bool {
        self.state == MessageState::Deleted
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    pub chat_id: i64,
    pub author_id: i64,
    pub content: String,
    pub message_type: MessageType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessageType {
    Text,
    File,
    System,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::File => "file",
            MessageType::System => "system",
        }
    }
}

impl From<&str> for MessageType {
    fn from(s: &str) -> Self {
        match s {
            "file" => MessageType::File,
            "system" => MessageType::System,
            _ => MessageType::Text,
        }
    }
}

impl ToString for MessageType {
    fn to_string(&self) -> String {
        self.as_str().to_string()
    }
}

/// Message lifecycle. Deletion is terminal for mutation purposes: a deleted
/// message can never transition back to active or accept edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessageState {
    Active,
    Deleted,
}

impl MessageState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageState::Active => "active",
            MessageState::Deleted => "deleted",
        }
    }
}

impl From<&str> for MessageState {
    fn from(s: &str) -> Self {
        match s {
            "deleted" => MessageState::Deleted,
            _ => MessageState::Active,
        }
    }
}

impl ToString for MessageState {
    fn to_string(&self) -> String {
        self.as_str().to_string()
    }
}
