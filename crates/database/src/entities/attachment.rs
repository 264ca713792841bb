//! Attachment entity definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAttachment {
    pub id: i64,
    pub message_id: i64,
    pub filename: String,
    pub stored_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub uploaded_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAttachmentRequest {
    pub message_id: i64,
    pub filename: String,
    pub stored_name: String,
    pub file_size: i64,
    pub mime_type: String,
}
