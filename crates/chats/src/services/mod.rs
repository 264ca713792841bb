//! Business logic services for chats, membership, messages, and attachments.

pub mod attachment_service;
pub mod chat_service;
pub mod member_service;
pub mod message_service;

pub use attachment_service::{AttachmentService, FileUpload};
pub use chat_service::ChatService;
pub use member_service::MemberService;
pub use message_service::MessageService;
