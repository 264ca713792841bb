//! Entity definitions for the Duolog data model.

pub mod attachment;
pub mod chat;
pub mod member;
pub mod message;
pub mod user;

pub use attachment::{CreateAttachmentRequest, FileAttachment};
pub use chat::{Chat, ChatType};
pub use member::{ChatMember, MemberRole, MemberStatus};
pub use message::{CreateMessageRequest, Message, MessageState, MessageType};
pub use user::{CreateUserRequest, User};
