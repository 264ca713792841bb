//! # Duolog Chats Crate
//!
//! Core business logic for one-to-one messaging: locating and creating
//! private chats, keeping membership rows consistent with the pair named on
//! each chat, and authorizing message and attachment operations against that
//! membership state.
//!
//! ## Architecture
//!
//! - **Services**: [`ChatService`] (chat directory), [`MemberService`]
//!   (membership reconciliation and checks), [`MessageService`] (message
//!   lifecycle), [`AttachmentService`] (upload metadata)
//! - **Storage**: the [`BlobStore`] seam for attachment bytes
//! - **Utils**: input validation
//!
//! Repositories and entities live in `duolog-database`; the key re-exports
//! are mirrored here for convenience.

pub mod services;
pub mod storage;
pub mod utils;

pub use services::{AttachmentService, ChatService, FileUpload, MemberService, MessageService};
pub use storage::{BlobStore, FsBlobStore};
pub use utils::Validator;

// Re-export the shared domain types for callers of this crate.
pub use duolog_database::{
    Chat, ChatError, ChatMember, ChatResult, ChatType, ErrorKind, FileAttachment, MemberRole,
    MemberStatus, Message, MessageState, MessageType,
};
