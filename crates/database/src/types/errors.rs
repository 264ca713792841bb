//! Error types for the chat data layer.

use thiserror::Error;

/// Coarse rejection category for a [`ChatError`], used by transport layers
/// to map failures onto their own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidRequest,
    NotFound,
    Forbidden,
    InvalidState,
    Conflict,
    Internal,
}

/// Chat-domain errors shared by repositories and services.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat not found")]
    ChatNotFound,

    #[error("message not found")]
    MessageNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("cannot create a chat with yourself")]
    SelfChat,

    #[error("you are not a member of this chat")]
    NotAMember,

    #[error("only the author may modify a message")]
    NotMessageAuthor,

    #[error("message has been deleted")]
    MessageDeleted,

    #[error("a private chat between these users already exists")]
    DuplicateChat,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("database error: {0}")]
    DatabaseError(String),
}

impl ChatError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// The rejection category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ChatNotFound | Self::MessageNotFound | Self::UserNotFound => ErrorKind::NotFound,
            Self::SelfChat | Self::Validation(_) => ErrorKind::InvalidRequest,
            Self::NotAMember | Self::NotMessageAuthor => ErrorKind::Forbidden,
            Self::MessageDeleted => ErrorKind::InvalidState,
            Self::DuplicateChat => ErrorKind::Conflict,
            Self::Storage(_) | Self::DatabaseError(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_rejection_taxonomy() {
        assert_eq!(ChatError::SelfChat.kind(), ErrorKind::InvalidRequest);
        assert_eq!(ChatError::ChatNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(ChatError::NotAMember.kind(), ErrorKind::Forbidden);
        assert_eq!(ChatError::NotMessageAuthor.kind(), ErrorKind::Forbidden);
        assert_eq!(ChatError::MessageDeleted.kind(), ErrorKind::InvalidState);
        assert_eq!(ChatError::DuplicateChat.kind(), ErrorKind::Conflict);
        assert_eq!(
            ChatError::DatabaseError("boom".into()).kind(),
            ErrorKind::Internal
        );
    }
}
