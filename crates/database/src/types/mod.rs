//! Shared types for the database layer.

pub mod errors;

pub use errors::{ChatError, ErrorKind};

/// Result type alias for chat data operations
pub type ChatResult<T> = Result<T, ChatError>;
