//! Duolog Database Crate
//!
//! This crate provides database functionality for the Duolog messaging
//! backend, including connection management, migrations, and repository
//! implementations for chats, memberships, messages, and attachments.

use sqlx::SqlitePool;

use duolog_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::{prepare_database, DatabaseConnection};
pub use migrations::{run_migrations, MIGRATOR};

// Re-export repositories
pub use repos::{
    AttachmentRepository, ChatRepository, MemberRepository, MessageRepository, UserRepository,
};

// Re-export entities
pub use entities::{
    attachment::{CreateAttachmentRequest, FileAttachment},
    chat::{Chat, ChatType},
    member::{ChatMember, MemberRole, MemberStatus},
    message::{CreateMessageRequest, Message, MessageState, MessageType},
    user::{CreateUserRequest, User},
};

// Re-export types
pub use types::{
    errors::{ChatError, ErrorKind},
    ChatResult,
};

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> anyhow::Result<SqlitePool> {
    let pool = prepare_database(config).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_database_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let config = DatabaseConfig {
            url: db_url,
            max_connections: 1,
        };

        let pool = initialize_database(&config).await.unwrap();

        let result: (bool,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(result.0, "foreign keys should be enabled");
    }
}
