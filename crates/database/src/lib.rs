//! SafeRoof Database Crate
//!
//! This crate provides database functionality for the SafeRoof backend,
//! including connection management, migrations, and repository implementations.

use saferoof_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::{run_migrations, MIGRATOR};

// Re-export repositories
pub use repos::{
    ConversationRepository, MessageRepository, PropertyRepository, ReviewRepository,
    UserRepository,
};

// Re-export entities
pub use entities::{
    Address, Conversation, ConversationSummary, CreatePropertyRequest, CreateUserRequest, Listing,
    Message, NewPropertyImage, Property, PropertyCategory, PropertyImage, PropertyStatus, Review,
    ReviewSummary, UpdatePropertyRequest, UpdateUserRequest, User,
};

// Re-export types
pub use types::{
    errors::{ChatError, DatabaseError, ListingError, ReviewError, UserError},
    ChatResult, DatabaseResult, ListingResult, ReviewResult, UserResult,
};

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    Ok(pool)
}
