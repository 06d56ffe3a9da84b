//! Error types for the database layer

use thiserror::Error;

/// General database error
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database query error: {0}")]
    QueryError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),
}

/// User-specific database errors
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    UserNotFound,

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Listing-specific database errors
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Property not found")]
    PropertyNotFound,

    #[error("Access denied")]
    AccessDenied,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Image storage error: {0}")]
    ImageStorage(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Chat-specific database errors
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Conversation not found")]
    ConversationNotFound,

    #[error("Property not found")]
    PropertyNotFound,

    #[error("Cannot start a conversation about your own property")]
    SelfConversation,

    #[error("Access denied")]
    AccessDenied,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Review-specific database errors
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Review not found")]
    ReviewNotFound,

    #[error("You have already submitted a review")]
    AlreadyReviewed,

    #[error("Rating must be an integer between 1 and 5")]
    InvalidRating,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Access denied")]
    AccessDenied,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
