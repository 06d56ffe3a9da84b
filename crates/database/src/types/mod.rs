//! Shared types for the database layer

pub mod errors;

pub use errors::{ChatError, DatabaseError, ListingError, ReviewError, UserError};

pub type DatabaseResult<T> = Result<T, DatabaseError>;
pub type UserResult<T> = Result<T, UserError>;
pub type ListingResult<T> = Result<T, ListingError>;
pub type ChatResult<T> = Result<T, ChatError>;
pub type ReviewResult<T> = Result<T, ReviewError>;
