//! Entity definitions for the database layer

pub mod conversation;
pub mod property;
pub mod review;
pub mod user;

pub use conversation::{Conversation, ConversationSummary, Message};
pub use property::{
    Address, CreatePropertyRequest, Listing, NewPropertyImage, Property, PropertyCategory,
    PropertyImage, PropertyStatus, UpdatePropertyRequest,
};
pub use review::{Review, ReviewSummary};
pub use user::{CreateUserRequest, UpdateUserRequest, User};
