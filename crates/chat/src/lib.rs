//! SafeRoof chat crate
//!
//! Owner–buyer conversations persisted through the database crate plus
//! the relay channel that mirrors new messages and read receipts to
//! connected participants.

pub mod events;
pub mod hub;
pub mod service;

pub use events::{ClientEvent, ServerEvent};
pub use hub::ConversationHub;
pub use service::ConversationService;
