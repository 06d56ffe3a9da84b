//! REST API endpoints for the gateway

pub mod auth;
pub mod chat;
pub mod health;
pub mod property;
pub mod review;
pub mod user;

use crate::state::GatewayState;
use axum::Router;
use std::sync::Arc;

/// Routes that require no authentication
pub fn create_public_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .merge(auth::create_auth_routes())
        .merge(property::create_property_routes())
        .merge(review::create_review_routes())
}

/// Routes behind the auth guard
pub fn create_protected_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .merge(auth::create_auth_session_routes())
        .merge(user::create_user_routes())
        .merge(property::create_property_owner_routes())
        .merge(chat::create_chat_routes())
        .merge(review::create_review_author_routes())
}
