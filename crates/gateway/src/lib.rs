//! # SafeRoof Gateway Crate
//!
//! This crate provides the API gateway layer for SafeRoof, handling HTTP REST
//! and WebSocket connections and routing them to the domain services
//! (auth, listings, chat, reviews).
//!
//! ## Architecture
//!
//! - **REST**: HTTP API endpoints under `/api` with OpenAPI documentation
//! - **WebSocket**: the relay channel at `/api/ws`
//! - **State**: shared application state holding the services and relay hub
//! - **Middleware**: the auth guard, CORS, and request logging

pub mod error;
pub mod middleware;
pub mod rest;
pub mod state;
pub mod websocket;

// Re-export main types for convenience
pub use error::{GatewayError, GatewayResult};
pub use middleware::auth_middleware;
pub use state::GatewayState;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    middleware as axum_middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Request bodies are dominated by listing photo uploads
const BODY_LIMIT: usize = 32 * 1024 * 1024;

/// Create the main application router with all routes
pub fn create_router(state: GatewayState) -> Router {
    let arc_state = Arc::new(state);

    let api = Router::new()
        .merge(rest::create_public_routes())
        .merge(rest::create_protected_routes().route_layer(
            axum_middleware::from_fn_with_state(arc_state.clone(), middleware::auth_middleware),
        ))
        .merge(websocket::create_websocket_routes());

    let mut router = Router::new()
        .nest("/api", api)
        .route("/health", get(rest::health::health_check))
        .nest_service(
            "/uploads",
            ServeDir::new(&arc_state.uploads_dir),
        );

    // Serve the built SPA bundle when one is configured
    if let Some(static_dir) = &arc_state.static_dir {
        let index = static_dir.join("index.html");
        router = router.fallback_service(
            ServeDir::new(static_dir).fallback(ServeFile::new(index)),
        );
    }

    let mut router = router
        .with_state(arc_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers(Any),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(axum_middleware::from_fn(middleware::logging_middleware));

    // Add Swagger UI in debug builds
    #[cfg(debug_assertions)]
    {
        #[derive(OpenApi)]
        #[openapi(
            paths(
                rest::health::health_check,
                rest::auth::signup,
                rest::auth::login,
                rest::auth::logout,
                rest::auth::me,
                rest::user::me,
                rest::user::update,
                rest::user::delete_account,
                rest::property::list_properties,
                rest::property::search_properties,
                rest::property::get_property,
                rest::property::list_my_properties,
                rest::property::create_property,
                rest::property::update_property,
                rest::property::delete_property,
                rest::chat::open_conversation,
                rest::chat::list_conversations,
                rest::chat::delete_conversation,
                rest::chat::list_messages,
                rest::chat::send_message,
                rest::chat::mark_read,
                rest::chat::unread_count,
                rest::review::list_reviews,
                rest::review::review_summary,
                rest::review::create_review,
                rest::review::delete_review,
            ),
            components(
                schemas(
                    rest::health::HealthResponse,
                    rest::auth::SignupRequest,
                    rest::auth::LoginRequest,
                    rest::auth::UserResponse,
                    rest::auth::SessionResponse,
                    rest::auth::StatusMessage,
                    rest::auth::ErrorResponse,
                    rest::user::UpdateProfileRequest,
                    rest::property::PropertyResponse,
                    rest::property::AddressResponse,
                    rest::property::PropertyImageResponse,
                    rest::property::UpdatePropertyBody,
                    rest::chat::OpenConversationRequest,
                    rest::chat::SendMessageRequest,
                    rest::chat::ConversationResponse,
                    rest::chat::ConversationSummaryResponse,
                    rest::chat::MessageResponse,
                    rest::chat::ReadReceiptResponse,
                    rest::chat::UnreadCountResponse,
                    rest::review::CreateReviewRequest,
                    rest::review::ReviewResponse,
                    rest::review::ReviewAuthorResponse,
                    rest::review::ReviewSummaryResponse,
                )
            ),
            tags(
                (name = "Health", description = "Service health"),
                (name = "Auth", description = "Authentication endpoints"),
                (name = "Users", description = "Profile management"),
                (name = "Properties", description = "Property listings"),
                (name = "Chat", description = "Conversations and the relay channel"),
                (name = "Reviews", description = "Site reviews"),
            )
        )]
        struct ApiDoc;

        router = router.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
    }

    router
}
