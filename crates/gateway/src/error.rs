//! Error types for the gateway layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Gateway error types
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("WebSocket error: {0}")]
    WebSocketError(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            GatewayError::AuthorizationFailed(_) => StatusCode::FORBIDDEN,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::InternalError(_)
            | GatewayError::DatabaseError(_)
            | GatewayError::WebSocketError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = json!({
            "error": status.as_str(),
            "message": self.to_string(),
        });

        (status, Json(error_response)).into_response()
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<saferoof_auth::AuthError> for GatewayError {
    fn from(error: saferoof_auth::AuthError) -> Self {
        use saferoof_auth::AuthError;
        match error {
            AuthError::UserExists => GatewayError::InvalidRequest("Email already exists".to_string()),
            AuthError::InvalidCredentials => {
                GatewayError::AuthenticationFailed("Invalid credentials".to_string())
            }
            AuthError::InvalidToken(msg) => GatewayError::AuthenticationFailed(msg),
            AuthError::InvalidInput(msg) => GatewayError::InvalidRequest(msg),
            AuthError::UserNotFound => GatewayError::NotFound("User not found".to_string()),
            AuthError::TokenCreation(msg) | AuthError::PasswordHash(msg) => {
                GatewayError::InternalError(msg)
            }
            AuthError::Database(msg) => GatewayError::DatabaseError(msg),
        }
    }
}

impl From<saferoof_database::UserError> for GatewayError {
    fn from(error: saferoof_database::UserError) -> Self {
        use saferoof_database::UserError;
        match error {
            UserError::UserNotFound => GatewayError::NotFound("User not found".to_string()),
            UserError::EmailAlreadyExists => {
                GatewayError::InvalidRequest("Email already exists".to_string())
            }
            UserError::DatabaseError(msg) => GatewayError::DatabaseError(msg),
        }
    }
}

impl From<saferoof_database::ListingError> for GatewayError {
    fn from(error: saferoof_database::ListingError) -> Self {
        use saferoof_database::ListingError;
        match error {
            ListingError::PropertyNotFound => {
                GatewayError::NotFound("Property not found".to_string())
            }
            ListingError::AccessDenied => {
                GatewayError::AuthorizationFailed("Access denied".to_string())
            }
            ListingError::InvalidInput(msg) => GatewayError::InvalidRequest(msg),
            ListingError::ImageStorage(msg) => GatewayError::InternalError(msg),
            ListingError::DatabaseError(msg) => GatewayError::DatabaseError(msg),
        }
    }
}

impl From<saferoof_database::ChatError> for GatewayError {
    fn from(error: saferoof_database::ChatError) -> Self {
        use saferoof_database::ChatError;
        match error {
            ChatError::ConversationNotFound => {
                GatewayError::NotFound("Conversation not found".to_string())
            }
            ChatError::PropertyNotFound => GatewayError::NotFound("Property not found".to_string()),
            ChatError::SelfConversation => {
                GatewayError::InvalidRequest("Cannot chat with yourself".to_string())
            }
            ChatError::AccessDenied => {
                GatewayError::AuthorizationFailed("Access denied".to_string())
            }
            ChatError::InvalidInput(msg) => GatewayError::InvalidRequest(msg),
            ChatError::DatabaseError(msg) => GatewayError::DatabaseError(msg),
        }
    }
}

impl From<saferoof_database::ReviewError> for GatewayError {
    fn from(error: saferoof_database::ReviewError) -> Self {
        use saferoof_database::ReviewError;
        match error {
            ReviewError::ReviewNotFound => GatewayError::NotFound("Review not found".to_string()),
            ReviewError::AlreadyReviewed => {
                GatewayError::InvalidRequest("You have already submitted a review".to_string())
            }
            ReviewError::InvalidRating => {
                GatewayError::InvalidRequest("Rating must be an integer between 1 and 5".to_string())
            }
            ReviewError::InvalidInput(msg) => GatewayError::InvalidRequest(msg),
            ReviewError::AccessDenied => {
                GatewayError::AuthorizationFailed("Access denied".to_string())
            }
            ReviewError::DatabaseError(msg) => GatewayError::DatabaseError(msg),
        }
    }
}

impl From<sqlx::Error> for GatewayError {
    fn from(error: sqlx::Error) -> Self {
        GatewayError::DatabaseError(error.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        GatewayError::InvalidRequest(format!("JSON serialization error: {}", error))
    }
}
