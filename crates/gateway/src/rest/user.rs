//! User profile REST endpoints

use axum::{
    extract::State,
    routing::{delete, get, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::GatewayResult;
use crate::rest::auth::{ErrorResponse, StatusMessage, UserResponse};
use crate::state::GatewayState;
use saferoof_auth::{AuthUser, ProfileUpdate};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Guarded user profile routes
pub fn create_user_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/user/me", get(me))
        .route("/user/update", put(update))
        .route("/user/delete", delete(delete_account))
}

#[utoipa::path(
    get,
    path = "/api/user/me",
    tag = "Users",
    responses(
        (status = 200, description = "The authenticated user's profile", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
) -> GatewayResult<Json<UserResponse>> {
    let profile = state.authenticator.profile(user.id).await?;
    Ok(Json(profile.into()))
}

#[utoipa::path(
    put,
    path = "/api/user/update",
    tag = "Users",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid input or taken email", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn update(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> GatewayResult<Json<UserResponse>> {
    let updated = state
        .authenticator
        .update_profile(
            user.id,
            &ProfileUpdate {
                first_name: payload.first_name,
                last_name: payload.last_name,
                email: payload.email,
                password: payload.password,
            },
        )
        .await?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/user/delete",
    tag = "Users",
    responses(
        (status = 200, description = "Account deleted", body = StatusMessage),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn delete_account(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
) -> GatewayResult<Json<StatusMessage>> {
    state.authenticator.delete_account(user.id).await?;
    Ok(Json(StatusMessage {
        message: "Account deleted".to_string(),
    }))
}
