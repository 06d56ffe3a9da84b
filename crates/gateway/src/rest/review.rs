//! Review REST endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::GatewayResult;
use crate::rest::auth::ErrorResponse;
use crate::state::GatewayState;
use saferoof_auth::AuthUser;
use saferoof_database::{Review, ReviewSummary};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub rating: i64,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: i64,
    pub user_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: String,
    pub author: ReviewAuthorResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewAuthorResponse {
    pub first_name: String,
    pub last_name: String,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
            author: ReviewAuthorResponse {
                first_name: review.author_first_name,
                last_name: review.author_last_name,
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewSummaryResponse {
    pub total: i64,
    pub average: f64,
}

impl From<ReviewSummary> for ReviewSummaryResponse {
    fn from(summary: ReviewSummary) -> Self {
        Self {
            total: summary.total,
            average: summary.average,
        }
    }
}

/// Public review routes
pub fn create_review_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/review", get(list_reviews))
        .route("/review/summary", get(review_summary))
}

/// Guarded review routes
pub fn create_review_author_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/review", post(create_review))
        .route("/review/:id", delete(delete_review))
}

#[utoipa::path(
    get,
    path = "/api/review",
    tag = "Reviews",
    responses(
        (status = 200, description = "All reviews, newest first", body = Vec<ReviewResponse>)
    )
)]
pub async fn list_reviews(
    State(state): State<Arc<GatewayState>>,
) -> GatewayResult<Json<Vec<ReviewResponse>>> {
    let reviews = state.reviews.list().await?;
    Ok(Json(reviews.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/review/summary",
    tag = "Reviews",
    responses(
        (status = 200, description = "Review count and mean rating", body = ReviewSummaryResponse)
    )
)]
pub async fn review_summary(
    State(state): State<Arc<GatewayState>>,
) -> GatewayResult<Json<ReviewSummaryResponse>> {
    let summary = state.reviews.summary().await?;
    Ok(Json(summary.into()))
}

#[utoipa::path(
    post,
    path = "/api/review",
    tag = "Reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Invalid rating or already reviewed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn create_review(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateReviewRequest>,
) -> GatewayResult<impl IntoResponse> {
    let review = state
        .reviews
        .create(user.id, payload.rating, payload.comment)
        .await?;

    Ok((StatusCode::CREATED, Json(ReviewResponse::from(review))))
}

#[utoipa::path(
    delete,
    path = "/api/review/{id}",
    tag = "Reviews",
    params(("id" = i64, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse)
    )
)]
pub async fn delete_review(
    Path(id): Path<i64>,
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
) -> GatewayResult<impl IntoResponse> {
    state.reviews.delete(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
