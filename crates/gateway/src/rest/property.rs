//! Property listing REST endpoints

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::error::{GatewayError, GatewayResult};
use crate::rest::auth::{ErrorResponse, StatusMessage};
use crate::state::GatewayState;
use saferoof_auth::AuthUser;
use saferoof_database::{
    CreatePropertyRequest, Listing, PropertyCategory, PropertyStatus, UpdatePropertyRequest,
};
use saferoof_listings::UploadedImage;

#[derive(Debug, Serialize, ToSchema)]
pub struct PropertyResponse {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub status: String,
    pub category: String,
    pub created_at: String,
    pub updated_at: String,
    pub address: AddressResponse,
    pub images: Vec<PropertyImageResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddressResponse {
    pub locality: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PropertyImageResponse {
    pub id: i64,
    pub image_url: String,
    pub image_name: String,
    pub position: i64,
}

impl From<Listing> for PropertyResponse {
    fn from(listing: Listing) -> Self {
        Self {
            id: listing.property.id,
            owner_id: listing.property.owner_id,
            title: listing.property.title,
            description: listing.property.description,
            price: listing.property.price,
            status: listing.property.status.to_string(),
            category: listing.property.category.to_string(),
            created_at: listing.property.created_at,
            updated_at: listing.property.updated_at,
            address: AddressResponse {
                locality: listing.address.locality,
                city: listing.address.city,
                state: listing.address.state,
                zipcode: listing.address.zipcode,
            },
            images: listing
                .images
                .into_iter()
                .map(|image| PropertyImageResponse {
                    id: image.id,
                    image_url: image.image_url,
                    image_name: image.image_name,
                    position: image.position,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePropertyBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub locality: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
}

/// Public property routes
pub fn create_property_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/property", get(list_properties))
        .route("/property/search", get(search_properties))
        .route("/property/:id", get(get_property))
}

/// Guarded property routes
pub fn create_property_owner_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/property", axum::routing::post(create_property))
        .route("/property/mine", get(list_my_properties))
        .route(
            "/property/:id",
            axum::routing::put(update_property).delete(delete_property),
        )
}

#[utoipa::path(
    get,
    path = "/api/property",
    tag = "Properties",
    responses(
        (status = 200, description = "All listings, newest first", body = Vec<PropertyResponse>)
    )
)]
pub async fn list_properties(
    State(state): State<Arc<GatewayState>>,
) -> GatewayResult<Json<Vec<PropertyResponse>>> {
    let listings = state.properties.list().await?;
    Ok(Json(listings.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/property/search",
    tag = "Properties",
    params(SearchQuery),
    responses(
        (status = 200, description = "Listings matching the query", body = Vec<PropertyResponse>)
    )
)]
pub async fn search_properties(
    Query(params): Query<SearchQuery>,
    State(state): State<Arc<GatewayState>>,
) -> GatewayResult<Json<Vec<PropertyResponse>>> {
    let listings = state
        .properties
        .search(params.query.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(listings.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/property/{id}",
    tag = "Properties",
    params(("id" = i64, Path, description = "Property ID")),
    responses(
        (status = 200, description = "One listing", body = PropertyResponse),
        (status = 404, description = "Property not found", body = ErrorResponse)
    )
)]
pub async fn get_property(
    Path(id): Path<i64>,
    State(state): State<Arc<GatewayState>>,
) -> GatewayResult<Json<PropertyResponse>> {
    let listing = state.properties.get(id).await?;
    Ok(Json(listing.into()))
}

#[utoipa::path(
    get,
    path = "/api/property/mine",
    tag = "Properties",
    responses(
        (status = 200, description = "The caller's listings", body = Vec<PropertyResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn list_my_properties(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
) -> GatewayResult<Json<Vec<PropertyResponse>>> {
    let listings = state.properties.list_mine(user.id).await?;
    Ok(Json(listings.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/property",
    tag = "Properties",
    responses(
        (status = 201, description = "Listing created", body = PropertyResponse),
        (status = 400, description = "Invalid fields or images", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn create_property(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> GatewayResult<impl IntoResponse> {
    let (request, images) = parse_create_form(multipart).await?;

    let listing = state.properties.create(user.id, &request, &images).await?;

    Ok((StatusCode::CREATED, Json(PropertyResponse::from(listing))))
}

#[utoipa::path(
    put,
    path = "/api/property/{id}",
    tag = "Properties",
    params(("id" = i64, Path, description = "Property ID")),
    request_body = UpdatePropertyBody,
    responses(
        (status = 200, description = "Listing updated", body = PropertyResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Property not found", body = ErrorResponse)
    )
)]
pub async fn update_property(
    Path(id): Path<i64>,
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdatePropertyBody>,
) -> GatewayResult<Json<PropertyResponse>> {
    let request = UpdatePropertyRequest {
        title: payload.title,
        description: payload.description,
        price: payload.price,
        status: payload.status.as_deref().map(PropertyStatus::from),
        category: payload.category.as_deref().map(PropertyCategory::from),
        locality: payload.locality,
        city: payload.city,
        state: payload.state,
        zipcode: payload.zipcode,
    };

    let listing = state.properties.update(id, user.id, &request).await?;
    Ok(Json(listing.into()))
}

#[utoipa::path(
    delete,
    path = "/api/property/{id}",
    tag = "Properties",
    params(("id" = i64, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Listing deleted", body = StatusMessage),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Property not found", body = ErrorResponse)
    )
)]
pub async fn delete_property(
    Path(id): Path<i64>,
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
) -> GatewayResult<Json<StatusMessage>> {
    state.properties.delete(id, user.id).await?;
    Ok(Json(StatusMessage {
        message: "Listing deleted".to_string(),
    }))
}

/// Pull the text fields and image parts out of the multipart form
async fn parse_create_form(
    mut multipart: Multipart,
) -> GatewayResult<(CreatePropertyRequest, Vec<UploadedImage>)> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut images: Vec<UploadedImage> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GatewayError::InvalidRequest(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "images" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| GatewayError::InvalidRequest(format!("failed to read image: {e}")))?;
            images.push(UploadedImage {
                file_name,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| GatewayError::InvalidRequest(format!("failed to read field: {e}")))?;
            fields.insert(name, value);
        }
    }

    let required = |key: &str| -> GatewayResult<String> {
        fields
            .get(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| GatewayError::InvalidRequest(format!("missing field: {key}")))
    };

    let price: f64 = required("price")?
        .parse()
        .map_err(|_| GatewayError::InvalidRequest("price must be a number".to_string()))?;

    let request = CreatePropertyRequest {
        title: required("title")?,
        description: required("description")?,
        price,
        status: fields
            .get("status")
            .map(|value| PropertyStatus::from(value.as_str()))
            .unwrap_or(PropertyStatus::Available),
        category: fields
            .get("category")
            .map(|value| PropertyCategory::from(value.as_str()))
            .unwrap_or(PropertyCategory::Residential),
        locality: required("locality")?,
        city: required("city")?,
        state: required("state")?,
        zipcode: required("zipcode")?,
    };

    Ok((request, images))
}
