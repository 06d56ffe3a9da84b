//! Property listing service: validation and ownership rules over the repository.

use sqlx::SqlitePool;
use tracing::info;

use crate::images::{ImageStore, UploadedImage};
use saferoof_database::{
    CreatePropertyRequest, Listing, ListingError, ListingResult, NewPropertyImage,
    PropertyRepository, UpdatePropertyRequest,
};

/// Service for property listings
#[derive(Clone)]
pub struct PropertyService {
    properties: PropertyRepository,
    images: ImageStore,
    max_images: usize,
}

impl PropertyService {
    pub fn new(pool: SqlitePool, images: ImageStore, max_images: usize) -> Self {
        Self {
            properties: PropertyRepository::new(pool),
            images,
            max_images,
        }
    }

    /// Create a listing from validated fields plus its uploaded photos
    pub async fn create(
        &self,
        owner_id: i64,
        request: &CreatePropertyRequest,
        uploads: &[UploadedImage],
    ) -> ListingResult<Listing> {
        validate_create(request)?;

        if uploads.len() > self.max_images {
            return Err(ListingError::InvalidInput(format!(
                "too many images (max {})",
                self.max_images
            )));
        }

        let mut stored: Vec<NewPropertyImage> = Vec::with_capacity(uploads.len());
        for upload in uploads {
            match self.images.save(upload).await {
                Ok(image) => stored.push(image),
                Err(error) => {
                    self.discard(&stored).await;
                    return Err(error);
                }
            }
        }

        match self.properties.create(owner_id, request, &stored).await {
            Ok(listing) => Ok(listing),
            Err(error) => {
                self.discard(&stored).await;
                Err(error)
            }
        }
    }

    /// All listings, newest first
    pub async fn list(&self) -> ListingResult<Vec<Listing>> {
        self.properties.list_all().await
    }

    /// The user's own listings
    pub async fn list_mine(&self, owner_id: i64) -> ListingResult<Vec<Listing>> {
        self.properties.list_by_owner(owner_id).await
    }

    /// Substring search; a blank query matches nothing
    pub async fn search(&self, query: &str) -> ListingResult<Vec<Listing>> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        self.properties.search(trimmed).await
    }

    /// One listing by ID
    pub async fn get(&self, id: i64) -> ListingResult<Listing> {
        self.properties
            .find_listing(id)
            .await?
            .ok_or(ListingError::PropertyNotFound)
    }

    /// Update a listing. Owners only.
    pub async fn update(
        &self,
        id: i64,
        user_id: i64,
        request: &UpdatePropertyRequest,
    ) -> ListingResult<Listing> {
        self.require_owner(id, user_id).await?;

        if let Some(ref title) = request.title {
            if title.trim().is_empty() {
                return Err(ListingError::InvalidInput("title must not be empty".to_string()));
            }
        }
        if let Some(price) = request.price {
            validate_price(price)?;
        }

        let listing = self.properties.update(id, request).await?;
        info!(property_id = id, user_id, "updated property listing");
        Ok(listing)
    }

    /// Delete a listing and its stored photos. Owners only.
    pub async fn delete(&self, id: i64, user_id: i64) -> ListingResult<()> {
        let listing = self.require_owner(id, user_id).await?;

        self.properties.delete(id).await?;
        for image in &listing.images {
            self.images.remove(&image.image_url).await;
        }

        info!(property_id = id, user_id, "deleted property listing");
        Ok(())
    }

    async fn require_owner(&self, id: i64, user_id: i64) -> ListingResult<Listing> {
        let listing = self.get(id).await?;
        if listing.property.owner_id != user_id {
            return Err(ListingError::AccessDenied);
        }
        Ok(listing)
    }

    async fn discard(&self, stored: &[NewPropertyImage]) {
        for image in stored {
            self.images.remove(&image.image_url).await;
        }
    }
}

fn validate_create(request: &CreatePropertyRequest) -> ListingResult<()> {
    if request.title.trim().is_empty() {
        return Err(ListingError::InvalidInput("title must not be empty".to_string()));
    }
    if request.title.len() > 255 {
        return Err(ListingError::InvalidInput(
            "title too long (max 255 characters)".to_string(),
        ));
    }
    if request.description.trim().is_empty() {
        return Err(ListingError::InvalidInput(
            "description must not be empty".to_string(),
        ));
    }
    validate_price(request.price)?;

    for (field, value) in [
        ("locality", &request.locality),
        ("city", &request.city),
        ("state", &request.state),
        ("zipcode", &request.zipcode),
    ] {
        if value.trim().is_empty() {
            return Err(ListingError::InvalidInput(format!("{field} must not be empty")));
        }
    }

    Ok(())
}

fn validate_price(price: f64) -> ListingResult<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ListingError::InvalidInput(
            "price must be a positive number".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use saferoof_database::{PropertyCategory, PropertyStatus};

    fn request(price: f64) -> CreatePropertyRequest {
        CreatePropertyRequest {
            title: "Cottage".to_string(),
            description: "Sunny".to_string(),
            price,
            status: PropertyStatus::Available,
            category: PropertyCategory::Residential,
            locality: "Old Town".to_string(),
            city: "Springfield".to_string(),
            state: "CA".to_string(),
            zipcode: "90210".to_string(),
        }
    }

    #[test]
    fn create_validation_catches_bad_fields() {
        assert!(validate_create(&request(100.0)).is_ok());
        assert!(validate_create(&request(0.0)).is_err());
        assert!(validate_create(&request(f64::NAN)).is_err());

        let mut blank_title = request(100.0);
        blank_title.title = "  ".to_string();
        assert!(validate_create(&blank_title).is_err());

        let mut blank_city = request(100.0);
        blank_city.city = String::new();
        assert!(validate_create(&blank_city).is_err());
    }
}
