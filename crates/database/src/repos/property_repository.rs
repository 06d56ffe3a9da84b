//! Repository for property listing data access operations.

use crate::entities::{
    Address, CreatePropertyRequest, Listing, NewPropertyImage, Property, PropertyCategory,
    PropertyImage, PropertyStatus, UpdatePropertyRequest,
};
use crate::types::{ListingError, ListingResult};
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Repository for property database operations
#[derive(Clone)]
pub struct PropertyRepository {
    pool: SqlitePool,
}

impl PropertyRepository {
    /// Create a new property repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_property(row: &sqlx::sqlite::SqliteRow) -> Property {
        Property {
            id: row.get("id"),
            owner_id: row.get("owner_id"),
            title: row.get("title"),
            description: row.get("description"),
            price: row.get("price"),
            status: PropertyStatus::from(row.get::<String, _>("status").as_str()),
            category: PropertyCategory::from(row.get::<String, _>("category").as_str()),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    fn row_to_address(row: &sqlx::sqlite::SqliteRow) -> Address {
        Address {
            id: row.get("id"),
            property_id: row.get("property_id"),
            locality: row.get("locality"),
            city: row.get("city"),
            state: row.get("state"),
            zipcode: row.get("zipcode"),
        }
    }

    /// Create a property with its address and image rows in one transaction
    pub async fn create(
        &self,
        owner_id: i64,
        request: &CreatePropertyRequest,
        images: &[NewPropertyImage],
    ) -> ListingResult<Listing> {
        let now = Utc::now().to_rfc3339();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ListingError::DatabaseError(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO properties (owner_id, title, description, price, status, category, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(owner_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.price)
        .bind(request.status.as_str())
        .bind(request.category.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| ListingError::DatabaseError(e.to_string()))?;

        let property_id = result.last_insert_rowid();

        sqlx::query(
            "INSERT INTO addresses (property_id, locality, city, state, zipcode) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(property_id)
        .bind(&request.locality)
        .bind(&request.city)
        .bind(&request.state)
        .bind(&request.zipcode)
        .execute(&mut *tx)
        .await
        .map_err(|e| ListingError::DatabaseError(e.to_string()))?;

        for (position, image) in images.iter().enumerate() {
            sqlx::query(
                "INSERT INTO property_images (property_id, image_url, image_name, position) VALUES (?, ?, ?, ?)",
            )
            .bind(property_id)
            .bind(&image.image_url)
            .bind(&image.image_name)
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| ListingError::DatabaseError(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| ListingError::DatabaseError(e.to_string()))?;

        info!(property_id, owner_id, "created property listing");

        self.find_listing(property_id)
            .await?
            .ok_or_else(|| ListingError::DatabaseError("Failed to retrieve created listing".to_string()))
    }

    /// Find a bare property row by ID
    pub async fn find_property(&self, id: i64) -> ListingResult<Option<Property>> {
        let row = sqlx::query("SELECT * FROM properties WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ListingError::DatabaseError(e.to_string()))?;

        Ok(row.as_ref().map(Self::row_to_property))
    }

    /// Find a property with its address and images
    pub async fn find_listing(&self, id: i64) -> ListingResult<Option<Listing>> {
        let Some(property) = self.find_property(id).await? else {
            return Ok(None);
        };

        Ok(Some(self.hydrate(property).await?))
    }

    /// All listings, newest first
    pub async fn list_all(&self) -> ListingResult<Vec<Listing>> {
        let rows = sqlx::query("SELECT * FROM properties ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ListingError::DatabaseError(e.to_string()))?;

        let mut listings = Vec::with_capacity(rows.len());
        for row in &rows {
            listings.push(self.hydrate(Self::row_to_property(row)).await?);
        }
        Ok(listings)
    }

    /// Listings owned by a given user, newest first
    pub async fn list_by_owner(&self, owner_id: i64) -> ListingResult<Vec<Listing>> {
        let rows = sqlx::query("SELECT * FROM properties WHERE owner_id = ? ORDER BY id DESC")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ListingError::DatabaseError(e.to_string()))?;

        let mut listings = Vec::with_capacity(rows.len());
        for row in &rows {
            listings.push(self.hydrate(Self::row_to_property(row)).await?);
        }
        Ok(listings)
    }

    /// Substring search over title, description, category, and address city
    pub async fn search(&self, query: &str) -> ListingResult<Vec<Listing>> {
        let pattern = format!("%{}%", query);

        let rows = sqlx::query(
            "SELECT * FROM properties
             WHERE title LIKE ?1 OR description LIKE ?1 OR category LIKE ?1
                OR id IN (SELECT property_id FROM addresses WHERE city LIKE ?1)
             ORDER BY id DESC",
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ListingError::DatabaseError(e.to_string()))?;

        let mut listings = Vec::with_capacity(rows.len());
        for row in &rows {
            listings.push(self.hydrate(Self::row_to_property(row)).await?);
        }
        Ok(listings)
    }

    /// Update a property and its address. `None` fields keep their value.
    pub async fn update(
        &self,
        id: i64,
        request: &UpdatePropertyRequest,
    ) -> ListingResult<Listing> {
        let current = self
            .find_listing(id)
            .await?
            .ok_or(ListingError::PropertyNotFound)?;
        let now = Utc::now().to_rfc3339();

        let title = request.title.clone().unwrap_or(current.property.title);
        let description = request
            .description
            .clone()
            .unwrap_or(current.property.description);
        let price = request.price.unwrap_or(current.property.price);
        let status = request.status.unwrap_or(current.property.status);
        let category = request.category.unwrap_or(current.property.category);

        sqlx::query(
            "UPDATE properties SET title = ?, description = ?, price = ?, status = ?, category = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&title)
        .bind(&description)
        .bind(price)
        .bind(status.as_str())
        .bind(category.as_str())
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| ListingError::DatabaseError(e.to_string()))?;

        let locality = request.locality.clone().unwrap_or(current.address.locality);
        let city = request.city.clone().unwrap_or(current.address.city);
        let state = request.state.clone().unwrap_or(current.address.state);
        let zipcode = request.zipcode.clone().unwrap_or(current.address.zipcode);

        sqlx::query(
            "UPDATE addresses SET locality = ?, city = ?, state = ?, zipcode = ? WHERE property_id = ?",
        )
        .bind(&locality)
        .bind(&city)
        .bind(&state)
        .bind(&zipcode)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| ListingError::DatabaseError(e.to_string()))?;

        self.find_listing(id)
            .await?
            .ok_or(ListingError::PropertyNotFound)
    }

    /// Delete a property. Address and image rows cascade away.
    pub async fn delete(&self, id: i64) -> ListingResult<()> {
        let result = sqlx::query("DELETE FROM properties WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| ListingError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ListingError::PropertyNotFound);
        }

        Ok(())
    }

    async fn hydrate(&self, property: Property) -> ListingResult<Listing> {
        let address_row = sqlx::query("SELECT * FROM addresses WHERE property_id = ?")
            .bind(property.id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ListingError::DatabaseError(e.to_string()))?;

        let image_rows = sqlx::query(
            "SELECT * FROM property_images WHERE property_id = ? ORDER BY position, id",
        )
        .bind(property.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ListingError::DatabaseError(e.to_string()))?;

        let images = image_rows
            .iter()
            .map(|row| PropertyImage {
                id: row.get("id"),
                property_id: row.get("property_id"),
                image_url: row.get("image_url"),
                image_name: row.get("image_name"),
                position: row.get("position"),
            })
            .collect();

        Ok(Listing {
            address: Self::row_to_address(&address_row),
            property,
            images,
        })
    }
}
