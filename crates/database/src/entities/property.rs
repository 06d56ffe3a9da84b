//! Property listing entity definitions

use serde::{Deserialize, Serialize};

/// A property listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub status: PropertyStatus,
    pub category: PropertyCategory,
    pub created_at: String,
    pub updated_at: String,
}

/// The single address attached to a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: i64,
    pub property_id: i64,
    pub locality: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
}

/// A stored listing photo, served from the uploads directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyImage {
    pub id: i64,
    pub property_id: i64,
    pub image_url: String,
    pub image_name: String,
    pub position: i64,
}

/// A property together with its address and ordered images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(flatten)]
    pub property: Property,
    pub address: Address,
    pub images: Vec<PropertyImage>,
}

/// Request for creating a new property with its address
#[derive(Debug, Clone)]
pub struct CreatePropertyRequest {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub status: PropertyStatus,
    pub category: PropertyCategory,
    pub locality: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
}

/// Request for updating a property. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdatePropertyRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub status: Option<PropertyStatus>,
    pub category: Option<PropertyCategory>,
    pub locality: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
}

/// An image row to insert alongside a property
#[derive(Debug, Clone)]
pub struct NewPropertyImage {
    pub image_url: String,
    pub image_name: String,
}

/// Property status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyStatus {
    Available,
    Sold,
}

impl PropertyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Available => "available",
            PropertyStatus::Sold => "sold",
        }
    }
}

impl From<&str> for PropertyStatus {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "sold" => PropertyStatus::Sold,
            _ => PropertyStatus::Available,
        }
    }
}

impl std::fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Property category enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyCategory {
    Residential,
    Commercial,
    Land,
}

impl PropertyCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyCategory::Residential => "residential",
            PropertyCategory::Commercial => "commercial",
            PropertyCategory::Land => "land",
        }
    }
}

impl From<&str> for PropertyCategory {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "commercial" => PropertyCategory::Commercial,
            "land" => PropertyCategory::Land,
            _ => PropertyCategory::Residential,
        }
    }
}

impl std::fmt::Display for PropertyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
