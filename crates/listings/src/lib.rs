//! SafeRoof listings crate
//!
//! The marketplace domain: property listings with uploaded photos,
//! plus the site review feature.

pub mod images;
pub mod property_service;
pub mod review_service;

pub use images::{ImageStore, UploadedImage};
pub use property_service::PropertyService;
pub use review_service::ReviewService;
