//! Shared application state for the gateway

use sqlx::SqlitePool;
use std::path::PathBuf;

use crate::error::{GatewayError, GatewayResult};
use saferoof_auth::Authenticator;
use saferoof_chat::{ConversationHub, ConversationService};
use saferoof_config::AppConfig;
use saferoof_listings::{ImageStore, PropertyService, ReviewService};

/// Shared application state containing all services
#[derive(Clone)]
pub struct GatewayState {
    /// Database connection pool
    pub pool: SqlitePool,
    /// Authentication service
    pub authenticator: Authenticator,
    /// Property listing service
    pub properties: PropertyService,
    /// Review service
    pub reviews: ReviewService,
    /// Conversation service
    pub conversations: ConversationService,
    /// Relay channel hub
    pub hub: ConversationHub,
    /// Directory the uploaded listing photos live in
    pub uploads_dir: PathBuf,
    /// Optional directory holding the built SPA bundle
    pub static_dir: Option<PathBuf>,
}

impl GatewayState {
    /// Create a new gateway state with all services initialized
    pub fn new(pool: SqlitePool, config: &AppConfig) -> Self {
        let uploads_dir = PathBuf::from(&config.uploads.directory);
        let image_store = ImageStore::new(&uploads_dir, config.uploads.max_image_bytes);

        Self {
            authenticator: Authenticator::new(pool.clone(), &config.auth),
            properties: PropertyService::new(
                pool.clone(),
                image_store,
                config.uploads.max_images,
            ),
            reviews: ReviewService::new(pool.clone()),
            conversations: ConversationService::new(pool.clone()),
            hub: ConversationHub::new(),
            uploads_dir,
            static_dir: config.static_files.directory.as_ref().map(PathBuf::from),
            pool,
        }
    }

    /// Create gateway state from configuration, initializing the database
    pub async fn from_config(config: &AppConfig) -> GatewayResult<Self> {
        let pool = saferoof_database::initialize_database(&config.database)
            .await
            .map_err(|e| GatewayError::DatabaseError(e.to_string()))?;

        Ok(Self::new(pool, config))
    }
}
