//! Stored listing photos.

use once_cell::sync::Lazy;
use cuid2::CuidConstructor;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use saferoof_database::{ListingError, ListingResult, NewPropertyImage};

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// An image file received from a multipart upload
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Writes uploaded photos under the uploads directory and serves them
/// back as `/uploads/<stem>.<ext>` URLs.
#[derive(Clone)]
pub struct ImageStore {
    directory: PathBuf,
    max_image_bytes: usize,
}

impl ImageStore {
    pub fn new(directory: impl Into<PathBuf>, max_image_bytes: usize) -> Self {
        Self {
            directory: directory.into(),
            max_image_bytes,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Create the uploads directory if it does not exist yet
    pub async fn ensure_directory(&self) -> ListingResult<()> {
        fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| ListingError::ImageStorage(e.to_string()))
    }

    /// Persist one uploaded image, returning the row to insert
    pub async fn save(&self, upload: &UploadedImage) -> ListingResult<NewPropertyImage> {
        if upload.bytes.is_empty() {
            return Err(ListingError::InvalidInput("empty image upload".to_string()));
        }
        if upload.bytes.len() > self.max_image_bytes {
            return Err(ListingError::InvalidInput(format!(
                "image too large (max {} bytes)",
                self.max_image_bytes
            )));
        }

        let extension = extension_of(&upload.file_name)?;
        let stored_name = format!("{}.{}", CUID.create_id(), extension);
        let path = self.directory.join(&stored_name);

        self.ensure_directory().await?;
        fs::write(&path, &upload.bytes)
            .await
            .map_err(|e| ListingError::ImageStorage(e.to_string()))?;

        debug!(file = %path.display(), "stored listing image");

        Ok(NewPropertyImage {
            image_url: format!("/uploads/{stored_name}"),
            image_name: upload.file_name.clone(),
        })
    }

    /// Best-effort removal of a stored image by its public URL
    pub async fn remove(&self, image_url: &str) {
        let Some(stored_name) = image_url.strip_prefix("/uploads/") else {
            return;
        };
        // refuse anything that could escape the uploads directory
        if stored_name.contains('/') || stored_name.contains("..") {
            return;
        }

        let path = self.directory.join(stored_name);
        if let Err(error) = fs::remove_file(&path).await {
            warn!(file = %path.display(), %error, "failed to remove stored image");
        }
    }
}

fn extension_of(file_name: &str) -> ListingResult<String> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| ListingError::InvalidInput("image has no file extension".to_string()))?;

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ListingError::InvalidInput(format!(
            "unsupported image type .{extension}"
        )));
    }

    Ok(extension)
}
