use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::objects::delete::DeleteObjectRequest;
use std::env;

#[derive(Debug)]
pub enum MediaError {
    StorageError(String),
    EnvironmentError(String),
}

impl std::fmt::Display for MediaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaError::StorageError(err) => write!(f, "Storage error: {}", err),
            MediaError::EnvironmentError(err) => write!(f, "Environment error: {}", err),
        }
    }
}

impl std::error::Error for MediaError {}

/// Seam over the media host so the release logic can be exercised without
/// network access.
pub trait MediaOperations {
    async fn delete_object(&self, object: &str) -> Result<(), MediaError>;
}

pub struct GcsMediaStore {
    client: Client,
    bucket: String,
}

impl GcsMediaStore {
    pub async fn new() -> Result<Self, MediaError> {
        let bucket = env::var("MEDIA_BUCKET")
            .map_err(|_| MediaError::EnvironmentError("MEDIA_BUCKET not set".to_string()))?;

        let config = ClientConfig::default().with_auth().await.map_err(|e| {
            MediaError::StorageError(format!("Failed to create GCS client: {}", e))
        })?;

        Ok(Self {
            client: Client::new(config),
            bucket,
        })
    }
}

impl MediaOperations for GcsMediaStore {
    async fn delete_object(&self, object: &str) -> Result<(), MediaError> {
        let request = DeleteObjectRequest {
            bucket: self.bucket.clone(),
            object: object.to_string(),
            ..Default::default()
        };

        self.client
            .delete_object(&request)
            .await
            .map_err(|e| MediaError::StorageError(format!("Failed to delete {}: {}", object, e)))
    }
}

/// Last path segment of an image URL with its extension stripped. This is
/// the identifier the media host knows the image by.
pub fn public_id_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }

    let id = match segment.rsplit_once('.') {
        Some((name, _ext)) if !name.is_empty() => name,
        _ => segment,
    };

    Some(id.to_string())
}

pub struct ImageService<M: MediaOperations> {
    store: M,
    folder: String,
}

impl ImageService<GcsMediaStore> {
    pub async fn new() -> Result<Self, MediaError> {
        let folder = env::var("MEDIA_FOLDER").unwrap_or_else(|_| "atlas-tours".to_string());
        let store = GcsMediaStore::new().await?;
        Ok(Self { store, folder })
    }
}

impl<M: MediaOperations> ImageService<M> {
    pub fn with_store(store: M, folder: &str) -> Self {
        Self {
            store,
            folder: folder.to_string(),
        }
    }

    /// Deletes every image in `urls` from the media host, one request per
    /// URL. Strictly best-effort: a failed or malformed URL is logged and
    /// skipped, and the call itself never fails. No retries.
    pub async fn release_images(&self, urls: &[String]) {
        for url in urls {
            let Some(public_id) = public_id_from_url(url) else {
                log::warn!("Could not derive a storage id from image URL: {}", url);
                continue;
            };

            let object = format!("{}/{}", self.folder, public_id);
            if let Err(e) = self.store.delete_object(&object).await {
                log::warn!("Image release failed for {}: {}", url, e);
            }
        }
    }
}
