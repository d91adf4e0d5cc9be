//! Catalog image manager for the signed-in stylist
//!
//! Image bytes go to the [`BlobStore`], metadata rows to the [`ImageCatalog`].
//! The manager keeps the last loaded list together with a loading flag and the
//! most recent error so a UI can render straight from [`CatalogImageManager::snapshot`].
mod error;
mod state;
mod upload;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;
use chrono::Utc;
use marketplace_storage::catalog_image::{
    sort_by_creation, CatalogImage, CatalogImageCreateRequest, CatalogImageStorage,
    CatalogImageStorageError,
};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

pub use error::{CatalogError, CatalogResult};
pub use state::CatalogState;
pub use upload::{CatalogLimits, ImageUpload};

use self::{
    state::LoadingGuard,
    upload::{key_from_public_url, storage_key},
};
use crate::{
    media_storage::{MediaStorage, PutOptions},
    services::{BlobStore, ImageCatalog, ServiceError},
    session::SessionHandle,
    types::Environment,
};

/// What happened to the blob of a deleted image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum BlobCleanup {
    /// Blob under this key was removed
    Removed(String),
    /// Row is gone but the blob could not be removed
    Failed(String),
}

/// Result of a successful delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageDeletion {
    /// The removed metadata row
    pub image: CatalogImage,
    /// Blob removal outcome
    pub blob_cleanup: BlobCleanup,
}

impl ImageDeletion {
    /// The blob was left behind
    #[must_use]
    pub const fn has_warning(&self) -> bool {
        matches!(self.blob_cleanup, BlobCleanup::Failed(_))
    }
}

/// Per-stylist catalog image manager
pub struct CatalogImageManager {
    session: SessionHandle,
    catalog: Arc<dyn ImageCatalog>,
    blobs: Arc<dyn BlobStore>,
    limits: CatalogLimits,
    state: Mutex<CatalogState>,
}

impl CatalogImageManager {
    /// Creates a manager with the default limits
    #[must_use]
    pub fn new(
        session: SessionHandle,
        catalog: Arc<dyn ImageCatalog>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            session,
            catalog,
            blobs,
            limits: CatalogLimits::default(),
            state: Mutex::new(CatalogState::default()),
        }
    }

    /// Creates a manager backed by the `DynamoDB` catalog table and the S3 bucket
    /// configured for `environment`
    ///
    /// The storage-side image cap is taken from the same limits as the
    /// client-side check.
    pub async fn from_environment(environment: &Environment, session: SessionHandle) -> Self {
        let limits = environment.catalog_limits();

        let aws_config = environment.aws_config().await;
        let catalog = Arc::new(CatalogImageStorage::new(
            Arc::new(DynamoDbClient::new(&aws_config)),
            environment.catalog_images_table_name(),
            environment.stylists_table_name(),
            limits.storage_max_images(),
        ));

        let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
        let blobs = Arc::new(MediaStorage::new(
            s3_client,
            environment.s3_bucket(),
            environment.media_public_base_url(),
        ));

        Self::new(session, catalog, blobs).with_limits(limits)
    }

    /// Replaces the default upload limits
    #[must_use]
    pub const fn with_limits(mut self, limits: CatalogLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Upload limits in force
    #[must_use]
    pub const fn limits(&self) -> CatalogLimits {
        self.limits
    }

    /// Copy of the current state
    #[must_use]
    pub fn snapshot(&self) -> CatalogState {
        self.lock().clone()
    }

    /// Last loaded images, oldest first
    #[must_use]
    pub fn images(&self) -> Vec<CatalogImage> {
        self.lock().images.clone()
    }

    /// Whether a backend operation is in flight
    #[must_use]
    pub fn loading(&self) -> bool {
        self.lock().loading
    }

    /// Most recent failure message
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    /// Loads the signed-in stylist's images, oldest first
    ///
    /// Returns an empty list and leaves the state untouched when nobody is
    /// signed in. On failure the previously loaded images are kept.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Backend` if listing fails
    #[instrument(skip(self))]
    pub async fn fetch_images(&self) -> CatalogResult<Vec<CatalogImage>> {
        let Some(session) = self.session.current() else {
            return Ok(Vec::new());
        };

        let _loading = LoadingGuard::start(&self.state);
        self.load_images(session.user_id()).await
    }

    /// Same as [`Self::fetch_images`]
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Backend` if listing fails
    pub async fn refresh_images(&self) -> CatalogResult<Vec<CatalogImage>> {
        self.fetch_images().await
    }

    /// Uploads an image and records its metadata
    ///
    /// Checks run in order: session, size, media type, image count. A failed
    /// check makes no backend call. If anything fails after the blob was
    /// written, the blob is deleted again before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns the failed check as `CatalogError`, or `CatalogError::Backend`
    /// if a blob or metadata call fails
    #[instrument(skip(self, upload), fields(file_name = %upload.file_name, size = upload.bytes.len()))]
    pub async fn upload_image(&self, upload: ImageUpload) -> CatalogResult<CatalogImage> {
        let Some(session) = self.session.current() else {
            warn!("Upload attempted without a session");
            return Err(self.fail(CatalogError::NotAuthenticated));
        };
        let user_id = session.user_id();

        let size = upload.size();
        if size > self.limits.max_file_size_bytes {
            warn!("Rejected upload of {} bytes", size);
            return Err(self.fail(CatalogError::FileTooLarge {
                size,
                max: self.limits.max_file_size_bytes,
            }));
        }

        let Some(mime_type) = upload.image_media_type() else {
            warn!("Rejected upload with media type {:?}", upload.content_type);
            return Err(self.fail(CatalogError::UnsupportedMediaType(upload.content_type)));
        };

        if self.lock().images.len() >= self.limits.max_images {
            warn!("Catalog of {} is full", user_id);
            return Err(self.fail(CatalogError::ImageLimitReached {
                max: self.limits.max_images,
            }));
        }

        let _loading = LoadingGuard::start(&self.state);

        let key = storage_key(user_id, Utc::now().timestamp_millis(), &upload.file_name);
        let options = PutOptions::new(mime_type.clone());

        if let Err(e) = self.blobs.put(&key, upload.bytes, &options).await {
            error!("Failed to store blob {}: {}", key, e);
            return Err(self.fail(e.into()));
        }

        let request = CatalogImageCreateRequest {
            stylist_id: user_id.to_string(),
            image_url: String::new(),
            file_name: Some(upload.file_name),
            file_size: Some(size),
            mime_type: Some(mime_type),
        };

        let image = match self.record_image(&key, request).await {
            Ok(image) => image,
            Err(e) => {
                error!("Failed to record catalog image {}: {}", key, e);
                self.discard_blob(&key).await;
                return Err(self.fail(e));
            }
        };

        info!("Uploaded catalog image {} for {}", image.id, user_id);

        if let Err(e) = self.load_images(user_id).await {
            warn!("Uploaded image {} but reloading the catalog failed: {}", image.id, e);
        }

        Ok(image)
    }

    /// Deletes an image from the loaded catalog
    ///
    /// The metadata row is removed first, scoped to the signed-in owner; the
    /// blob is removed afterwards. A failed blob removal does not fail the
    /// delete and is reported in [`ImageDeletion::blob_cleanup`].
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotAuthenticated` or `CatalogError::NotFound`
    /// without a backend call, or `CatalogError::Backend` if the row delete fails
    #[instrument(skip(self))]
    pub async fn delete_image(&self, image_id: &str) -> CatalogResult<ImageDeletion> {
        let Some(session) = self.session.current() else {
            warn!("Delete attempted without a session");
            return Err(self.fail(CatalogError::NotAuthenticated));
        };
        let user_id = session.user_id();

        let existing = self.lock().images.iter().find(|i| i.id == image_id).cloned();
        let Some(image) = existing else {
            warn!("Image {} is not in the loaded catalog", image_id);
            return Err(self.fail(CatalogError::NotFound(image_id.to_string())));
        };

        let _loading = LoadingGuard::start(&self.state);

        if let Err(e) = self.catalog.delete(user_id, image_id).await {
            error!("Failed to delete catalog image {}: {}", image_id, e);
            let err = match e {
                ServiceError::Catalog(CatalogImageStorageError::NotFound { .. }) => {
                    CatalogError::NotFound(image_id.to_string())
                }
                other => CatalogError::Backend(other),
            };
            return Err(self.fail(err));
        }

        self.lock().images.retain(|i| i.id != image_id);

        let blob_cleanup = match key_from_public_url(&image.image_url) {
            Ok(key) => match self.blobs.delete(std::slice::from_ref(&key)).await {
                Ok(()) => BlobCleanup::Removed(key),
                Err(e) => {
                    warn!("Deleted image {} but its blob {} remains: {}", image_id, key, e);
                    BlobCleanup::Failed(e.to_string())
                }
            },
            Err(e) => {
                warn!("Deleted image {} but its blob cannot be located: {}", image_id, e);
                BlobCleanup::Failed(e.to_string())
            }
        };

        info!("Deleted catalog image {} for {}", image_id, user_id);

        Ok(ImageDeletion {
            image,
            blob_cleanup,
        })
    }

    /// Lists from the backend and replaces the loaded images
    async fn load_images(&self, user_id: &str) -> CatalogResult<Vec<CatalogImage>> {
        match self.catalog.list_for_stylist(user_id).await {
            Ok(mut images) => {
                sort_by_creation(&mut images);
                self.lock().images.clone_from(&images);
                Ok(images)
            }
            Err(e) => {
                error!("Failed to list catalog images for {}: {}", user_id, e);
                Err(self.fail(e.into()))
            }
        }
    }

    /// Resolves the public URL and inserts the metadata row
    async fn record_image(
        &self,
        key: &str,
        mut request: CatalogImageCreateRequest,
    ) -> CatalogResult<CatalogImage> {
        request.image_url = self.blobs.public_url(key)?;

        self.catalog.insert(request).await.map_err(|e| match e {
            ServiceError::Catalog(CatalogImageStorageError::ImageLimitReached {
                max_images, ..
            }) => CatalogError::ImageLimitReached {
                max: usize::try_from(max_images).unwrap_or(usize::MAX),
            },
            ServiceError::Catalog(CatalogImageStorageError::StylistNotRegistered(stylist_id)) => {
                CatalogError::StylistNotRegistered(stylist_id)
            }
            other => CatalogError::Backend(other),
        })
    }

    /// Removes a blob whose metadata row was never written
    async fn discard_blob(&self, key: &str) {
        match self.blobs.delete(&[key.to_string()]).await {
            Ok(()) => warn!("Discarded blob {} after failed upload", key),
            Err(e) => error!("Failed to discard orphaned blob {}: {}", key, e),
        }
    }

    /// Records `err` as the current error
    fn fail(&self, err: CatalogError) -> CatalogError {
        self.lock().error = Some(err.to_string());
        err
    }

    fn lock(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
