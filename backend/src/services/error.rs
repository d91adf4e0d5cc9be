//! Errors crossing the backend-service seam

use marketplace_storage::{
    catalog_image::CatalogImageStorageError, profile::ProfileStorageError,
    stylist::StylistStorageError,
};
use thiserror::Error;

use crate::media_storage::BucketError;

/// Result type for backend-service calls
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure reported by a backend service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Profile lookup or listing failed
    #[error(transparent)]
    Profile(#[from] ProfileStorageError),

    /// Stylist record upsert failed
    #[error(transparent)]
    Stylist(#[from] StylistStorageError),

    /// Catalog metadata operation failed
    #[error(transparent)]
    Catalog(#[from] CatalogImageStorageError),

    /// Blob storage operation failed
    #[error(transparent)]
    Bucket(#[from] BucketError),

    /// Backend could not be reached or refused the call
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}
