use thiserror::Error;

use crate::services::ServiceError;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors surfaced by the catalog image manager
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Nobody is signed in
    #[error("You must be signed in to manage catalog images")]
    NotAuthenticated,

    /// Upload exceeds the size limit
    #[error("File is too large: {size} bytes (max {max} bytes)")]
    FileTooLarge {
        /// Upload size in bytes
        size: u64,
        /// Configured limit in bytes
        max: u64,
    },

    /// Upload is not an image
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Catalog already holds the maximum number of images
    #[error("Catalog already holds the maximum of {max} images")]
    ImageLimitReached {
        /// Configured per-stylist maximum
        max: usize,
    },

    /// The signed-in user has no stylist record to attach images to
    #[error("User {0} is not registered as a stylist")]
    StylistNotRegistered(String),

    /// No image with this ID in the loaded catalog
    #[error("Catalog image not found: {0}")]
    NotFound(String),

    /// Stored image URL does not name a storage key
    #[error("Cannot derive storage key from image URL: {0}")]
    InvalidImageUrl(String),

    /// Backend call failed
    #[error(transparent)]
    Backend(#[from] ServiceError),
}
