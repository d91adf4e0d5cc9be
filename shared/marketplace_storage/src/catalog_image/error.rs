//! Error types for catalog image storage operations

use aws_sdk_dynamodb::error::{BuildError, SdkError};
use aws_sdk_dynamodb::operation::{
    delete_item::DeleteItemError, query::QueryError,
    transact_write_items::TransactWriteItemsError,
};
use thiserror::Error;

/// Result type alias for catalog image storage operations
pub type CatalogImageStorageResult<T> = Result<T, CatalogImageStorageError>;

/// Storage error types for catalog image operations
#[derive(Debug, Error)]
pub enum CatalogImageStorageError {
    /// Failed to query catalog images from `DynamoDB`
    #[error("Failed to query catalog images from DynamoDB: {0}")]
    DynamoDbQueryError(#[from] SdkError<QueryError>),

    /// Failed to run the insert or delete transaction
    #[error("Failed to write catalog image transaction to DynamoDB: {0}")]
    DynamoDbTransactionError(#[from] SdkError<TransactWriteItemsError>),

    /// Failed to delete a catalog image without the quota counter
    #[error("Failed to delete catalog image from DynamoDB: {0}")]
    DynamoDbDeleteError(#[from] SdkError<DeleteItemError>),

    /// Failed to build a transaction item
    #[error("Failed to build DynamoDB request: {0}")]
    RequestBuildError(#[from] BuildError),

    /// Stylist has no listing record to count images against
    #[error("Stylist {0} has no stylist record")]
    StylistNotRegistered(String),

    /// Stylist already owns the maximum number of images
    #[error("Stylist {stylist_id} cannot add more images (limit {max_images})")]
    ImageLimitReached {
        /// Owner of the catalog
        stylist_id: String,
        /// Configured per-stylist maximum
        max_images: u32,
    },

    /// No image with this ID exists for the stylist
    #[error("Catalog image {image_id} not found for stylist {stylist_id}")]
    NotFound {
        /// Owner the delete was scoped to
        stylist_id: String,
        /// Requested image ID
        image_id: String,
    },

    /// Failed to parse catalog image from `DynamoDB` item
    #[error("Failed to parse catalog image: {0}")]
    SerializationError(String),
}

impl From<serde_dynamo::Error> for CatalogImageStorageError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
