//! Error types for user profile storage operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{get_item::GetItemError, query::QueryError};
use thiserror::Error;

/// Result type alias for profile storage operations
pub type ProfileStorageResult<T> = Result<T, ProfileStorageError>;

/// Storage error types for user profile operations
#[derive(Debug, Error)]
pub enum ProfileStorageError {
    /// Failed to get profile from `DynamoDB`
    #[error("Failed to get profile from DynamoDB: {0}")]
    DynamoDbGetError(#[from] SdkError<GetItemError>),

    /// Failed to query profiles from `DynamoDB`
    #[error("Failed to query profiles from DynamoDB: {0}")]
    DynamoDbQueryError(#[from] SdkError<QueryError>),

    /// Failed to parse profile from `DynamoDB` item
    #[error("Failed to parse profile: {0}")]
    SerializationError(String),
}

impl From<serde_dynamo::Error> for ProfileStorageError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
