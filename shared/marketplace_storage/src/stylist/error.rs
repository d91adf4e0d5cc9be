//! Error types for stylist listing storage operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{get_item::GetItemError, put_item::PutItemError};
use thiserror::Error;

/// Result type for stylist storage operations
pub type StylistStorageResult<T> = Result<T, StylistStorageError>;

/// Errors that can occur during stylist storage operations
#[derive(Error, Debug)]
pub enum StylistStorageError {
    /// Failed to insert stylist record into Dynamo DB
    #[error("Failed to insert stylist record into DynamoDB: {0}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to get stylist record from Dynamo DB
    #[error("Failed to get stylist record from DynamoDB: {0}")]
    DynamoDbGetError(#[from] SdkError<GetItemError>),

    /// Profile handed to the upsert does not belong to the stylist role
    #[error("Profile {0} does not have the stylist role")]
    NotAStylist(String),

    /// Serialization error for `serde_dynamo`
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_dynamo::Error> for StylistStorageError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
