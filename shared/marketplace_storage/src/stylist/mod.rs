//! Stylist listing storage integration using Dynamo DB
//!
//! The stylists table is a denormalized copy of the profiles that carry the
//! `stylist` role. Rows are created idempotently and also hold the catalog
//! image counter maintained by [`crate::catalog_image`].

mod error;

use std::sync::Arc;

use aws_sdk_dynamodb::{error::SdkError, types::AttributeValue, Client as DynamoDbClient};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::debug;

pub use error::{StylistStorageError, StylistStorageResult};

use crate::profile::UserProfile;

/// Attribute names for stylist table
#[derive(Debug, Clone, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StylistAttribute {
    /// User ID (Primary Key)
    UserId,
    /// Display name
    FullName,
    /// Avatar URL
    AvatarUrl,
    /// Biography
    Bio,
    /// Location
    Location,
    /// Number of catalog images currently owned by the stylist
    ImageCount,
    /// Created At
    CreatedAt,
}

/// Stylist listing record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylistRecord {
    /// User ID (Primary Key)
    pub user_id: String,
    /// Display name copied from the profile
    pub full_name: String,
    /// Avatar URL copied from the profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Biography copied from the profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Location copied from the profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Catalog image counter
    #[serde(default)]
    pub image_count: u32,
    /// Created At (unix millis)
    pub created_at: i64,
}

impl StylistRecord {
    /// Builds a fresh listing record from a profile
    #[must_use]
    pub fn from_profile(user_id: &str, profile: &UserProfile) -> Self {
        Self {
            user_id: user_id.to_string(),
            full_name: profile.full_name.clone(),
            avatar_url: profile.avatar_url.clone(),
            bio: profile.bio.clone(),
            location: profile.location.clone(),
            image_count: 0,
            created_at: Utc::now().timestamp_millis(),
        }
    }
}

/// Outcome of an idempotent stylist upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StylistUpsert {
    /// A new listing record was written
    Created,
    /// A record for the user already existed and was left untouched
    AlreadyExists,
}

/// Stylist storage client for Dynamo DB operations
pub struct StylistStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
}

impl StylistStorage {
    /// Creates a new stylist storage client
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured Dynamo DB client
    /// * `table_name` - Dynamo DB table name for stylist records
    #[must_use]
    pub const fn new(dynamodb_client: Arc<DynamoDbClient>, table_name: String) -> Self {
        Self {
            dynamodb_client,
            table_name,
        }
    }

    /// Ensures a stylist record exists for the given user
    ///
    /// Create-if-absent: an existing record is never overwritten, so calling
    /// this twice for the same user yields one record.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user the record is keyed by
    /// * `profile` - Profile to copy the listing fields from
    ///
    /// # Errors
    ///
    /// Returns `StylistStorageError::NotAStylist` if the profile role is not `stylist`,
    /// or another `StylistStorageError` if the Dynamo DB operation fails
    pub async fn ensure_exists(
        &self,
        user_id: &str,
        profile: &UserProfile,
    ) -> StylistStorageResult<StylistUpsert> {
        if !profile.is_stylist() {
            return Err(StylistStorageError::NotAStylist(user_id.to_string()));
        }

        let record = StylistRecord::from_profile(user_id, profile);
        let item = serde_dynamo::to_item(&record)?;

        let result = self
            .dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#pk)")
            .expression_attribute_names("#pk", StylistAttribute::UserId.to_string())
            .send()
            .await;

        match result {
            Ok(_) => {
                debug!("Created stylist record for {}", user_id);
                Ok(StylistUpsert::Created)
            }
            Err(SdkError::ServiceError(ref svc))
                if svc.err().is_conditional_check_failed_exception() =>
            {
                debug!("Stylist record for {} already exists", user_id);
                Ok(StylistUpsert::AlreadyExists)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Gets a stylist record by user ID
    ///
    /// # Errors
    ///
    /// Returns `StylistStorageError` if the Dynamo DB operation fails
    pub async fn get_one(&self, user_id: &str) -> StylistStorageResult<Option<StylistRecord>> {
        let response = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .key(
                StylistAttribute::UserId.to_string(),
                AttributeValue::S(user_id.to_string()),
            )
            .send()
            .await?;

        let item = response
            .item()
            .map(|item| serde_dynamo::from_item(item.clone()))
            .transpose()?;

        Ok(item)
    }
}
