//! User profile storage module for `DynamoDB` operations
//!
//! Profiles are owned by the account system; this crate only reads them.

mod error;

use std::collections::HashMap;
use std::sync::Arc;

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
pub use error::{ProfileStorageError, ProfileStorageResult};
use serde::{Deserialize, Serialize};
use serde_dynamo::from_items;
use strum::{Display, EnumString};
use tracing::debug;

/// Role a marketplace user signed up with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserRole {
    /// Books appointments with stylists
    Client,
    /// Offers services and owns a catalog
    Stylist,
    /// Marketplace operator
    Admin,
}

/// `DynamoDB` table for user profiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Primary key - account user ID
    pub user_id: String,
    /// Role of the user (used for the role GSI)
    pub role: UserRole,
    /// Display name
    pub full_name: String,
    /// Contact email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Public avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Free-form biography
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// City or area the user works in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Creation timestamp (unix millis)
    pub created_at: i64,
    /// Last update timestamp (unix millis)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl UserProfile {
    /// Whether the profile is eligible for the stylist listing
    #[must_use]
    pub fn is_stylist(&self) -> bool {
        self.role == UserRole::Stylist
    }
}

/// `DynamoDB` attribute names for the profile table
#[derive(Debug, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ProfileAttribute {
    /// Primary key - account user ID
    UserId,
    /// User role (used for GSI)
    Role,
    /// Display name
    FullName,
    /// Contact email
    Email,
    /// Avatar URL
    AvatarUrl,
    /// Biography
    Bio,
    /// Location
    Location,
    /// Creation timestamp
    CreatedAt,
    /// Update timestamp
    UpdatedAt,
}

/// Storage client for user profile operations
pub struct ProfileStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
    role_index_name: String,
}

impl ProfileStorage {
    /// Creates a new storage instance
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured `DynamoDB` client
    /// * `table_name` - `DynamoDB` table name for profiles
    /// * `role_index_name` - Name of the GSI keyed on `role`
    #[must_use]
    pub const fn new(
        dynamodb_client: Arc<DynamoDbClient>,
        table_name: String,
        role_index_name: String,
    ) -> Self {
        Self {
            dynamodb_client,
            table_name,
            role_index_name,
        }
    }

    /// Get a single profile by user ID
    ///
    /// # Errors
    ///
    /// Returns `ProfileStorageError` if the `DynamoDB` get operation fails
    pub async fn get_one(&self, user_id: &str) -> ProfileStorageResult<Option<UserProfile>> {
        let response = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .key(
                ProfileAttribute::UserId.to_string(),
                AttributeValue::S(user_id.to_string()),
            )
            .send()
            .await?;

        response
            .item()
            .map(|item| {
                serde_dynamo::from_item(item.clone())
                    .map_err(|e| ProfileStorageError::SerializationError(e.to_string()))
            })
            .transpose()
    }

    /// List every profile with the given role
    ///
    /// Follows `LastEvaluatedKey` until the index is exhausted, so the
    /// result is complete even when it spans several pages.
    ///
    /// # Errors
    ///
    /// Returns `ProfileStorageError` if any page of the `DynamoDB` query fails
    pub async fn list_by_role(&self, role: UserRole) -> ProfileStorageResult<Vec<UserProfile>> {
        let mut profiles = Vec::new();
        let mut exclusive_start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let response = self
                .dynamodb_client
                .query()
                .table_name(&self.table_name)
                .index_name(&self.role_index_name)
                .key_condition_expression("#role = :role")
                .expression_attribute_names("#role", ProfileAttribute::Role.to_string())
                .expression_attribute_values(":role", AttributeValue::S(role.to_string()))
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await?;

            let next_key = response.last_evaluated_key;
            let items = response.items.unwrap_or_default();
            profiles.extend(from_items::<_, UserProfile>(items)?);

            match next_key {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
                _ => break,
            }
        }

        debug!("Listed {} profiles with role {}", profiles.len(), role);

        Ok(profiles)
    }
}
