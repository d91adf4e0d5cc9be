//! Backend-service traits used by the registrar and the catalog manager
//!
//! Components only see these traits; [`aws`] wires them to `DynamoDB` and S3.

mod aws;
mod error;

use async_trait::async_trait;
use marketplace_storage::{
    catalog_image::{CatalogImage, CatalogImageCreateRequest},
    profile::{UserProfile, UserRole},
    stylist::StylistUpsert,
};

pub use error::{ServiceError, ServiceResult};

use crate::media_storage::PutOptions;

/// Read access to user profiles
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// Lists every profile with the given role
    async fn list_by_role(&self, role: UserRole) -> ServiceResult<Vec<UserProfile>>;

    /// Loads one profile, `None` if the user has none
    async fn get_profile(&self, user_id: &str) -> ServiceResult<Option<UserProfile>>;
}

/// Stylist listing records
#[async_trait]
pub trait StylistDirectory: Send + Sync {
    /// Creates the stylist record if absent; an existing record is left untouched
    async fn ensure_stylist(
        &self,
        user_id: &str,
        profile: &UserProfile,
    ) -> ServiceResult<StylistUpsert>;
}

/// Catalog image metadata table
#[async_trait]
pub trait ImageCatalog: Send + Sync {
    /// Images owned by `stylist_id`, oldest first
    async fn list_for_stylist(&self, stylist_id: &str) -> ServiceResult<Vec<CatalogImage>>;

    /// Inserts a row; id and timestamps are assigned by the store
    async fn insert(&self, request: CatalogImageCreateRequest) -> ServiceResult<CatalogImage>;

    /// Deletes the row matching both `stylist_id` and `image_id`
    async fn delete(&self, stylist_id: &str, image_id: &str) -> ServiceResult<()>;
}

/// Public blob storage for image bytes
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes `bytes` under `key`
    async fn put(&self, key: &str, bytes: Vec<u8>, options: &PutOptions) -> ServiceResult<()>;

    /// Durable public URL for `key`
    fn public_url(&self, key: &str) -> ServiceResult<String>;

    /// Removes the given keys
    async fn delete(&self, keys: &[String]) -> ServiceResult<()>;
}
