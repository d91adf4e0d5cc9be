use async_trait::async_trait;
use marketplace_storage::{
    catalog_image::{CatalogImage, CatalogImageCreateRequest, CatalogImageStorage},
    profile::{ProfileStorage, UserProfile, UserRole},
    stylist::{StylistStorage, StylistUpsert},
};

use super::{BlobStore, ImageCatalog, ProfileDirectory, ServiceResult, StylistDirectory};
use crate::media_storage::{MediaStorage, PutOptions};

#[async_trait]
impl ProfileDirectory for ProfileStorage {
    async fn list_by_role(&self, role: UserRole) -> ServiceResult<Vec<UserProfile>> {
        Ok(Self::list_by_role(self, role).await?)
    }

    async fn get_profile(&self, user_id: &str) -> ServiceResult<Option<UserProfile>> {
        Ok(self.get_one(user_id).await?)
    }
}

#[async_trait]
impl StylistDirectory for StylistStorage {
    async fn ensure_stylist(
        &self,
        user_id: &str,
        profile: &UserProfile,
    ) -> ServiceResult<StylistUpsert> {
        Ok(self.ensure_exists(user_id, profile).await?)
    }
}

#[async_trait]
impl ImageCatalog for CatalogImageStorage {
    async fn list_for_stylist(&self, stylist_id: &str) -> ServiceResult<Vec<CatalogImage>> {
        Ok(Self::list_for_stylist(self, stylist_id).await?)
    }

    async fn insert(&self, request: CatalogImageCreateRequest) -> ServiceResult<CatalogImage> {
        Ok(Self::insert(self, request).await?)
    }

    async fn delete(&self, stylist_id: &str, image_id: &str) -> ServiceResult<()> {
        Ok(Self::delete(self, stylist_id, image_id).await?)
    }
}

#[async_trait]
impl BlobStore for MediaStorage {
    async fn put(&self, key: &str, bytes: Vec<u8>, options: &PutOptions) -> ServiceResult<()> {
        Ok(self.put_object(key, bytes, options).await?)
    }

    fn public_url(&self, key: &str) -> ServiceResult<String> {
        Ok(Self::public_url(self, key)?)
    }

    async fn delete(&self, keys: &[String]) -> ServiceResult<()> {
        Ok(self.delete_objects(keys).await?)
    }
}
