//! Catalog image metadata storage using Dynamo DB
//!
//! Rows are keyed by (`stylist_id`, `id`) so every read and delete is scoped
//! to the owning stylist. Inserts and deletes run as transactions that also
//! maintain `image_count` on the stylist record, which turns the per-stylist
//! image limit into a condition checked by `DynamoDB` itself.

mod error;

use std::collections::HashMap;
use std::sync::Arc;

use aws_sdk_dynamodb::{
    error::SdkError,
    operation::transact_write_items::TransactWriteItemsError,
    types::{
        AttributeValue, CancellationReason, Delete, Put, ReturnValuesOnConditionCheckFailure,
        TransactWriteItem, Update,
    },
    Client as DynamoDbClient,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_dynamo::from_items;
use strum::Display;
use tracing::{debug, warn};

pub use error::{CatalogImageStorageError, CatalogImageStorageResult};

use crate::stylist::StylistAttribute;

/// Attribute names for catalog image table
#[derive(Debug, Clone, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CatalogImageAttribute {
    /// Owning stylist (Partition Key)
    StylistId,
    /// Image ID (Sort Key)
    Id,
    /// Public URL of the blob
    ImageUrl,
    /// Original file name
    FileName,
    /// Size in bytes
    FileSize,
    /// Media type
    MimeType,
    /// Created At
    CreatedAt,
    /// Updated At
    UpdatedAt,
}

/// Catalog image metadata row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogImage {
    /// Image ID (UUID v4)
    pub id: String,
    /// Owning stylist
    pub stylist_id: String,
    /// Publicly resolvable URL of the blob
    pub image_url: String,
    /// Original file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    /// Media type, e.g. `image/png`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Created At (unix millis)
    pub created_at: i64,
    /// Updated At (unix millis)
    pub updated_at: i64,
}

/// Request to create a new catalog image row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogImageCreateRequest {
    /// Owning stylist
    pub stylist_id: String,
    /// Public URL of the already uploaded blob
    pub image_url: String,
    /// Original file name
    pub file_name: Option<String>,
    /// Size in bytes
    pub file_size: Option<u64>,
    /// Media type
    pub mime_type: Option<String>,
}

/// Sorts images oldest first, breaking ties by ID so the order is stable
pub fn sort_by_creation(images: &mut [CatalogImage]) {
    images.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// First transaction item whose condition check failed, with its index
fn failed_condition(
    err: &SdkError<TransactWriteItemsError>,
) -> Option<(usize, &CancellationReason)> {
    let SdkError::ServiceError(svc) = err else {
        return None;
    };
    let TransactWriteItemsError::TransactionCanceledException(cancelled) = svc.err() else {
        return None;
    };

    cancelled
        .cancellation_reasons()
        .iter()
        .enumerate()
        .find(|(_, reason)| reason.code() == Some("ConditionalCheckFailed"))
}

/// Why the quota update of an insert was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuotaRejection {
    /// No stylist record to count against
    MissingRecord,
    /// Record exists and is at the limit
    LimitReached,
}

impl QuotaRejection {
    /// The update returns the old item on a failed check; no item means no record
    fn from_reason(reason: &CancellationReason) -> Self {
        match reason.item() {
            Some(item) if !item.is_empty() => Self::LimitReached,
            _ => Self::MissingRecord,
        }
    }
}

/// Catalog image storage client for Dynamo DB operations
pub struct CatalogImageStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
    stylists_table_name: String,
    max_images_per_stylist: u32,
}

impl CatalogImageStorage {
    /// Creates a new catalog image storage client
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured Dynamo DB client
    /// * `table_name` - Dynamo DB table name for catalog images
    /// * `stylists_table_name` - Table holding the per-stylist `image_count`
    /// * `max_images_per_stylist` - Hard limit enforced by the insert transaction
    #[must_use]
    pub const fn new(
        dynamodb_client: Arc<DynamoDbClient>,
        table_name: String,
        stylists_table_name: String,
        max_images_per_stylist: u32,
    ) -> Self {
        Self {
            dynamodb_client,
            table_name,
            stylists_table_name,
            max_images_per_stylist,
        }
    }

    /// Lists every image owned by a stylist, oldest first
    ///
    /// # Errors
    ///
    /// Returns `CatalogImageStorageError` if the Dynamo DB query fails
    pub async fn list_for_stylist(
        &self,
        stylist_id: &str,
    ) -> CatalogImageStorageResult<Vec<CatalogImage>> {
        let mut images = Vec::new();
        let mut exclusive_start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let response = self
                .dynamodb_client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("#stylist_id = :stylist_id")
                .expression_attribute_names(
                    "#stylist_id",
                    CatalogImageAttribute::StylistId.to_string(),
                )
                .expression_attribute_values(
                    ":stylist_id",
                    AttributeValue::S(stylist_id.to_string()),
                )
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await?;

            let next_key = response.last_evaluated_key;
            let items = response.items.unwrap_or_default();
            images.extend(from_items::<_, CatalogImage>(items)?);

            match next_key {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
                _ => break,
            }
        }

        sort_by_creation(&mut images);

        Ok(images)
    }

    /// Inserts a catalog image row and reserves one slot of the stylist quota
    ///
    /// # Errors
    ///
    /// Returns `CatalogImageStorageError::StylistNotRegistered` if the stylist has no
    /// listing record, `CatalogImageStorageError::ImageLimitReached` if it is already
    /// at the limit, or another `CatalogImageStorageError` if the transaction fails
    pub async fn insert(
        &self,
        request: CatalogImageCreateRequest,
    ) -> CatalogImageStorageResult<CatalogImage> {
        let now = Utc::now().timestamp_millis();
        let image = CatalogImage {
            id: uuid::Uuid::new_v4().to_string(),
            stylist_id: request.stylist_id,
            image_url: request.image_url,
            file_name: request.file_name,
            file_size: request.file_size,
            mime_type: request.mime_type,
            created_at: now,
            updated_at: now,
        };

        let item = serde_dynamo::to_item(&image)?;

        let reserve_slot = Update::builder()
            .table_name(&self.stylists_table_name)
            .key(
                StylistAttribute::UserId.to_string(),
                AttributeValue::S(image.stylist_id.clone()),
            )
            .update_expression("SET #count = if_not_exists(#count, :zero) + :one")
            .condition_expression(
                "attribute_exists(#pk) AND (attribute_not_exists(#count) OR #count < :max)",
            )
            .expression_attribute_names("#pk", StylistAttribute::UserId.to_string())
            .expression_attribute_names("#count", StylistAttribute::ImageCount.to_string())
            .expression_attribute_values(":zero", AttributeValue::N("0".to_string()))
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .expression_attribute_values(
                ":max",
                AttributeValue::N(self.max_images_per_stylist.to_string()),
            )
            .return_values_on_condition_check_failure(ReturnValuesOnConditionCheckFailure::AllOld)
            .build()?;

        let put_row = Put::builder()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#id)")
            .expression_attribute_names("#id", CatalogImageAttribute::Id.to_string())
            .build()?;

        let result = self
            .dynamodb_client
            .transact_write_items()
            .transact_items(TransactWriteItem::builder().update(reserve_slot).build())
            .transact_items(TransactWriteItem::builder().put(put_row).build())
            .send()
            .await;

        let err = match result {
            Ok(_) => {
                debug!(
                    "Inserted catalog image {} for stylist {}",
                    image.id, image.stylist_id
                );
                return Ok(image);
            }
            Err(err) => err,
        };

        let rejection = match failed_condition(&err) {
            Some((0, reason)) => Some(QuotaRejection::from_reason(reason)),
            _ => None,
        };

        match rejection {
            Some(QuotaRejection::MissingRecord) => {
                Err(CatalogImageStorageError::StylistNotRegistered(image.stylist_id))
            }
            Some(QuotaRejection::LimitReached) => {
                Err(CatalogImageStorageError::ImageLimitReached {
                    stylist_id: image.stylist_id,
                    max_images: self.max_images_per_stylist,
                })
            }
            None => Err(err.into()),
        }
    }

    /// Deletes a catalog image row owned by `stylist_id` and releases its quota slot
    ///
    /// The key includes the owner, so an ID belonging to another stylist is
    /// reported as not found and nothing is removed.
    ///
    /// # Errors
    ///
    /// Returns `CatalogImageStorageError::NotFound` if the stylist owns no image
    /// with this ID, or another `CatalogImageStorageError` if Dynamo DB fails
    pub async fn delete(&self, stylist_id: &str, image_id: &str) -> CatalogImageStorageResult<()> {
        let delete_row = Delete::builder()
            .table_name(&self.table_name)
            .key(
                CatalogImageAttribute::StylistId.to_string(),
                AttributeValue::S(stylist_id.to_string()),
            )
            .key(
                CatalogImageAttribute::Id.to_string(),
                AttributeValue::S(image_id.to_string()),
            )
            .condition_expression("attribute_exists(#id)")
            .expression_attribute_names("#id", CatalogImageAttribute::Id.to_string())
            .build()?;

        let release_slot = Update::builder()
            .table_name(&self.stylists_table_name)
            .key(
                StylistAttribute::UserId.to_string(),
                AttributeValue::S(stylist_id.to_string()),
            )
            .update_expression("SET #count = #count - :one")
            .condition_expression("#count > :zero")
            .expression_attribute_names("#count", StylistAttribute::ImageCount.to_string())
            .expression_attribute_values(":zero", AttributeValue::N("0".to_string()))
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .build()?;

        let result = self
            .dynamodb_client
            .transact_write_items()
            .transact_items(TransactWriteItem::builder().delete(delete_row).build())
            .transact_items(TransactWriteItem::builder().update(release_slot).build())
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => match failed_condition(&err).map(|(index, _)| index) {
                Some(0) => Err(CatalogImageStorageError::NotFound {
                    stylist_id: stylist_id.to_string(),
                    image_id: image_id.to_string(),
                }),
                // Row exists but the counter was never maintained for it
                Some(1) => {
                    warn!(
                        "Image counter for stylist {} is out of sync, deleting {} without it",
                        stylist_id, image_id
                    );
                    self.delete_row(stylist_id, image_id).await
                }
                _ => Err(err.into()),
            },
        }
    }

    async fn delete_row(&self, stylist_id: &str, image_id: &str) -> CatalogImageStorageResult<()> {
        self.dynamodb_client
            .delete_item()
            .table_name(&self.table_name)
            .key(
                CatalogImageAttribute::StylistId.to_string(),
                AttributeValue::S(stylist_id.to_string()),
            )
            .key(
                CatalogImageAttribute::Id.to_string(),
                AttributeValue::S(image_id.to_string()),
            )
            .condition_expression("attribute_exists(#id)")
            .expression_attribute_names("#id", CatalogImageAttribute::Id.to_string())
            .send()
            .await
            .map_err(|err| {
                if matches!(
                    err,
                    SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception()
                ) {
                    CatalogImageStorageError::NotFound {
                        stylist_id: stylist_id.to_string(),
                        image_id: image_id.to_string(),
                    }
                } else {
                    err.into()
                }
            })?;

        Ok(())
    }
}
