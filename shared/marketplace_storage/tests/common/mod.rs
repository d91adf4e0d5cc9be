//! LocalStack table setup shared by the storage integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, GlobalSecondaryIndex, KeySchemaElement, KeyType, Projection,
    ProjectionType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use marketplace_storage::catalog_image::{CatalogImageAttribute, CatalogImageStorage};
use marketplace_storage::profile::{ProfileAttribute, ProfileStorage, UserProfile, UserRole};
use marketplace_storage::stylist::{StylistAttribute, StylistStorage};
use tokio::time::sleep;
use uuid::Uuid;

/// Test configuration for LocalStack
const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";
const TEST_REGION: &str = "us-east-1";
pub const TEST_ROLE_INDEX_NAME: &str = "role-index";
pub const TEST_MAX_IMAGES: u32 = 10;

/// Test context owning one uniquely named copy of every marketplace table
pub struct TestContext {
    pub dynamodb_client: Arc<DynamoDbClient>,
    pub profiles_table_name: String,
    pub stylists_table_name: String,
    pub catalog_images_table_name: String,
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let client = self.dynamodb_client.clone();
        let tables = [
            self.profiles_table_name.clone(),
            self.stylists_table_name.clone(),
            self.catalog_images_table_name.clone(),
        ];

        // Use tokio runtime to delete tables
        let handle = tokio::runtime::Handle::try_current();
        if let Ok(handle) = handle {
            handle.spawn(async move {
                for table in tables {
                    let _ = client.delete_table().table_name(&table).send().await;
                }
            });
        }
    }
}

fn key(name: impl Into<String>, key_type: KeyType) -> KeySchemaElement {
    KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(key_type)
        .build()
        .expect("Failed to build key schema")
}

fn string_attribute(name: impl Into<String>) -> AttributeDefinition {
    AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(ScalarAttributeType::S)
        .build()
        .expect("Failed to build attribute definition")
}

impl TestContext {
    /// Creates the profile, stylist and catalog image tables with unique names
    pub async fn new() -> Self {
        // Configure AWS SDK for LocalStack
        let credentials = Credentials::from_keys(
            "test", // AWS_ACCESS_KEY_ID
            "test", // AWS_SECRET_ACCESS_KEY
            None,   // no session token
        );
        let config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(LOCALSTACK_ENDPOINT)
            .region(Region::new(TEST_REGION))
            .credentials_provider(credentials)
            .load()
            .await;

        let dynamodb_client = Arc::new(DynamoDbClient::new(&config));

        let profiles_table_name = format!("test-profiles-{}", Uuid::new_v4());
        let stylists_table_name = format!("test-stylists-{}", Uuid::new_v4());
        let catalog_images_table_name = format!("test-catalog-images-{}", Uuid::new_v4());

        dynamodb_client
            .create_table()
            .table_name(&profiles_table_name)
            .billing_mode(BillingMode::PayPerRequest)
            .key_schema(key(ProfileAttribute::UserId.to_string(), KeyType::Hash))
            .attribute_definitions(string_attribute(ProfileAttribute::UserId.to_string()))
            .attribute_definitions(string_attribute(ProfileAttribute::Role.to_string()))
            .global_secondary_indexes(
                GlobalSecondaryIndex::builder()
                    .index_name(TEST_ROLE_INDEX_NAME)
                    .key_schema(key(ProfileAttribute::Role.to_string(), KeyType::Hash))
                    .projection(
                        Projection::builder()
                            .projection_type(ProjectionType::All)
                            .build(),
                    )
                    .build()
                    .expect("Failed to build GSI"),
            )
            .send()
            .await
            .expect("Failed to create profiles table");

        dynamodb_client
            .create_table()
            .table_name(&stylists_table_name)
            .billing_mode(BillingMode::PayPerRequest)
            .key_schema(key(StylistAttribute::UserId.to_string(), KeyType::Hash))
            .attribute_definitions(string_attribute(StylistAttribute::UserId.to_string()))
            .send()
            .await
            .expect("Failed to create stylists table");

        dynamodb_client
            .create_table()
            .table_name(&catalog_images_table_name)
            .billing_mode(BillingMode::PayPerRequest)
            .key_schema(key(
                CatalogImageAttribute::StylistId.to_string(),
                KeyType::Hash,
            ))
            .key_schema(key(CatalogImageAttribute::Id.to_string(), KeyType::Range))
            .attribute_definitions(string_attribute(
                CatalogImageAttribute::StylistId.to_string(),
            ))
            .attribute_definitions(string_attribute(CatalogImageAttribute::Id.to_string()))
            .send()
            .await
            .expect("Failed to create catalog images table");

        // Wait for tables to be ready
        sleep(Duration::from_millis(100)).await;

        Self {
            dynamodb_client,
            profiles_table_name,
            stylists_table_name,
            catalog_images_table_name,
        }
    }

    pub fn profile_storage(&self) -> ProfileStorage {
        ProfileStorage::new(
            self.dynamodb_client.clone(),
            self.profiles_table_name.clone(),
            TEST_ROLE_INDEX_NAME.to_string(),
        )
    }

    pub fn stylist_storage(&self) -> StylistStorage {
        StylistStorage::new(
            self.dynamodb_client.clone(),
            self.stylists_table_name.clone(),
        )
    }

    pub fn catalog_image_storage(&self) -> CatalogImageStorage {
        CatalogImageStorage::new(
            self.dynamodb_client.clone(),
            self.catalog_images_table_name.clone(),
            self.stylists_table_name.clone(),
            TEST_MAX_IMAGES,
        )
    }

    /// Writes a profile row directly, the way the account system would
    pub async fn seed_profile(&self, profile: &UserProfile) {
        let item = serde_dynamo::to_item(profile).expect("Failed to serialize profile");
        self.dynamodb_client
            .put_item()
            .table_name(&self.profiles_table_name)
            .set_item(Some(item))
            .send()
            .await
            .expect("Failed to seed profile");
    }
}

/// Creates a profile with a unique user ID
pub fn create_test_profile(role: UserRole) -> UserProfile {
    let user_id = format!("user-{}", Uuid::new_v4());
    UserProfile {
        full_name: format!("Test {user_id}"),
        user_id,
        role,
        email: None,
        avatar_url: None,
        bio: Some("Color and cuts".to_string()),
        location: None,
        created_at: chrono::Utc::now().timestamp_millis(),
        updated_at: None,
    }
}
