//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use url::Url;

use crate::catalog::CatalogLimits;

const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development {
        /// Optional override for the `LocalStack` endpoint
        endpoint_override: Option<String>,
    },
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => {
                let endpoint_override = env::var("AWS_ENDPOINT_URL")
                    .ok()
                    .filter(|val| !val.trim().is_empty());

                Self::Development { endpoint_override }
            }
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Reads a required variable, falling back to `default` in development
    fn var_or_dev_default(&self, name: &str, default: &str) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var(name).unwrap_or_else(|_| panic!("{name} environment variable is not set"))
            }
            Self::Development { .. } => env::var(name).unwrap_or_else(|_| default.to_string()),
        }
    }

    /// Returns the `DynamoDB` table holding user profiles
    ///
    /// # Panics
    ///
    /// Panics if `PROFILES_TABLE_NAME` is not set outside development
    #[must_use]
    pub fn profiles_table_name(&self) -> String {
        self.var_or_dev_default("PROFILES_TABLE_NAME", "marketplace-profiles")
    }

    /// Returns the GSI on the profiles table keyed by `role`
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn profiles_role_index_name(&self) -> String {
        env::var("PROFILES_ROLE_INDEX_NAME").unwrap_or_else(|_| "role-index".to_string())
    }

    /// Returns the `DynamoDB` table holding stylist listing records
    ///
    /// # Panics
    ///
    /// Panics if `STYLISTS_TABLE_NAME` is not set outside development
    #[must_use]
    pub fn stylists_table_name(&self) -> String {
        self.var_or_dev_default("STYLISTS_TABLE_NAME", "marketplace-stylists")
    }

    /// Returns the `DynamoDB` table holding catalog image metadata
    ///
    /// # Panics
    ///
    /// Panics if `CATALOG_IMAGES_TABLE_NAME` is not set outside development
    #[must_use]
    pub fn catalog_images_table_name(&self) -> String {
        self.var_or_dev_default("CATALOG_IMAGES_TABLE_NAME", "marketplace-catalog-images")
    }

    /// Returns the S3 bucket name for the environment
    ///
    /// # Panics
    ///
    /// Panics if the `S3_BUCKET_NAME` environment variable is not set outside development
    #[must_use]
    pub fn s3_bucket(&self) -> String {
        self.var_or_dev_default("S3_BUCKET_NAME", "marketplace-catalog")
    }

    /// Base URL under which catalog blobs are publicly served
    ///
    /// In development this is the path-style `LocalStack` bucket URL.
    ///
    /// # Panics
    ///
    /// Panics if `MEDIA_PUBLIC_BASE_URL` is missing outside development or is not a valid URL
    #[must_use]
    pub fn media_public_base_url(&self) -> Url {
        let raw = match self {
            Self::Production | Self::Staging => env::var("MEDIA_PUBLIC_BASE_URL")
                .expect("MEDIA_PUBLIC_BASE_URL environment variable is not set"),
            Self::Development { .. } => env::var("MEDIA_PUBLIC_BASE_URL").unwrap_or_else(|_| {
                format!(
                    "{}/{}",
                    self.override_aws_endpoint_url().unwrap_or(LOCALSTACK_ENDPOINT),
                    self.s3_bucket()
                )
            }),
        };

        Url::parse(&raw).unwrap_or_else(|e| panic!("Invalid MEDIA_PUBLIC_BASE_URL {raw}: {e}"))
    }

    /// Upload limits applied by the catalog image manager
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn catalog_limits(&self) -> CatalogLimits {
        CatalogLimits::default()
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development { endpoint_override } => {
                Some(endpoint_override.as_deref().unwrap_or(LOCALSTACK_ENDPOINT))
            }
        }
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // Override "force path style" to true for compatibility with LocalStack
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if matches!(self, Self::Development { .. }) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}
