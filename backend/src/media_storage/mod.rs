//! S3-based catalog media storage operations
mod error;

use std::sync::Arc;

use aws_sdk_s3::{
    error::SdkError,
    primitives::ByteStream,
    types::{Delete, ObjectIdentifier},
    Client as S3Client,
};
use tracing::{debug, error};
use url::Url;

pub use error::{BucketError, BucketResult};

/// Cache directive attached to every catalog blob
pub const DEFAULT_CACHE_CONTROL: &str = "max-age=3600";

/// Options for a single object write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOptions {
    /// `Content-Type` stored with the object
    pub content_type: String,
    /// `Cache-Control` stored with the object
    pub cache_control: String,
    /// Replace an existing object under the same key
    pub overwrite: bool,
}

impl PutOptions {
    /// No-overwrite write with the default cache directive
    #[must_use]
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            cache_control: DEFAULT_CACHE_CONTROL.to_string(),
            overwrite: false,
        }
    }
}

/// Media storage client for S3 operations
pub struct MediaStorage {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    public_base_url: Url,
}

impl MediaStorage {
    /// Creates a new media storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket name for catalog images
    /// * `public_base_url` - Base URL the bucket is publicly served from
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>, bucket_name: String, public_base_url: Url) -> Self {
        Self {
            s3_client,
            bucket_name,
            public_base_url,
        }
    }

    /// Durable public URL of an object key
    ///
    /// # Errors
    ///
    /// Returns `BucketError::ConfigError` if the public base URL cannot carry a path
    pub fn public_url(&self, s3_key: &str) -> BucketResult<String> {
        let mut url = self.public_base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                BucketError::ConfigError(format!(
                    "Public base URL cannot carry a path: {}",
                    self.public_base_url
                ))
            })?
            .pop_if_empty()
            .extend(s3_key.split('/'));

        Ok(url.to_string())
    }

    /// Uploads an object
    ///
    /// Unless `options.overwrite` is set the write is conditional on the key
    /// being free (`If-None-Match: *`).
    ///
    /// # Errors
    ///
    /// Returns `BucketError::ObjectExists` if the key is taken and overwriting is disabled
    /// Returns `BucketError::UpstreamError` for 5xx errors
    /// Returns `BucketError::S3Error` for other S3 service errors
    #[allow(clippy::cognitive_complexity)]
    pub async fn put_object(
        &self,
        s3_key: &str,
        bytes: Vec<u8>,
        options: &PutOptions,
    ) -> BucketResult<()> {
        debug!(
            "Uploading object: {} ({} bytes, {})",
            s3_key,
            bytes.len(),
            options.content_type
        );

        let mut request = self
            .s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(s3_key)
            .content_type(&options.content_type)
            .cache_control(&options.cache_control)
            .body(ByteStream::from(bytes));

        if !options.overwrite {
            request = request.if_none_match("*");
        }

        match request.send().await {
            Ok(_) => {
                debug!("Uploaded object: {}", s3_key);
                Ok(())
            }
            Err(SdkError::ServiceError(service_err))
                if service_err.raw().status().as_u16() == 412 =>
            {
                Err(BucketError::ObjectExists(s3_key.to_string()))
            }
            Err(SdkError::ServiceError(service_err))
                if service_err.raw().status().as_u16() >= 500 =>
            {
                error!("Upstream error uploading {}: {:?}", s3_key, service_err.err());
                Err(BucketError::UpstreamError(format!("{:?}", service_err.err())))
            }
            Err(e) => {
                error!("Failed to upload {}: {}", s3_key, e);
                Err(BucketError::from(e))
            }
        }
    }

    /// Deletes a batch of objects
    ///
    /// Missing keys are not an error; S3 treats them as already deleted.
    ///
    /// # Errors
    ///
    /// Returns `BucketError::PartialDelete` listing the keys S3 refused to delete,
    /// or another `BucketError` if the request itself fails
    pub async fn delete_objects(&self, s3_keys: &[String]) -> BucketResult<()> {
        if s3_keys.is_empty() {
            return Ok(());
        }

        let objects = s3_keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()?;

        let output = self
            .s3_client
            .delete_objects()
            .bucket(&self.bucket_name)
            .delete(delete)
            .send()
            .await?;

        let failed: Vec<String> = output
            .errors()
            .iter()
            .map(|err| {
                format!(
                    "{} ({})",
                    err.key().unwrap_or_default(),
                    err.message().unwrap_or_default()
                )
            })
            .collect();

        if failed.is_empty() {
            debug!("Deleted {} objects", s3_keys.len());
            Ok(())
        } else {
            error!("Failed to delete objects: {:?}", failed);
            Err(BucketError::PartialDelete(failed))
        }
    }
}
