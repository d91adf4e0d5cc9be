use mime::Mime;
use url::Url;

use super::{CatalogError, CatalogResult};

/// Upload size and count limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogLimits {
    /// Largest accepted upload in bytes
    pub max_file_size_bytes: u64,
    /// Most images a stylist may hold
    pub max_images: usize,
}

impl CatalogLimits {
    /// 5 MiB
    pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
    /// Per-stylist image cap
    pub const DEFAULT_MAX_IMAGES: usize = 10;

    /// Image cap in the form the catalog table's counter uses
    #[must_use]
    pub fn storage_max_images(&self) -> u32 {
        u32::try_from(self.max_images).unwrap_or(u32::MAX)
    }
}

impl Default for CatalogLimits {
    fn default() -> Self {
        Self {
            max_file_size_bytes: Self::DEFAULT_MAX_FILE_SIZE_BYTES,
            max_images: Self::DEFAULT_MAX_IMAGES,
        }
    }
}

/// A file selected for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original file name
    pub file_name: String,
    /// Declared media type, e.g. `image/png`
    pub content_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Size of the upload in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        u64::try_from(self.bytes.len()).unwrap_or(u64::MAX)
    }

    /// Media type to store if the declared type begins with `image/`
    ///
    /// Parameters are dropped when the type parses, otherwise the declared
    /// value is kept as is.
    pub(super) fn image_media_type(&self) -> Option<String> {
        let declared = self.content_type.trim();
        if !declared.starts_with("image/") {
            return None;
        }

        Some(declared.parse::<Mime>().map_or_else(
            |_| declared.to_string(),
            |parsed| parsed.essence_str().to_string(),
        ))
    }
}

/// Keeps `[A-Za-z0-9._-]`, replacing everything else with `_`
fn sanitize_segment(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // "." and ".." are not usable as path segments
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Storage key `{owner}/{millis}-{file_name}` with both segments sanitized
pub(super) fn storage_key(owner: &str, millis: i64, file_name: &str) -> String {
    format!(
        "{}/{millis}-{}",
        sanitize_segment(owner),
        sanitize_segment(file_name)
    )
}

/// Storage key named by the last two path segments of a public URL
pub(super) fn key_from_public_url(image_url: &str) -> CatalogResult<String> {
    let invalid = || CatalogError::InvalidImageUrl(image_url.to_string());

    let url = Url::parse(image_url).map_err(|_| invalid())?;
    let segments: Vec<&str> = url
        .path_segments()
        .ok_or_else(invalid)?
        .filter(|segment| !segment.is_empty())
        .collect();

    match segments.as_slice() {
        [.., owner, file] => Ok(format!("{owner}/{file}")),
        _ => Err(invalid()),
    }
}
