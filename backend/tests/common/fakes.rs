//! In-memory backends with call counters and failure switches

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;
use marketplace_backend::{
    media_storage::{BucketError, PutOptions},
    services::{
        BlobStore, ImageCatalog, ProfileDirectory, ServiceError, ServiceResult, StylistDirectory,
    },
};
use marketplace_storage::{
    catalog_image::{CatalogImage, CatalogImageCreateRequest, CatalogImageStorageError},
    profile::{UserProfile, UserRole},
    stylist::{StylistRecord, StylistStorageError, StylistUpsert},
};

pub const PUBLIC_BASE_URL: &str = "https://cdn.test/catalog";

/// Holds a fake call open until the test releases it
///
/// Unarmed gates let every call straight through.
#[derive(Default)]
pub struct Gate {
    armed: AtomicBool,
    entered: Notify,
    release: Notify,
}

impl Gate {
    /// Parks the next call that passes the gate
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    /// Lets the parked call finish
    pub fn open(&self) {
        self.release.notify_one();
    }

    /// Resolves once a call is parked at the gate
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    async fn pass(&self) {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }
}

#[derive(Default)]
pub struct FakeProfileDirectory {
    profiles: Vec<UserProfile>,
    pub fail_listing: AtomicBool,
    pub list_calls: AtomicUsize,
}

impl FakeProfileDirectory {
    pub fn new(profiles: Vec<UserProfile>) -> Self {
        Self {
            profiles,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ProfileDirectory for FakeProfileDirectory {
    async fn list_by_role(&self, role: UserRole) -> ServiceResult<Vec<UserProfile>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("profiles query timed out".to_string()));
        }

        Ok(self
            .profiles
            .iter()
            .filter(|p| p.role == role)
            .cloned()
            .collect())
    }

    async fn get_profile(&self, user_id: &str) -> ServiceResult<Option<UserProfile>> {
        Ok(self.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }
}

#[derive(Default)]
pub struct FakeStylistDirectory {
    records: Mutex<HashMap<String, StylistRecord>>,
    failing_users: Mutex<HashSet<String>>,
    upserts: Mutex<Vec<String>>,
}

impl FakeStylistDirectory {
    /// Makes every upsert for `user_id` fail
    pub fn fail_for(&self, user_id: &str) {
        self.failing_users
            .lock()
            .unwrap()
            .insert(user_id.to_string());
    }

    /// User IDs in the order upserts were attempted
    pub fn upserts(&self) -> Vec<String> {
        self.upserts.lock().unwrap().clone()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn record(&self, user_id: &str) -> Option<StylistRecord> {
        self.records.lock().unwrap().get(user_id).cloned()
    }
}

#[async_trait]
impl StylistDirectory for FakeStylistDirectory {
    async fn ensure_stylist(
        &self,
        user_id: &str,
        profile: &UserProfile,
    ) -> ServiceResult<StylistUpsert> {
        self.upserts.lock().unwrap().push(user_id.to_string());

        if self.failing_users.lock().unwrap().contains(user_id) {
            return Err(ServiceError::Unavailable(format!(
                "write throttled for {user_id}"
            )));
        }
        if !profile.is_stylist() {
            return Err(StylistStorageError::NotAStylist(user_id.to_string()).into());
        }

        let mut records = self.records.lock().unwrap();
        if records.contains_key(user_id) {
            return Ok(StylistUpsert::AlreadyExists);
        }
        records.insert(
            user_id.to_string(),
            StylistRecord::from_profile(user_id, profile),
        );
        Ok(StylistUpsert::Created)
    }
}

pub struct FakeImageCatalog {
    rows: Mutex<Vec<CatalogImage>>,
    clock: AtomicI64,
    max_images: u32,
    calls: AtomicUsize,
    pub fail_list: AtomicBool,
    pub fail_insert: AtomicBool,
    pub fail_delete: AtomicBool,
    /// Insert answers as if the stylist record did not exist
    pub unregistered: AtomicBool,
    pub list_gate: Gate,
    pub delete_gate: Gate,
}

impl FakeImageCatalog {
    pub fn new(max_images: u32) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            clock: AtomicI64::new(1_700_000_000_000),
            max_images,
            calls: AtomicUsize::new(0),
            fail_list: AtomicBool::new(false),
            fail_insert: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            unregistered: AtomicBool::new(false),
            list_gate: Gate::default(),
            delete_gate: Gate::default(),
        }
    }

    /// Inserts a row directly, bypassing the call counter
    pub fn seed(&self, stylist_id: &str, id: &str, created_at: i64) -> CatalogImage {
        let image = CatalogImage {
            id: id.to_string(),
            stylist_id: stylist_id.to_string(),
            image_url: format!("{PUBLIC_BASE_URL}/{stylist_id}/{created_at}-{id}.png"),
            file_name: Some(format!("{id}.png")),
            file_size: Some(1024),
            mime_type: Some("image/png".to_string()),
            created_at,
            updated_at: created_at,
        };
        self.rows.lock().unwrap().push(image.clone());
        image
    }

    /// Deletes a row directly, bypassing the call counter
    pub fn remove(&self, stylist_id: &str, id: &str) {
        self.rows
            .lock()
            .unwrap()
            .retain(|row| !(row.stylist_id == stylist_id && row.id == id));
    }

    pub fn rows(&self) -> Vec<CatalogImage> {
        self.rows.lock().unwrap().clone()
    }

    pub fn rows_for(&self, stylist_id: &str) -> Vec<CatalogImage> {
        self.rows()
            .into_iter()
            .filter(|row| row.stylist_id == stylist_id)
            .collect()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageCatalog for FakeImageCatalog {
    async fn list_for_stylist(&self, stylist_id: &str) -> ServiceResult<Vec<CatalogImage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.list_gate.pass().await;
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("catalog query failed".to_string()));
        }

        // Newest first, ordering is left to the caller
        let mut rows = self.rows_for(stylist_id);
        rows.reverse();
        Ok(rows)
    }

    async fn insert(&self, request: CatalogImageCreateRequest) -> ServiceResult<CatalogImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("catalog insert failed".to_string()));
        }
        if self.unregistered.load(Ordering::SeqCst) {
            return Err(CatalogImageStorageError::StylistNotRegistered(request.stylist_id).into());
        }

        let mut rows = self.rows.lock().unwrap();
        let owned = rows
            .iter()
            .filter(|row| row.stylist_id == request.stylist_id)
            .count();
        if owned >= self.max_images as usize {
            return Err(CatalogImageStorageError::ImageLimitReached {
                stylist_id: request.stylist_id,
                max_images: self.max_images,
            }
            .into());
        }

        let now = self.clock.fetch_add(1, Ordering::SeqCst);
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
        rows.push(image.clone());
        Ok(image)
    }

    async fn delete(&self, stylist_id: &str, image_id: &str) -> ServiceResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.delete_gate.pass().await;
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("catalog delete failed".to_string()));
        }

        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| !(row.stylist_id == stylist_id && row.id == image_id));
        if rows.len() == before {
            return Err(CatalogImageStorageError::NotFound {
                stylist_id: stylist_id.to_string(),
                image_id: image_id.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeBlobStore {
    objects: Mutex<HashMap<String, (Vec<u8>, PutOptions)>>,
    put_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    pub fail_put: AtomicBool,
    pub fail_public_url: AtomicBool,
    pub fail_delete: AtomicBool,
    pub put_gate: Gate,
}

impl FakeBlobStore {
    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.put_calls() + self.delete_calls()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn object(&self, key: &str) -> Option<(Vec<u8>, PutOptions)> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    /// Stores an object directly, bypassing the call counter
    pub fn seed(&self, key: &str) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (vec![1], PutOptions::new("image/png")));
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, options: &PutOptions) -> ServiceResult<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        self.put_gate.pass().await;
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(BucketError::UpstreamError("503 Slow Down".to_string()).into());
        }

        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(key) && !options.overwrite {
            return Err(BucketError::ObjectExists(key.to_string()).into());
        }
        objects.insert(key.to_string(), (bytes, options.clone()));
        Ok(())
    }

    fn public_url(&self, key: &str) -> ServiceResult<String> {
        if self.fail_public_url.load(Ordering::SeqCst) {
            return Err(BucketError::ConfigError("no public base URL".to_string()).into());
        }
        Ok(format!("{PUBLIC_BASE_URL}/{key}"))
    }

    async fn delete(&self, keys: &[String]) -> ServiceResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(BucketError::PartialDelete(keys.to_vec()).into());
        }

        let mut objects = self.objects.lock().unwrap();
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }
}
