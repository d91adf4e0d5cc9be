use std::sync::Arc;

use marketplace_backend::{
    catalog::{CatalogImageManager, ImageUpload},
    registrar::StylistRegistrar,
    session::{Session, SessionHandle},
};
use marketplace_storage::profile::{UserProfile, UserRole};

use super::fakes::{FakeBlobStore, FakeImageCatalog, FakeProfileDirectory, FakeStylistDirectory};

/// Initializes test logging once per binary
pub fn setup_test_env() {
    dotenvy::from_path(".env.example").ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

pub fn profile(user_id: &str, role: UserRole) -> UserProfile {
    UserProfile {
        user_id: user_id.to_string(),
        role,
        full_name: format!("Test {user_id}"),
        email: Some(format!("{user_id}@example.com")),
        avatar_url: None,
        bio: Some("Colour and cuts".to_string()),
        location: Some("Lisbon".to_string()),
        created_at: 1_700_000_000_000,
        updated_at: None,
    }
}

pub fn stylist_profile(user_id: &str) -> UserProfile {
    profile(user_id, UserRole::Stylist)
}

pub fn image_upload(file_name: &str, content_type: &str, size: usize) -> ImageUpload {
    ImageUpload {
        file_name: file_name.to_string(),
        content_type: content_type.to_string(),
        bytes: vec![0xAB; size],
    }
}

pub fn png_upload(file_name: &str) -> ImageUpload {
    image_upload(file_name, "image/png", 1024)
}

/// Catalog manager wired to in-memory backends
pub struct CatalogHarness {
    pub session: SessionHandle,
    pub catalog: Arc<FakeImageCatalog>,
    pub blobs: Arc<FakeBlobStore>,
    pub manager: CatalogImageManager,
}

impl CatalogHarness {
    /// Harness with `user_id` signed in
    pub fn signed_in(user_id: &str) -> Self {
        let harness = Self::signed_out();
        harness
            .session
            .login(Session::new(user_id, Some(stylist_profile(user_id))));
        harness
    }

    pub fn signed_out() -> Self {
        setup_test_env();

        let session = SessionHandle::new();
        let catalog = Arc::new(FakeImageCatalog::new(10));
        let blobs = Arc::new(FakeBlobStore::default());
        let manager = CatalogImageManager::new(session.clone(), catalog.clone(), blobs.clone());

        Self {
            session,
            catalog,
            blobs,
            manager,
        }
    }

    /// Calls made to either backend
    pub fn backend_calls(&self) -> usize {
        self.catalog.calls() + self.blobs.calls()
    }
}

/// Registrar wired to in-memory backends
pub struct RegistrarHarness {
    pub session: SessionHandle,
    pub profiles: Arc<FakeProfileDirectory>,
    pub stylists: Arc<FakeStylistDirectory>,
    pub registrar: StylistRegistrar,
}

impl RegistrarHarness {
    pub fn new(profiles: Vec<UserProfile>) -> Self {
        setup_test_env();

        let session = SessionHandle::new();
        let profiles = Arc::new(FakeProfileDirectory::new(profiles));
        let stylists = Arc::new(FakeStylistDirectory::default());
        let registrar = StylistRegistrar::new(session.clone(), profiles.clone(), stylists.clone());

        Self {
            session,
            profiles,
            stylists,
            registrar,
        }
    }
}
