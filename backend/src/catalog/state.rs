use std::sync::{Mutex, PoisonError};

use marketplace_storage::catalog_image::CatalogImage;
use serde::Serialize;

/// Observable catalog state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogState {
    /// Images of the signed-in stylist, oldest first
    pub images: Vec<CatalogImage>,
    /// A backend operation is in flight
    pub loading: bool,
    /// Message of the most recent failure, cleared when an operation starts
    pub error: Option<String>,
}

/// Holds `loading` for as long as it lives
pub(super) struct LoadingGuard<'a> {
    state: &'a Mutex<CatalogState>,
}

impl<'a> LoadingGuard<'a> {
    pub(super) fn start(state: &'a Mutex<CatalogState>) -> Self {
        {
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            state.loading = true;
            state.error = None;
        }
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .loading = false;
    }
}
