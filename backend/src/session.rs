//! Signed-in user session shared by the components

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use marketplace_storage::profile::UserProfile;

/// The signed-in user and their profile, if it was loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: String,
    profile: Option<UserProfile>,
    opened_at: DateTime<Utc>,
}

impl Session {
    /// Opens a session for `user_id`
    #[must_use]
    pub fn new(user_id: impl Into<String>, profile: Option<UserProfile>) -> Self {
        Self {
            user_id: user_id.into(),
            profile,
            opened_at: Utc::now(),
        }
    }

    /// Authenticated user ID
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Profile loaded at login
    #[must_use]
    pub const fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// When the session was opened
    #[must_use]
    pub const fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }
}

/// Shared slot holding the current session
///
/// Cloning the handle shares the slot, so a logout is seen by every
/// component constructed with it.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Option<Arc<Session>>>>,
}

impl SessionHandle {
    /// Handle with nobody signed in
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle with `session` already signed in
    #[must_use]
    pub fn signed_in(session: Session) -> Self {
        let handle = Self::new();
        handle.login(session);
        handle
    }

    /// Replaces the current session
    pub fn login(&self, session: Session) {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::new(session));
    }

    /// Clears the current session
    pub fn logout(&self) {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }

    /// Session at the time of the call
    #[must_use]
    pub fn current(&self) -> Option<Arc<Session>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
