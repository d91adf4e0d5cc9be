//! Registers stylist profiles in the stylist listing table
mod error;

use std::sync::Arc;

use marketplace_storage::{profile::UserRole, stylist::StylistUpsert};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

pub use error::{RegistrarError, RegistrarResult};

use crate::{
    services::{ProfileDirectory, StylistDirectory},
    session::SessionHandle,
};

/// One profile whose stylist record could not be written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationFailure {
    /// Profile owner
    pub user_id: String,
    /// Backend error message
    pub message: String,
}

/// Outcome of a bulk registration run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationSummary {
    /// Upserts that succeeded, including records that already existed
    pub success_count: usize,
    /// Upserts that failed
    pub error_count: usize,
    /// Per-profile failure details, in listing order
    pub failures: Vec<RegistrationFailure>,
}

impl RegistrationSummary {
    /// Number of profiles an upsert was attempted for
    #[must_use]
    pub const fn attempted(&self) -> usize {
        self.success_count + self.error_count
    }
}

/// Creates stylist listing records from stylist profiles
pub struct StylistRegistrar {
    session: SessionHandle,
    profiles: Arc<dyn ProfileDirectory>,
    stylists: Arc<dyn StylistDirectory>,
}

impl StylistRegistrar {
    /// Creates a new registrar
    #[must_use]
    pub fn new(
        session: SessionHandle,
        profiles: Arc<dyn ProfileDirectory>,
        stylists: Arc<dyn StylistDirectory>,
    ) -> Self {
        Self {
            session,
            profiles,
            stylists,
        }
    }

    /// Ensures the signed-in user has a stylist record
    ///
    /// # Errors
    ///
    /// Returns `RegistrarError::NotAuthenticated`, `MissingProfile` or `NotAStylist`
    /// without calling the backend when the session does not qualify, and
    /// `RegistrarError::Upsert` when the write fails
    #[instrument(skip(self))]
    pub async fn add_current_user_as_stylist(&self) -> RegistrarResult<StylistUpsert> {
        let Some(session) = self.session.current() else {
            warn!("Stylist registration requested without a session");
            return Err(RegistrarError::NotAuthenticated);
        };

        let user_id = session.user_id();
        let Some(profile) = session.profile() else {
            warn!("Profile for {} is not loaded", user_id);
            return Err(RegistrarError::MissingProfile(user_id.to_string()));
        };

        if !profile.is_stylist() {
            warn!("User {} has role {}, not stylist", user_id, profile.role);
            return Err(RegistrarError::NotAStylist(user_id.to_string()));
        }

        let outcome = self
            .stylists
            .ensure_stylist(user_id, profile)
            .await
            .map_err(|source| {
                error!("Failed to register stylist {}: {}", user_id, source);
                RegistrarError::Upsert {
                    user_id: user_id.to_string(),
                    source,
                }
            })?;

        info!("Stylist record for {}: {:?}", user_id, outcome);
        Ok(outcome)
    }

    /// Ensures every stylist profile has a stylist record
    ///
    /// Profiles are processed one at a time; a failed upsert is recorded in the
    /// summary and the run continues.
    ///
    /// # Errors
    ///
    /// Returns `RegistrarError::Listing` if the stylist profiles cannot be listed,
    /// in which case no upsert is attempted
    #[instrument(skip(self))]
    pub async fn add_all_stylists(&self) -> RegistrarResult<RegistrationSummary> {
        let profiles = self
            .profiles
            .list_by_role(UserRole::Stylist)
            .await
            .map_err(|e| {
                error!("Failed to list stylist profiles: {}", e);
                RegistrarError::Listing(e)
            })?;

        info!("Registering {} stylist profiles", profiles.len());

        let mut summary = RegistrationSummary::default();
        for profile in &profiles {
            match self.stylists.ensure_stylist(&profile.user_id, profile).await {
                Ok(_) => summary.success_count += 1,
                Err(e) => {
                    error!("Failed to register stylist {}: {}", profile.user_id, e);
                    summary.error_count += 1;
                    summary.failures.push(RegistrationFailure {
                        user_id: profile.user_id.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Stylist registration finished: {} succeeded, {} failed",
            summary.success_count, summary.error_count
        );

        Ok(summary)
    }
}
