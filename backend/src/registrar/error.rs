use thiserror::Error;

use crate::services::ServiceError;

/// Result type for registrar operations
pub type RegistrarResult<T> = Result<T, RegistrarError>;

/// Errors surfaced by the stylist registrar
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// Nobody is signed in
    #[error("No user is signed in")]
    NotAuthenticated,

    /// The session has no loaded profile
    #[error("Profile for user {0} is not loaded")]
    MissingProfile(String),

    /// The signed-in user's role is not `stylist`
    #[error("User {0} is not a stylist")]
    NotAStylist(String),

    /// Listing stylist profiles failed; nothing was registered
    #[error("Failed to list stylist profiles: {0}")]
    Listing(#[source] ServiceError),

    /// The stylist record upsert failed
    #[error("Failed to register stylist {user_id}: {source}")]
    Upsert {
        /// User whose record could not be written
        user_id: String,
        /// Backend failure
        #[source]
        source: ServiceError,
    },
}
