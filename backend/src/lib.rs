//! Stylist marketplace backend services
//!
//! Client-side core of the marketplace: the bulk stylist registrar and the
//! per-stylist catalog image manager, both talking to `DynamoDB` and S3
//! through the traits in [`services`].

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

/// Catalog image manager
pub mod catalog;

/// S3 media storage
pub mod media_storage;

/// Bulk stylist registration
pub mod registrar;

/// Backend service traits and their AWS implementations
pub mod services;

/// Signed-in user session
pub mod session;

/// Environment configuration
pub mod types;
