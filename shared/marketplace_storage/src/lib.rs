//! Marketplace storage services
//!
//! This crate provides the `DynamoDB` tables behind the stylist marketplace:
//! user profiles, the denormalized stylist listing and catalog image metadata.

pub mod catalog_image;
pub mod profile;
pub mod stylist;
