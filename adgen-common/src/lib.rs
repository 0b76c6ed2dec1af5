//! # adgen Common Library
//!
//! Shared code for the adgen services including:
//! - Audience and marketing concept types
//! - Configuration loading and root folder resolution
//! - Database bootstrap for the collaborator tables
//! - Common error types

pub mod audience;
pub mod concept;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;

pub use audience::{AgeRange, Audience, Demographics, Location, LocationType};
pub use concept::{CampaignParameters, GeneratedConcept, RemixParameters};
pub use error::{Error, Result};
