//! HTTP boundary for the Bungie.net platform API.
//!
//! This crate owns the two network concerns the cache core depends on:
//! fetching the manifest descriptor (the vendor's published index of current
//! reference database locations) and downloading the compressed reference
//! database archives it points at. Everything else the platform API offers
//! (profiles, characters, items) lives behind other crates.
//!
//! The [`ManifestSource`] trait is the seam the synchronizer consumes;
//! [`BungieApi`] is its production implementation.

mod client;
pub mod error;
#[cfg(feature = "mock")]
mod mock;
mod models;
mod source;

pub use crate::client::{BungieApi, DEFAULT_API_BASE, DEFAULT_CDN_BASE};
#[cfg(feature = "mock")]
pub use crate::mock::MockSource;
pub use crate::models::{ApiEnvelope, GearAssetDatabase, ManifestDescriptor, PLATFORM_SUCCESS};
pub use crate::source::ManifestSource;
