//! Wire models for the manifest endpoint.
//!
//! Only the slice of the vendor schema needed to key the local cache is
//! modeled here; everything else in the (large) manifest response is ignored
//! during deserialization.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Platform-level "everything is fine" code in the response envelope.
pub const PLATFORM_SUCCESS: i32 = 1;

/// The envelope every platform endpoint wraps its payload in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiEnvelope<T> {
    pub response: Option<T>,
    pub error_code: i32,
    pub error_status: String,
    #[serde(default)]
    pub message: String,
}

/// Remote metadata for the four downloadable reference databases.
///
/// Each path embeds a version token in its final segment; the descriptor is
/// an immutable snapshot fetched fresh on every synchronization pass and is
/// never persisted as-is.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestDescriptor {
    pub version: String,
    pub mobile_asset_content_path: String,
    pub mobile_gear_asset_data_bases: Vec<GearAssetDatabase>,
    /// Locale code (e.g. `"en"`) to remote path.
    pub mobile_world_content_paths: BTreeMap<String, String>,
    pub mobile_clan_banner_database_path: String,
}

/// One entry of the gear asset database list. The vendor publishes several
/// resolutions; consumers prefer the third entry (highest resolution).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GearAssetDatabase {
    pub version: i64,
    pub path: String,
}
