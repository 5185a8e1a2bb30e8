//! The four downloadable reference database kinds.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// One of the four vendor reference databases tracked by the cache.
///
/// The serde (and `Display`) names are the vendor's wire keys; they double
/// as the keys of the persisted cache index, so an index written by the
/// original client is readable as-is.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DatabaseKind {
    #[display("mobileAssetContent")]
    #[serde(rename = "mobileAssetContent")]
    AssetContent,
    #[display("mobileGearAssetDataBase")]
    #[serde(rename = "mobileGearAssetDataBase")]
    GearAssets,
    #[display("mobileWorldContent")]
    #[serde(rename = "mobileWorldContent")]
    WorldContent,
    #[display("mobileClanBannerDatabase")]
    #[serde(rename = "mobileClanBannerDatabase")]
    ClanBanner,
}

impl DatabaseKind {
    /// Every kind, in the order a synchronization pass processes them.
    pub const ALL: [DatabaseKind; 4] =
        [Self::AssetContent, Self::GearAssets, Self::WorldContent, Self::ClanBanner];
}
