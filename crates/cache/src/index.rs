//! The persisted cache index (`dbinfo.json`).
//!
//! A small kind → installed-filename mapping. The filenames embed the
//! version token extracted from the remote path at download time, so
//! staleness detection is a pure string comparison against the current
//! manifest descriptor.

use crate::error::{ErrorKind, Result};
use crate::kind::DatabaseKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// Name of the index file inside the cache directory. Kept compatible with
/// the original client's on-disk layout.
pub const INDEX_FILE: &str = "dbinfo.json";

/// Mapping from database kind to the currently installed filename.
///
/// Only the synchronizer mutates this; everything opening a database
/// connection reads it. An index that cannot be read is treated as empty
/// ("needs full resync"), never as a fatal condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheIndex {
    entries: BTreeMap<DatabaseKind, String>,
}

impl CacheIndex {
    /// Load the index from `dir`, returning an empty index when the file is
    /// missing or unparsable.
    pub async fn load(dir: &Path) -> Self {
        let path = dir.join(INDEX_FILE);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(_) => return Self::default(),
        };
        match serde_json::from_slice(&bytes) {
            Ok(index) => index,
            Err(err) => {
                warn!(path = %path.display(), %err, "cache index unreadable, forcing full resync");
                Self::default()
            },
        }
    }

    /// Persist the whole index in one write.
    ///
    /// The content is written to a sibling temp path and renamed over the
    /// index file, so a crash mid-write leaves the previous index intact
    /// rather than a truncated one.
    pub async fn save(&self, dir: &Path) -> Result<()> {
        let path = dir.join(INDEX_FILE);
        let staging = dir.join(format!("{INDEX_FILE}.tmp"));
        let bytes = serde_json::to_vec(self).map_err(|e| ErrorKind::Io(std::io::Error::other(e)))?;
        tokio::fs::write(&staging, &bytes).await.map_err(ErrorKind::Io)?;
        tokio::fs::rename(&staging, &path).await.map_err(ErrorKind::Io)?;
        Ok(())
    }

    /// Installed filename for a kind, if any.
    pub fn get(&self, kind: DatabaseKind) -> Option<&str> {
        self.entries.get(&kind).map(String::as_str)
    }

    /// Record the installed filename for a kind (in memory only).
    pub fn set(&mut self, kind: DatabaseKind, filename: impl Into<String>) {
        self.entries.insert(kind, filename.into());
    }

    /// True when no kind has an installed file on record.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of kinds with an installed file on record.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_index_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let index = CacheIndex::load(dir.path()).await;
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn corrupt_index_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join(INDEX_FILE), b"{not json").await.unwrap();
        let index = CacheIndex::load(dir.path()).await;
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = CacheIndex::default();
        index.set(DatabaseKind::WorldContent, "world_sql_content_abcd1234.content");
        index.set(DatabaseKind::ClanBanner, "clanbanner_sql_content_77aa.content");
        index.save(dir.path()).await.unwrap();

        let loaded = CacheIndex::load(dir.path()).await;
        assert_eq!(loaded, index);
        assert_eq!(loaded.get(DatabaseKind::WorldContent), Some("world_sql_content_abcd1234.content"));
        assert_eq!(loaded.get(DatabaseKind::AssetContent), None);
    }

    #[tokio::test]
    async fn save_overwrites_completely() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = CacheIndex::default();
        first.set(DatabaseKind::AssetContent, "asset_v1.content");
        first.set(DatabaseKind::WorldContent, "world_v1.content");
        first.save(dir.path()).await.unwrap();

        let mut second = CacheIndex::default();
        second.set(DatabaseKind::WorldContent, "world_v2.content");
        second.save(dir.path()).await.unwrap();

        let loaded = CacheIndex::load(dir.path()).await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get(DatabaseKind::AssetContent), None);
    }

    #[tokio::test]
    async fn index_file_uses_the_vendor_wire_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = CacheIndex::default();
        index.set(DatabaseKind::GearAssets, "gear.content");
        index.save(dir.path()).await.unwrap();

        let raw = tokio::fs::read_to_string(dir.path().join(INDEX_FILE)).await.unwrap();
        assert_eq!(raw, r#"{"mobileGearAssetDataBase":"gear.content"}"#);
    }
}
