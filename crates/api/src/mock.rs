//! Canned manifest source for testing.

use crate::error::{ErrorKind, Result};
use crate::models::ManifestDescriptor;
use crate::source::ManifestSource;
use async_trait::async_trait;
use exn::{OptionExt, ResultExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A [`ManifestSource`] that serves a canned descriptor and copies fixture
/// files instead of touching the network.
///
/// The descriptor can be swapped mid-test (to simulate the vendor publishing
/// a new version) and every download is counted, so synchronization tests
/// can assert "zero downloads when nothing is stale".
pub struct MockSource {
    descriptor: Mutex<ManifestDescriptor>,
    fixtures: Mutex<HashMap<String, PathBuf>>,
    downloads: AtomicUsize,
}

impl MockSource {
    /// Create a mock serving the given descriptor and no fixtures.
    pub fn new(descriptor: ManifestDescriptor) -> Self {
        Self {
            descriptor: Mutex::new(descriptor),
            fixtures: Mutex::new(HashMap::new()),
            downloads: AtomicUsize::new(0),
        }
    }

    /// Register a local fixture file to be served for a remote path.
    pub fn with_fixture(self, remote_path: impl Into<String>, local: impl Into<PathBuf>) -> Self {
        self.add_fixture(remote_path, local);
        self
    }

    /// Register (or replace) a fixture after construction.
    pub fn add_fixture(&self, remote_path: impl Into<String>, local: impl Into<PathBuf>) {
        self.fixtures.lock().unwrap().insert(remote_path.into(), local.into());
    }

    /// Replace the served descriptor, simulating a new remote version.
    pub fn set_descriptor(&self, descriptor: ManifestDescriptor) {
        *self.descriptor.lock().unwrap() = descriptor;
    }

    /// Snapshot of the currently served descriptor.
    pub fn descriptor(&self) -> ManifestDescriptor {
        self.descriptor.lock().unwrap().clone()
    }

    /// Number of downloads served so far.
    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ManifestSource for MockSource {
    async fn manifest(&self) -> Result<ManifestDescriptor> {
        Ok(self.descriptor.lock().unwrap().clone())
    }

    async fn download(&self, remote_path: &str, dest: &Path) -> Result<()> {
        let fixture = self
            .fixtures
            .lock()
            .unwrap()
            .get(remote_path)
            .cloned()
            .ok_or_raise(|| ErrorKind::Http(format!("no fixture for {remote_path}")))?;
        self.downloads.fetch_add(1, Ordering::SeqCst);
        tokio::fs::copy(&fixture, dest)
            .await
            .or_raise(|| ErrorKind::Io(dest.display().to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn descriptor() -> ManifestDescriptor {
        ManifestDescriptor {
            version: "1.0".to_string(),
            mobile_asset_content_path: "/sqlite/asset/a.content".to_string(),
            mobile_gear_asset_data_bases: vec![],
            mobile_world_content_paths: BTreeMap::new(),
            mobile_clan_banner_database_path: "/clanbanner/c.content".to_string(),
        }
    }

    #[tokio::test]
    async fn serves_descriptor_and_counts_downloads() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = dir.path().join("fixture.bin");
        tokio::fs::write(&fixture, b"archive bytes").await.unwrap();

        let source = MockSource::new(descriptor()).with_fixture("/sqlite/asset/a.content", &fixture);
        assert_eq!(source.manifest().await.unwrap().version, "1.0");
        assert_eq!(source.downloads(), 0);

        let dest = dir.path().join("out.zip");
        source.download("/sqlite/asset/a.content", &dest).await.unwrap();
        assert_eq!(source.downloads(), 1);
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"archive bytes");
    }

    #[tokio::test]
    async fn unknown_remote_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockSource::new(descriptor());
        let result = source.download("/nope", &dir.path().join("out")).await;
        assert!(matches!(*result.unwrap_err(), ErrorKind::Http(_)));
    }
}
