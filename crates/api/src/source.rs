//! The seam between the synchronizer and the network.

use crate::BungieApi;
use crate::error::Result;
use crate::models::ManifestDescriptor;
use async_trait::async_trait;
use std::path::Path;

/// Where manifest descriptors and reference database archives come from.
///
/// The production implementation is [`BungieApi`]; tests substitute the
/// canned `MockSource` (behind the `mock` feature) to run whole
/// synchronization passes without a network.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Fetch the current manifest descriptor.
    async fn manifest(&self) -> Result<ManifestDescriptor>;

    /// Download the archive at `remote_path` into the local file `dest`,
    /// overwriting it if present.
    async fn download(&self, remote_path: &str, dest: &Path) -> Result<()>;
}

#[async_trait]
impl ManifestSource for BungieApi {
    async fn manifest(&self) -> Result<ManifestDescriptor> {
        BungieApi::manifest(self).await
    }

    async fn download(&self, remote_path: &str, dest: &Path) -> Result<()> {
        BungieApi::download(self, remote_path, dest).await
    }
}
