//! Reconciling the local reference databases with the remote manifest.

use crate::archive;
use crate::error::{ErrorKind, Result};
use crate::index::CacheIndex;
use crate::kind::DatabaseKind;
use crate::store::{ContentStore, Generation};
use exn::OptionExt;
use ishtar_api::{ManifestDescriptor, ManifestSource};
use tracing::{debug, info, instrument, warn};

/// Subdirectory for in-flight downloads and unpacked-but-uncommitted files.
const STAGING_DIR: &str = "tmp";

/// What a synchronization pass actually did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Kinds whose database file was downloaded and replaced, in processing
    /// order. Empty means the cache was already current.
    pub refreshed: Vec<DatabaseKind>,
}

impl SyncReport {
    /// True when the pass performed no downloads.
    pub fn is_noop(&self) -> bool {
        self.refreshed.is_empty()
    }
}

/// A staged replacement: the new file sits unpacked in the staging area,
/// waiting for the commit step to move it into place.
struct Replacement {
    kind: DatabaseKind,
    filename: String,
}

impl ContentStore {
    /// Run one synchronization pass against `source`.
    ///
    /// Fetches the manifest descriptor, diffs each kind's version token
    /// against the cache index, downloads and unpacks whatever is missing or
    /// stale into the staging area, then commits all replacements under the
    /// write lock: rename files into place, delete the files they replace,
    /// persist the index in one write, reopen all four handles as the new
    /// generation.
    ///
    /// Until the commit step, nothing outside the staging area is mutated:
    /// cancelling the pass (dropping the future) leaves at worst staging
    /// garbage, which the next pass sweeps. The commit itself is short and
    /// must not be interrupted; resolver reads are blocked out by the lock
    /// for its duration, so they observe either the old generation or the
    /// new one, never a mix.
    ///
    /// On the first run (no cache directory) every kind is downloaded
    /// unconditionally.
    ///
    /// Passes share the staging directory, so concurrent calls are
    /// serialized: a second call waits, then diffs against the first one's
    /// result (typically a no-op). Resolution is never blocked by a waiting
    /// pass, only by the commit step.
    #[instrument(skip(self, source))]
    pub async fn synchronize(&self, source: &dyn ManifestSource) -> Result<SyncReport> {
        let _pass = self.sync_lock.lock().await;
        let descriptor = source.manifest().await.map_err(ErrorKind::fetch)?;

        tokio::fs::create_dir_all(self.dir()).await.map_err(ErrorKind::Io)?;
        let staging = self.dir().join(STAGING_DIR);
        // Leftovers from a cancelled or crashed pass are garbage by definition.
        if tokio::fs::try_exists(&staging).await.unwrap_or(false) {
            tokio::fs::remove_dir_all(&staging).await.map_err(ErrorKind::Io)?;
        }
        tokio::fs::create_dir_all(&staging).await.map_err(ErrorKind::Io)?;

        let mut index = CacheIndex::load(self.dir()).await;
        let mut pending: Vec<Replacement> = Vec::new();
        for kind in DatabaseKind::ALL {
            let remote = remote_path(&descriptor, kind, self.locale())?;
            if let Some(token) = version_token(remote)
                && index.get(kind) == Some(token)
            {
                debug!(%kind, token, "reference database is current");
                continue;
            }
            // Missing entry, differing token, or a token we couldn't parse:
            // all three force a re-download rather than risk serving stale data.
            info!(%kind, remote, "refreshing reference database");
            let archive_path = staging.join(format!("{kind}.zip"));
            source.download(remote, &archive_path).await.map_err(ErrorKind::download)?;
            let filename = archive::unpack_first_entry(&archive_path, &staging).await?;
            tokio::fs::remove_file(&archive_path).await.map_err(ErrorKind::Io)?;
            pending.push(Replacement { kind, filename });
        }

        let mut guard = self.inner.write().await;
        if pending.is_empty() && guard.is_some() {
            debug!("all reference databases current, index unchanged");
            return Ok(SyncReport::default());
        }

        // Release the old handles before touching the files they point at.
        // If the commit fails partway the store is left not-ready; the next
        // pass re-downloads whatever the index no longer accounts for.
        if let Some(old) = guard.take() {
            old.close().await;
        }

        let mut refreshed = Vec::with_capacity(pending.len());
        for replacement in &pending {
            let staged = staging.join(&replacement.filename);
            let installed = self.dir().join(&replacement.filename);
            tokio::fs::rename(&staged, &installed).await.map_err(ErrorKind::Io)?;
            // Delete the replaced file before the index write: a crash in
            // between leaves a missing file (detected as stale next run),
            // never an index entry naming the wrong file.
            if let Some(old) = index.get(replacement.kind)
                && old != replacement.filename
            {
                let old_path = self.dir().join(old);
                if let Err(err) = tokio::fs::remove_file(&old_path).await {
                    warn!(path = %old_path.display(), %err, "could not delete replaced database file");
                }
            }
            index.set(replacement.kind, replacement.filename.clone());
            refreshed.push(replacement.kind);
        }
        index.save(self.dir()).await?;

        *guard = Some(Generation::open(self.dir(), &index).await?);
        info!(refreshed = refreshed.len(), "synchronization pass complete");
        Ok(SyncReport { refreshed })
    }
}

/// The remote path the descriptor publishes for a database kind.
///
/// The gear asset list ships several resolutions; the third entry is
/// preferred, falling back to the last available one.
fn remote_path<'a>(
    descriptor: &'a ManifestDescriptor,
    kind: DatabaseKind,
    locale: &str,
) -> Result<&'a str> {
    match kind {
        DatabaseKind::AssetContent => Ok(&descriptor.mobile_asset_content_path),
        DatabaseKind::GearAssets => descriptor
            .mobile_gear_asset_data_bases
            .get(2)
            .or_else(|| descriptor.mobile_gear_asset_data_bases.last())
            .map(|gear| gear.path.as_str())
            .ok_or_raise(|| ErrorKind::MissingEntry("mobileGearAssetDataBases".to_string())),
        DatabaseKind::WorldContent => descriptor
            .mobile_world_content_paths
            .get(locale)
            .map(String::as_str)
            .ok_or_raise(|| ErrorKind::MissingEntry(format!("mobileWorldContentPaths.{locale}"))),
        DatabaseKind::ClanBanner => Ok(&descriptor.mobile_clan_banner_database_path),
    }
}

/// Extract the version token from a remote path: its final segment, which is
/// the filename the unpacked database will carry. `None` (an empty or
/// trailing-slash path) is treated as "stale" by the caller, so an
/// unparsable path forces a redownload instead of masking one.
fn version_token(remote_path: &str) -> Option<&str> {
    let token = remote_path.rsplit('/').next().unwrap_or(remote_path).trim();
    (!token.is_empty()).then_some(token)
}
