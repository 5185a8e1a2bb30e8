//! Open database handles and hash resolution.

use crate::error::{ErrorKind, Result};
use crate::index::CacheIndex;
use crate::keys::{definition_table, to_signed_key};
use crate::kind::DatabaseKind;
use exn::{OptionExt, ResultExt};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};
use tracing::instrument;

// Point lookups against a local file; a couple of connections per kind is
// plenty even with mappers fanning out.
const MAX_CONNECTIONS: u32 = 2;

/// Process-wide owner of the cached reference databases.
///
/// Holds the cache directory and, once a synchronization pass has completed,
/// one open read-only pool per database kind. Replacement is guarded by a
/// write lock over the whole generation: a resolver read sees either the
/// fully-old or fully-new file + index pairing, never a handle pointing at a
/// file that has just been deleted.
///
/// The intended ownership model is a single `ContentStore` passed by
/// reference to every component that needs lookups.
#[derive(Debug)]
pub struct ContentStore {
    dir: PathBuf,
    locale: String,
    pub(crate) inner: RwLock<Option<Generation>>,
    // Serializes synchronization passes; they share the staging directory.
    pub(crate) sync_lock: Mutex<()>,
}

/// One coherent set of open handles: the index snapshot it was opened from
/// and a read-only pool per kind. Replaced wholesale by the synchronizer.
#[derive(Debug)]
pub(crate) struct Generation {
    pub(crate) index: CacheIndex,
    pools: BTreeMap<DatabaseKind, SqlitePool>,
}

impl Generation {
    /// Open read-only pools for all four kinds named by `index`.
    pub(crate) async fn open(dir: &Path, index: &CacheIndex) -> Result<Self> {
        let mut pools = BTreeMap::new();
        for kind in DatabaseKind::ALL {
            let filename = index
                .get(kind)
                .ok_or_raise(|| ErrorKind::Lookup(format!("no index entry for {kind}")))?;
            let path = dir.join(filename);
            // The index and the disk must agree before a handle is exposed.
            if !path.is_file() {
                exn::bail!(ErrorKind::Lookup(format!("{kind} index names a missing file {filename}")));
            }
            let options = SqliteConnectOptions::new().filename(&path).read_only(true);
            let pool = SqlitePoolOptions::new()
                .max_connections(MAX_CONNECTIONS)
                .connect_with(options)
                .await
                .or_raise(|| ErrorKind::Database(path.clone()))?;
            pools.insert(kind, pool);
        }
        Ok(Self { index: index.clone(), pools })
    }

    /// Close every pool, releasing the file handles before the files are
    /// deleted or replaced.
    pub(crate) async fn close(self) {
        for pool in self.pools.into_values() {
            pool.close().await;
        }
    }
}

impl ContentStore {
    /// Create a store rooted at `dir`. No files are touched until the first
    /// synchronization pass; resolving before one completes is a
    /// [`Lookup`](ErrorKind::Lookup) error.
    pub fn new(dir: impl Into<PathBuf>, locale: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            locale: locale.into(),
            inner: RwLock::new(None),
            sync_lock: Mutex::new(()),
        }
    }

    /// The cache directory this store owns.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Locale used to select the world content database.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// True once a generation of handles is open and lookups can succeed.
    pub async fn is_ready(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// Resolve a live API hash against the world content database.
    pub async fn resolve(&self, hash: u32, table: &str) -> Result<serde_json::Value> {
        self.resolve_in(DatabaseKind::WorldContent, hash, table).await
    }

    /// Resolve a live API hash in a specific reference database.
    ///
    /// The hash is converted to the signed key space, the logical table name
    /// is composed into the vendor's physical name, and the single JSON
    /// column of the matching row is parsed and returned. Every call
    /// re-queries storage; resolution is an indexed point lookup.
    #[instrument(skip(self), fields(%kind))]
    pub async fn resolve_in(&self, kind: DatabaseKind, hash: u32, table: &str) -> Result<serde_json::Value> {
        let table = definition_table(table)?;
        let id = to_signed_key(hash);

        let guard = self.inner.read().await;
        let generation = guard
            .as_ref()
            .ok_or_raise(|| ErrorKind::Lookup("store has not been synchronized".to_string()))?;
        // Generation::open guarantees a pool per kind.
        let pool = generation
            .pools
            .get(&kind)
            .ok_or_raise(|| ErrorKind::Lookup(format!("no open handle for {kind}")))?;

        // Identifiers can't be bound; `definition_table` validated it above.
        let sql = format!("SELECT json FROM {table} WHERE id = ?");
        let row: Option<(String,)> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .or_raise(|| ErrorKind::Lookup(table.clone()))?;
        let (text,) = row.ok_or_raise(|| ErrorKind::NotFound { table: table.clone(), id })?;
        serde_json::from_str(&text).or_raise(|| ErrorKind::InvalidRecord(table))
    }
}
