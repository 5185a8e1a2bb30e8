//! The owned client handle.
//!
//! Wires the three lower crates together: configuration decides where the
//! cache lives and which endpoints to talk to, the API crate fetches the
//! manifest and archives, and the cache crate keeps the local reference
//! databases current and resolves hashes against them.
//!
//! A single [`Client`] is meant to be created at startup and passed by
//! reference to everything that needs lookups.

pub mod defs;
pub mod error;

use crate::defs::{InventoryItemDefinition, LoreDefinition, StatDefinition};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use ishtar_api::BungieApi;
use ishtar_cache::error::ErrorKind as CacheErrorKind;
use ishtar_cache::{ContentStore, DatabaseKind, SyncReport};
use ishtar_config::Config;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::ops::Deref;
use tracing::{info, instrument};

/// An authenticated client with a synchronized local reference cache.
#[derive(Debug)]
pub struct Client {
    api: BungieApi,
    store: ContentStore,
}

impl Client {
    /// Build a client from configuration and an (optional) already-acquired
    /// bearer token, then run one synchronization pass so that resolution is
    /// ready before the first lookup.
    #[instrument(skip(config, token))]
    pub async fn connect(config: &Config, token: Option<String>) -> Result<Self> {
        let api = BungieApi::new(&config.api_base, &config.cdn_base, &config.api_key, token)
            .map_err(ErrorKind::api)?;
        let store = ContentStore::new(&config.cache_dir, &config.locale);
        let client = Self { api, store };
        let report = client.synchronize().await?;
        info!(refreshed = report.refreshed.len(), "client connected");
        Ok(client)
    }

    /// Assemble a client from already-built parts. This is the dependency
    /// injection seam: tests (and embedders with their own wiring) provide
    /// an api and a store, and no synchronization is triggered.
    pub fn from_parts(api: BungieApi, store: ContentStore) -> Self {
        Self { api, store }
    }

    /// Run a synchronization pass against the live API.
    pub async fn synchronize(&self) -> Result<SyncReport> {
        self.store.synchronize(&self.api).await.map_err(ErrorKind::sync)
    }

    /// Probe whether the current token is accepted, without parsing a body.
    ///
    /// This is the signal the external token subsystem consumes to decide
    /// whether credentials need refreshing before real calls are made.
    pub async fn token_valid(&self) -> Result<bool> {
        let status = self.api.manifest_status().await.map_err(ErrorKind::api)?;
        Ok(status.as_u16() == 200)
    }

    /// The underlying content store, for callers that want to share it.
    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Resolve a hash in the world content database.
    pub async fn resolve(&self, hash: u32, table: &str) -> Result<Value> {
        self.store.resolve(hash, table).await.map_err(ErrorKind::resolve)
    }

    /// Resolve a hash in a specific reference database.
    pub async fn resolve_in(&self, kind: DatabaseKind, hash: u32, table: &str) -> Result<Value> {
        self.store.resolve_in(kind, hash, table).await.map_err(ErrorKind::resolve)
    }

    /// Resolve an *optional* foreign hash: a missing row means the field is
    /// absent, not that anything failed. I/O and schema problems still
    /// propagate.
    pub async fn resolve_optional(&self, hash: u32, table: &str) -> Result<Option<Value>> {
        match self.store.resolve(hash, table).await {
            Ok(record) => Ok(Some(record)),
            Err(e) if matches!(e.deref(), CacheErrorKind::NotFound { .. }) => Ok(None),
            Err(e) => Err(ErrorKind::resolve(e)),
        }
    }

    /// Resolve a hash and deserialize the record into a typed definition.
    pub async fn resolve_as<T: DeserializeOwned>(&self, hash: u32, table: &str) -> Result<T> {
        let record = self.resolve(hash, table).await?;
        serde_json::from_value(record).or_raise(|| ErrorKind::Decode)
    }

    /// Typed lookup into `DestinyStatDefinition`.
    pub async fn stat_definition(&self, hash: u32) -> Result<StatDefinition> {
        self.resolve_as(hash, "Stat").await
    }

    /// Typed lookup into `DestinyInventoryItemDefinition`.
    pub async fn inventory_item_definition(&self, hash: u32) -> Result<InventoryItemDefinition> {
        self.resolve_as(hash, "InventoryItem").await
    }

    /// Typed lookup into `DestinyLoreDefinition`. Lore hashes are the
    /// textbook optional foreign hash, so a missing row is `None`.
    pub async fn lore_definition(&self, hash: u32) -> Result<Option<LoreDefinition>> {
        match self.resolve_optional(hash, "Lore").await? {
            Some(record) => {
                let lore = serde_json::from_value(record).or_raise(|| ErrorKind::Decode)?;
                Ok(Some(lore))
            },
            None => Ok(None),
        }
    }
}
