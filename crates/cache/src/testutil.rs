//! Shared fixtures for synchronization and resolution tests.
//!
//! Builds real sqlite databases with the vendor's table layout, zips them the
//! way the CDN serves them, and wires everything into a
//! [`MockSource`] so whole passes run without a network.

use ishtar_api::{GearAssetDatabase, ManifestDescriptor, MockSource};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::{SimpleFileOptions, ZipWriter};

/// An unsigned hash with the high bit set; its signed key is `-1298820321`.
pub(crate) const STAT_HASH: u32 = 2_996_146_975;
const STAT_KEY: i64 = -1_298_820_321;

const ASSET_PREFIX: &str = "/common/destiny2_content/sqlite/asset/";
const WORLD_PREFIX: &str = "/common/destiny2_content/sqlite/en/";
const BANNER_PREFIX: &str = "/common/destiny2_content/clanbanner/";

/// Create a reference database file containing a `DestinyStatDefinition`
/// table seeded with the given `(id, json)` rows.
pub(crate) async fn seed_database(path: &Path, rows: &[(i64, &str)]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let options = SqliteConnectOptions::new().filename(path).create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await.unwrap();
    sqlx::query("CREATE TABLE DestinyStatDefinition (id INTEGER PRIMARY KEY, json TEXT NOT NULL)")
        .execute(&pool)
        .await
        .unwrap();
    for (id, json) in rows {
        sqlx::query("INSERT INTO DestinyStatDefinition (id, json) VALUES (?, ?)")
            .bind(id)
            .bind(json)
            .execute(&pool)
            .await
            .unwrap();
    }
    pool.close().await;
}

/// Write a single-entry zip archive the way the CDN packages databases.
pub(crate) fn write_zip(path: &Path, entry_name: &str, content: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    writer.start_file(entry_name, SimpleFileOptions::default()).unwrap();
    writer.write_all(content).unwrap();
    writer.finish().unwrap();
}

/// A descriptor whose four paths end in the given filenames, using the
/// vendor's path templates (note the asset and world templates differ).
pub(crate) fn descriptor_with_tokens(
    asset: &str,
    gear: &str,
    world: &str,
    banner: &str,
) -> ManifestDescriptor {
    ManifestDescriptor {
        version: "fixture".to_string(),
        mobile_asset_content_path: format!("{ASSET_PREFIX}{asset}"),
        mobile_gear_asset_data_bases: vec![GearAssetDatabase {
            version: 0,
            path: format!("{ASSET_PREFIX}{gear}"),
        }],
        mobile_world_content_paths: BTreeMap::from([("en".to_string(), format!("{WORLD_PREFIX}{world}"))]),
        mobile_clan_banner_database_path: format!("{BANNER_PREFIX}{banner}"),
    }
}

/// A complete test universe: seeded database, zipped archives for all four
/// kinds at one version token, and a [`MockSource`] serving them.
pub(crate) struct Fixture {
    dir: TempDir,
    pub(crate) source: MockSource,
}

impl Fixture {
    pub(crate) async fn new(token: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("seed.content");
        seed_database(&db, &[(STAT_KEY, r#"{"statName":"Defense"}"#)]).await;
        let bytes = std::fs::read(&db).unwrap();

        let asset = format!("asset_sql_content_{token}.content");
        let gear = format!("gear_sql_content_{token}.content");
        let world = format!("world_sql_content_{token}.content");
        let banner = format!("clanbanner_sql_content_{token}.content");
        let descriptor = descriptor_with_tokens(&asset, &gear, &world, &banner);

        let source = MockSource::new(descriptor);
        for (prefix, name) in [
            (ASSET_PREFIX, &asset),
            (ASSET_PREFIX, &gear),
            (WORLD_PREFIX, &world),
            (BANNER_PREFIX, &banner),
        ] {
            let zip = dir.path().join("zips").join(format!("{name}.zip"));
            write_zip(&zip, name, &bytes);
            source.add_fixture(format!("{prefix}{name}"), zip);
        }
        Self { dir, source }
    }

    /// Where the store under test keeps its cache.
    pub(crate) fn cache_dir(&self) -> PathBuf {
        self.dir.path().join("db")
    }

    pub(crate) fn zip_path(&self, name: &str) -> PathBuf {
        self.dir.path().join("zips").join(format!("{name}.zip"))
    }

    pub(crate) fn db_path(&self) -> PathBuf {
        self.dir.path().join("seed.content")
    }

    pub(crate) fn current_descriptor(&self) -> ManifestDescriptor {
        self.source.descriptor()
    }

    /// Publish a new world content version: fresh database content, fresh
    /// archive, updated descriptor path.
    pub(crate) async fn publish_world_update(&self, token: &str, stat_json: &str) {
        let db = self.dir.path().join(format!("seed_{token}.content"));
        seed_database(&db, &[(STAT_KEY, stat_json)]).await;
        let name = format!("world_sql_content_{token}.content");
        let zip = self.zip_path(&name);
        write_zip(&zip, &name, &std::fs::read(&db).unwrap());

        let remote = format!("{WORLD_PREFIX}{name}");
        self.source.add_fixture(&remote, zip);
        let mut descriptor = self.source.descriptor();
        descriptor.mobile_world_content_paths.insert("en".to_string(), remote);
        self.source.set_descriptor(descriptor);
    }

    /// Publish a world content update whose archive is garbage.
    pub(crate) async fn publish_corrupt_world_update(&self, token: &str) {
        let name = format!("world_sql_content_{token}.content");
        let zip = self.zip_path(&name);
        std::fs::create_dir_all(zip.parent().unwrap()).unwrap();
        std::fs::write(&zip, b"definitely not a zip archive").unwrap();

        let remote = format!("{WORLD_PREFIX}{name}");
        self.source.add_fixture(&remote, zip);
        let mut descriptor = self.source.descriptor();
        descriptor.mobile_world_content_paths.insert("en".to_string(), remote);
        self.source.set_descriptor(descriptor);
    }
}
