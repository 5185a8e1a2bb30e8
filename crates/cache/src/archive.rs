//! Zip unpacking for downloaded reference database archives.
//!
//! Each archive is expected to contain exactly one entry: the database file,
//! named with the version token. Zip decoding is synchronous, so the work is
//! pushed onto the blocking pool.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};
use zip::ZipArchive;

/// Unpack the first (and only) entry of `archive` into `dest_dir`, returning
/// the entry's filename.
///
/// Any structural problem with the archive (unreadable container, no
/// entries, an entry name that is empty or tries to escape `dest_dir`)
/// is a [`CorruptArchive`](ErrorKind::CorruptArchive): the archive must not
/// be trusted and the existing database file for its kind stays in place.
#[instrument(skip(archive, dest_dir), fields(archive = %archive.display()))]
pub(crate) async fn unpack_first_entry(archive: &Path, dest_dir: &Path) -> Result<String> {
    let archive = archive.to_path_buf();
    let dest_dir = dest_dir.to_path_buf();
    match tokio::task::spawn_blocking(move || unpack_sync(&archive, &dest_dir)).await {
        Ok(result) => result,
        Err(_) => exn::bail!(ErrorKind::Io(io::Error::other("unpack task panicked"))),
    }
}

fn unpack_sync(archive: &Path, dest_dir: &Path) -> Result<String> {
    let file = File::open(archive).map_err(ErrorKind::Io)?;
    let mut zip = ZipArchive::new(file).or_raise(|| ErrorKind::CorruptArchive(archive.to_path_buf()))?;
    if zip.is_empty() {
        exn::bail!(ErrorKind::CorruptArchive(archive.to_path_buf()));
    }
    let mut entry = zip.by_index(0).or_raise(|| ErrorKind::CorruptArchive(archive.to_path_buf()))?;
    let name = entry.name().to_string();
    if !is_plain_filename(&name) {
        exn::bail!(ErrorKind::CorruptArchive(archive.to_path_buf()));
    }
    let dest = dest_dir.join(&name);
    let mut out = File::create(&dest).map_err(ErrorKind::Io)?;
    // A truncated deflate stream surfaces here, not at open time.
    let bytes = io::copy(&mut entry, &mut out)
        .or_raise(|| ErrorKind::CorruptArchive(archive.to_path_buf()))?;
    debug!(entry = %name, bytes, "unpacked archive entry");
    Ok(name)
}

/// The entry name becomes a filename in the cache directory; reject anything
/// that isn't a single path component.
fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && name != "."
        && name != ".."
        && PathBuf::from(name).components().count() == 1
}
