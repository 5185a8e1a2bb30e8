//! Cache Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use ishtar_api::error::ErrorKind as ApiErrorKind;
use std::io::Error as IoError;
use std::path::PathBuf;

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// Note what is deliberately absent: an unreadable index file is not an error
/// at all; [`CacheIndex::load`](crate::CacheIndex::load) treats it as empty
/// and lets the next synchronization pass rebuild everything.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The manifest descriptor could not be fetched. The whole pass can be
    /// retried later; no local state was touched.
    #[display("manifest fetch failed")]
    Fetch(ApiErrorKind),
    /// An archive download failed. Aborts the pass; kinds already staged are
    /// discarded and picked up again next run.
    #[display("archive download failed")]
    Download(ApiErrorKind),
    /// A downloaded archive could not be unpacked. Fatal for the pass; the
    /// existing good file for that kind is left untouched.
    #[display("corrupt archive: {}", _0.display())]
    CorruptArchive(#[error(not(source))] PathBuf),
    /// Local file lifecycle operation failed (rename, delete, directory
    /// creation, index write).
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// A reference database handle could not be opened.
    #[display("cannot open reference database: {}", _0.display())]
    Database(#[error(not(source))] PathBuf),
    /// The database file backing a lookup is missing, locked, or lacks the
    /// requested table: the synchronizer has not completed, or the vendor
    /// schema changed. Distinct from [`NotFound`](ErrorKind::NotFound).
    #[display("reference lookup failed: {_0}")]
    Lookup(#[error(not(source))] String),
    /// The query ran fine but no row matched the signed key. Mappers treat
    /// this as "absent" for optional hashes.
    #[display("no definition with id {id} in {table}")]
    NotFound { table: String, id: i64 },
    /// A matching row exists but its JSON column is unparsable.
    #[display("invalid reference record in {_0}")]
    InvalidRecord(#[error(not(source))] String),
    /// A logical table name would compose into an unsafe SQL identifier.
    #[display("invalid table name: {_0}")]
    InvalidTable(#[error(not(source))] String),
    /// The manifest descriptor lacks the path entry for a database kind.
    #[display("manifest has no entry for {_0}")]
    MissingEntry(#[error(not(source))] String),
}

impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(inner) | Self::Download(inner) => inner.is_retryable(),
            Self::Io(_) => true,
            _ => false,
        }
    }

    /// Wrap an API error as a manifest-fetch failure, preserving the API
    /// crate's `Exn` frame as a child in the error tree.
    #[track_caller]
    pub fn fetch(err: ishtar_api::error::Error) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Fetch(inner))
    }

    /// Wrap an API error as an archive-download failure.
    #[track_caller]
    pub fn download(err: ishtar_api::error::Error) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Download(inner))
    }
}
