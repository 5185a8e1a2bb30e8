//! Client Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A client error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse categories; the interesting detail lives in the wrapped error
/// trees raised by the api and cache crates.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Talking to the platform API failed.
    #[display("API request failed")]
    Api,
    /// A synchronization pass did not complete.
    #[display("reference database synchronization failed")]
    Sync,
    /// A hash could not be resolved against the local reference databases.
    #[display("hash resolution failed")]
    Resolve,
    /// A resolved record did not match the expected definition shape.
    #[display("definition record has unexpected shape")]
    Decode,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Api | Self::Sync)
    }

    /// Wrap an API error, preserving its error tree.
    #[track_caller]
    pub(crate) fn api(err: ishtar_api::error::Error) -> Error {
        err.raise(ErrorKind::Api)
    }

    /// Wrap a synchronization error, preserving its error tree.
    #[track_caller]
    pub(crate) fn sync(err: ishtar_cache::error::Error) -> Error {
        err.raise(ErrorKind::Sync)
    }

    /// Wrap a resolution error, preserving its error tree.
    #[track_caller]
    pub(crate) fn resolve(err: ishtar_cache::error::Error) -> Error {
        err.raise(ErrorKind::Resolve)
    }
}
