//! API Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An API error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// Kinds are `Clone` so that downstream crates can embed them in their own
/// error trees while preserving the original `Exn` frame.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced a usable response (DNS, TLS, connection
    /// reset, timeout). Retrying the whole pass later may succeed.
    #[display("network error: {_0}")]
    Http(#[error(not(source))] String),
    /// The server answered with a non-success status code. An auth-related
    /// code here is the signal the external token subsystem uses to decide
    /// whether credentials need refreshing.
    #[display("unexpected status code: {_0}")]
    Status(#[error(not(source))] u16),
    /// The vendor envelope reported a platform-level failure (ErrorCode != 1)
    /// despite the transport succeeding.
    #[display("platform error {code}: {status}")]
    Platform { code: i32, status: String },
    /// Response body could not be deserialized into the expected shape.
    #[display("malformed response body")]
    InvalidBody,
    /// A base URL or joined endpoint URL was not parsable.
    #[display("invalid URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
    /// Writing a downloaded archive to local disk failed.
    #[display("I/O error writing {_0}")]
    Io(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status(500..=599))
    }
}
