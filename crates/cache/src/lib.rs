//! Versioned local cache of the vendor reference databases, and hash
//! resolution against them.
//!
//! The vendor publishes four sqlite "reference databases" (asset content,
//! gear assets, world content, clan banners) behind a manifest descriptor
//! that names the current version of each. This crate keeps a local copy of
//! all four in sync with that descriptor and resolves the opaque 32-bit
//! content hashes found in live API payloads into the JSON records the
//! databases store.
//!
//! # Architecture
//! - [`CacheIndex`]: the persisted kind-to-installed-filename mapping
//!   (`dbinfo.json`). Unreadable means empty, which means full resync.
//! - [`ContentStore`]: owns the cache directory and, after a
//!   [`synchronize`](ContentStore::synchronize) pass, one open read-only
//!   handle per database kind. Replacement swaps the whole generation of
//!   handles under a write lock; lookups hold a read lock, so they see
//!   fully-old or fully-new state and never a half-replaced file.
//! - [`to_signed_key`] / [`definition_table`]: the pure key and naming
//!   rules, separated from all I/O.
//!
//! Records are re-read and re-parsed on every resolution; local indexed
//! point lookups are cheap enough that no cross-call cache is kept.

mod archive;
pub mod error;
mod index;
mod keys;
mod kind;
mod store;
mod sync;
#[cfg(test)]
pub(crate) mod testutil;

pub use crate::index::{CacheIndex, INDEX_FILE};
pub use crate::keys::{definition_table, to_signed_key};
pub use crate::kind::DatabaseKind;
pub use crate::store::ContentStore;
pub use crate::sync::SyncReport;
