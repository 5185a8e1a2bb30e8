//! Pure functions for hash keys and table names.
//!
//! The live API emits content hashes as unsigned 32-bit integers, but the
//! shipped reference databases index their rows by the *signed* 32-bit
//! interpretation of the same bits. Every lookup converts; nothing else in
//! the crate is allowed to touch the raw bits.

use crate::error::{ErrorKind, Result};

/// Reinterpret an unsigned 32-bit API hash as the signed key the reference
/// databases index by. Equivalent to `hash - 2^32` when the high bit is set,
/// the identity otherwise.
pub fn to_signed_key(hash: u32) -> i64 {
    i64::from(hash as i32)
}

/// Compose the physical table name for a logical definition name, e.g.
/// `"Stat"` → `"DestinyStatDefinition"`.
///
/// Table names cannot be bound as SQL parameters, so the logical name is
/// restricted to ASCII alphanumerics before it is interpolated.
pub fn definition_table(logical: &str) -> Result<String> {
    if logical.is_empty() || !logical.bytes().all(|b| b.is_ascii_alphanumeric()) {
        exn::bail!(ErrorKind::InvalidTable(logical.to_string()));
    }
    Ok(format!("Destiny{logical}Definition"))
}
