//! Identifier generation and validation for itx issues
//!
//! Identifiers are 24 lowercase hex characters: a 4-byte big-endian unix
//! timestamp followed by 8 hash-derived bytes. Structural validity can be
//! checked without touching the store.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Length of an issue identifier in characters
pub const ID_LEN: usize = 24;

/// Generate a unique issue identifier
///
/// Leading timestamp bytes keep ids roughly insertion-ordered; the tail is
/// a UUID + nanosecond hash for uniqueness.
pub fn generate_id() -> String {
    let now = chrono::Utc::now();
    let secs = now.timestamp() as u32;

    let uuid = Uuid::new_v4();
    let nanos = now.timestamp_nanos_opt().unwrap_or(0);

    let mut hasher = Sha256::new();
    hasher.update(uuid.as_bytes());
    hasher.update(nanos.to_le_bytes());
    let hash = hasher.finalize();

    let mut id = String::with_capacity(ID_LEN);
    for byte in secs.to_be_bytes().iter().chain(&hash[..8]) {
        id.push_str(&format!("{:02x}", byte));
    }
    id
}

/// Check whether a value is a structurally valid issue identifier
///
/// Exactly 24 ASCII hex digits. This is a syntax check only; it says
/// nothing about whether a record with this id exists.
pub fn is_valid(id: &str) -> bool {
    id.len() == ID_LEN && id.bytes().all(|b| b.is_ascii_hexdigit())
}
