//! Identifier codec.
//!
//! Storage keys are the first [`KEY_LEN`] hex characters of the MD5 digest
//! of the input string. They depend only on content, so re-ingesting an
//! unchanged graph upserts the same records instead of duplicating them.

use md5::{Digest, Md5};

/// Length of every storage key, in hex characters.
pub const KEY_LEN: usize = 16;

/// Derives the fixed-length storage key for a string (usually a qname).
pub fn storage_key(s: &str) -> String {
    let digest = Md5::digest(s.as_bytes());
    let mut key = hex::encode(digest);
    key.truncate(KEY_LEN);
    key
}

/// Derives the storage key of an edge.
///
/// Call-site metadata is deliberately not part of the key: the same logical
/// edge seen at two call sites collapses into one record.
pub fn edge_key(source: &str, target: &str, rel_type: &str) -> String {
    storage_key(&format!("{}:{}:{}", source, target, rel_type))
}
