//! Key → file path mapping for the filesystem store
//!
//! Keys are arbitrary strings, so the file name is the SHA-256 of the key.
//! Files are sharded by the first two hex characters of that digest.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_EXTENSION: &str = "snapshot";

/// Hex SHA-256 of the key
pub fn key_digest(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

/// `<root>/ab/abcd….snapshot` for a key whose digest starts with `ab`
pub fn shard_path(root: &Path, key: &str) -> PathBuf {
    let digest = key_digest(key);
    let shard = &digest[..2];

    root.join(shard)
        .join(format!("{}.{}", digest, SNAPSHOT_EXTENSION))
}
