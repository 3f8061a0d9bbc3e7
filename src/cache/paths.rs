// Cache path utilities.
// Lays out named caches and their entries under a storage root.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use sha2::{Digest, Sha256};

/// Get the default storage root (~/.cache/precache on Linux).
pub fn default_root() -> Option<PathBuf> {
    ProjectDirs::from("", "", "precache").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Directory holding one named cache.
/// Readable prefix plus a hash of the exact name, so distinct names never share a directory.
pub fn cache_dir(root: &Path, name: &str) -> PathBuf {
    let hash = hash_key(name);
    root.join("caches")
        .join(format!("{}-{}", sanitize_name(name), &hash[..16]))
}

/// Metadata file recording the cache's original name.
pub fn meta_path(root: &Path, name: &str) -> PathBuf {
    cache_dir(root, name).join("cache.json")
}

/// Directory holding a cache's entries.
pub fn entries_dir(root: &Path, name: &str) -> PathBuf {
    cache_dir(root, name).join("entries")
}

/// Path to the entry stored for a request key.
pub fn entry_path(root: &Path, name: &str, key: &str) -> PathBuf {
    entries_dir(root, name).join(format!("{}.json", hash_key(key)))
}

/// Hex SHA-256 of a key.
fn hash_key(key: &str) -> String {
    format!("{:x}", Sha256::digest(key.as_bytes()))
}

/// Sanitize a name for use in filesystem paths.
/// Replaces problematic characters with underscores.
fn sanitize_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect();

    match sanitized.as_str() {
        "" | "." | ".." => format!("_{}", sanitized),
        _ => sanitized,
    }
}
