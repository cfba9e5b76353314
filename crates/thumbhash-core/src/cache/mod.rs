//! Key-value cache stores and the typed encode/decode caches built on them.
//!
//! A [`CacheStore`] is the host's string key-value store. Two namespaces sit
//! on top of it, each with one fixed value shape:
//! - **encode**: file identity → JSON map of ratio key → hash string
//! - **decode**: hash string → JSON [`DecodedPlaceholder`]
//!
//! The decode namespace is content-addressed and never invalidated.

mod file;
mod memory;

pub use file::FileCache;
pub use memory::{MemoryCache, NullCache};

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::types::DecodedPlaceholder;

/// A string key-value store supplied by the host.
///
/// Stores are best-effort: a failed write is not an error for callers, and
/// a missing or unreadable entry is a miss.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

/// Shortest decimal form of a ratio, used as the per-file cache key.
pub fn ratio_key(ratio: f64) -> String {
    ratio.to_string()
}

/// Hashes per (file identity, ratio).
#[derive(Clone)]
pub struct EncodeCache {
    store: Arc<dyn CacheStore>,
}

type RatioMap = BTreeMap<String, String>;

impl EncodeCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub fn get(&self, identity: &str, ratio_key: &str) -> Option<String> {
        self.load(identity)?.remove(ratio_key)
    }

    pub fn set(&self, identity: &str, ratio_key: &str, hash: &str) {
        let mut entries = self.load(identity).unwrap_or_default();
        entries.insert(ratio_key.to_string(), hash.to_string());
        match serde_json::to_string(&entries) {
            Ok(json) => self.store.set(identity, json),
            Err(e) => tracing::warn!("Failed to serialize encode cache entry for {identity}: {e}"),
        }
    }

    /// Drop every ratio cached for `identity`.
    pub fn remove(&self, identity: &str) {
        self.store.remove(identity);
    }

    fn load(&self, identity: &str) -> Option<RatioMap> {
        let raw = self.store.get(identity)?;
        match serde_json::from_str(&raw) {
            Ok(entries) => Some(entries),
            Err(e) => {
                tracing::warn!("Ignoring corrupt encode cache entry for {identity}: {e}");
                None
            }
        }
    }
}

/// Decoded placeholders keyed by hash string.
#[derive(Clone)]
pub struct DecodeCache {
    store: Arc<dyn CacheStore>,
}

impl DecodeCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub fn get(&self, hash: &str) -> Option<DecodedPlaceholder> {
        let raw = self.store.get(hash)?;
        match serde_json::from_str(&raw) {
            Ok(placeholder) => Some(placeholder),
            Err(e) => {
                tracing::warn!("Ignoring corrupt decode cache entry for {hash}: {e}");
                None
            }
        }
    }

    pub fn set(&self, hash: &str, placeholder: &DecodedPlaceholder) {
        match serde_json::to_string(placeholder) {
            Ok(json) => self.store.set(hash, json),
            Err(e) => tracing::warn!("Failed to serialize decode cache entry for {hash}: {e}"),
        }
    }
}
