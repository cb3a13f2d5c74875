//! Single-file, TTL-aware key/value cache
//!
//! The whole map is loaded, mutated and rewritten on every call. There is
//! exactly one process using the file, so no locking is attempted and the
//! last writer wins.

use crate::entry::CacheEntry;
use mcup_core::{Error, Result};
use mcup_utils::write_atomic;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

type CacheMap = BTreeMap<String, CacheEntry>;

/// Persistent cache backed by a JSON object of `key -> [expires_at, value]`
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up `key`, evicting it if it has expired
    pub fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        self.get_at(key, now())
    }

    /// Typed lookup; a value that no longer matches `T` counts as a miss
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(value) = self.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(typed) => Ok(Some(typed)),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring cached value with unexpected shape");
                Ok(None)
            }
        }
    }

    /// Store `value` under `key`; `ttl_secs = None` never expires
    pub fn set(&self, key: &str, value: serde_json::Value, ttl_secs: Option<u64>) -> Result<()> {
        self.set_at(key, value, ttl_secs, now())
    }

    /// Remove `key`; the file is only rewritten if the key was present
    pub fn delete(&self, key: &str) -> Result<()> {
        let mut map = self.load();
        if map.remove(key).is_some() {
            self.save(&map)?;
        }
        Ok(())
    }

    /// Drop every entry by removing the backing file
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    /// Number of entries currently on disk, expired ones included
    pub fn len(&self) -> usize {
        self.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn get_at(&self, key: &str, now: i64) -> Result<Option<serde_json::Value>> {
        let mut map = self.load();
        let Some(entry) = map.get(key) else {
            tracing::debug!(key, "cache miss");
            return Ok(None);
        };

        if entry.is_expired(now) {
            tracing::debug!(key, "cache entry expired");
            map.remove(key);
            self.save(&map)?;
            return Ok(None);
        }

        tracing::debug!(key, "cache hit");
        Ok(map.remove(key).map(CacheEntry::into_value))
    }

    pub(crate) fn set_at(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl_secs: Option<u64>,
        now: i64,
    ) -> Result<()> {
        let mut map = self.load();
        map.insert(key.to_string(), CacheEntry::new(value, ttl_secs, now));
        self.save(&map)
    }

    fn load(&self) -> CacheMap {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return CacheMap::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cache file unreadable, starting empty");
                return CacheMap::new();
            }
        };

        serde_json::from_slice(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "cache file corrupt, starting empty");
            CacheMap::new()
        })
    }

    fn save(&self, map: &CacheMap) -> Result<()> {
        let content = serde_json::to_vec(map)
            .map_err(|e| self.io_error(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        write_atomic(&self.path, &content).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: io::Error) -> Error {
        Error::CacheIo {
            path: self.path.clone(),
            source,
        }
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcup_core::ErrorKind;
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (TempDir, CacheStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path().join("cache.json"));
        (temp_dir, store)
    }

    #[test]
    fn set_then_get() {
        let (_dir, store) = store();
        store.set("paper:versions", json!(["1.20.4", "1.21"]), Some(60)).unwrap();

        assert_eq!(store.get("paper:versions").unwrap(), Some(json!(["1.20.4", "1.21"])));
        assert_eq!(store.get("geyser:versions").unwrap(), None);
    }

    #[test]
    fn file_format_is_key_to_expiry_value_pair() {
        let (_dir, store) = store();
        store.set_at("a", json!(1), Some(100), 1_000).unwrap();
        store.set_at("b", json!({"x": true}), None, 1_000).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(store.path()).unwrap()).unwrap();
        assert_eq!(raw, json!({"a": [1_100, 1], "b": [null, {"x": true}]}));
    }

    #[test]
    fn expired_entry_is_a_miss_and_is_evicted() {
        let (_dir, store) = store();
        store.set_at("k", json!("v"), Some(10), 1_000).unwrap();
        store.set_at("forever", json!("v"), None, 1_000).unwrap();

        assert_eq!(store.get_at("k", 1_009).unwrap(), Some(json!("v")));
        assert_eq!(store.get_at("k", 1_010).unwrap(), None);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_at("forever", i64::MAX).unwrap(), Some(json!("v")));
    }

    #[test]
    fn missing_and_corrupt_files_are_empty_caches() {
        let (_dir, store) = store();
        assert_eq!(store.get("anything").unwrap(), None);

        fs::write(store.path(), b"{not json").unwrap();
        assert_eq!(store.get("anything").unwrap(), None);

        store.set("k", json!(1), None).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!(1)));
    }

    #[test]
    fn delete_and_clear() {
        let (_dir, store) = store();
        store.set("a", json!(1), None).unwrap();
        store.set("b", json!(2), None).unwrap();

        store.delete("a").unwrap();
        store.delete("never-there").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap(), Some(json!(2)));

        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }

    #[test]
    fn typed_get_treats_shape_mismatch_as_miss() {
        let (_dir, store) = store();
        store.set("n", json!("not a number"), None).unwrap();

        let value: Option<u64> = store.get_as("n").unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn write_failure_is_cache_io() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, b"").unwrap();
        // The parent "directory" is a regular file
        let store = CacheStore::new(blocker.join("cache.json"));

        let err = store.set("k", json!(1), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CacheIo);
    }
}
