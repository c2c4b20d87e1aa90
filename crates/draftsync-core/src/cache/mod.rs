//! Local persistent snapshot cache.
//!
//! A synchronous key/string store mirroring the in-memory drafts so a session
//! can recover its working copies after a restart. Write failures are treated
//! as non-fatal by the engine; the in-memory copy stays authoritative.

mod fs;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

pub use fs::FsCache;

use crate::error::Result;
use crate::models::DraftId;

/// Cache key for a draft snapshot
#[must_use]
pub fn draft_key(id: DraftId) -> String {
    format!("draft_{id}")
}

/// Synchronous key -> string snapshot store
pub trait SnapshotCache: Send + Sync {
    /// Read a value by key
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value by key, overwriting any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// All keys currently present, in no particular order
    fn keys(&self) -> Result<Vec<String>>;
}

/// In-memory cache, used in tests and as a no-persistence fallback
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn memory_cache_round_trip() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("draft_x").unwrap(), None);

        cache.set("draft_x", "{}").unwrap();
        assert_eq!(cache.get("draft_x").unwrap(), Some("{}".to_string()));

        cache.set("draft_x", "{\"v\":2}").unwrap();
        assert_eq!(cache.get("draft_x").unwrap(), Some("{\"v\":2}".to_string()));
        assert_eq!(cache.keys().unwrap(), vec!["draft_x".to_string()]);
    }

    #[test]
    fn draft_key_is_prefixed() {
        let id = DraftId::new();
        assert_eq!(draft_key(id), format!("draft_{id}"));
    }
}
