//! On-disk snapshot cache
//!
//! Single-shot invocations share nothing in memory, so the cache is a TTL'd
//! JSON file holding the last full API snapshot.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::debug;

use xeninv_core::Snapshot;

use crate::error::{ClientError, Result};

#[derive(Debug, Serialize, Deserialize)]
struct CachedSnapshot {
    /// Unix timestamp of the store
    stored_at: u64,
    snapshot: Snapshot,
}

/// TTL'd cache for full API snapshots
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
    ttl: Duration,
}

impl SnapshotCache {
    /// Create a cache rooted at `dir`
    #[must_use]
    pub fn new(dir: &Path, ttl: Duration) -> Self {
        Self {
            path: dir.join("snapshot.json"),
            ttl,
        }
    }

    /// Load a non-expired snapshot, if one is present.
    ///
    /// # Errors
    /// Returns `ClientError::Cache` when the cache file exists but cannot be
    /// read or parsed.
    pub fn load(&self) -> Result<Option<Snapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| ClientError::Cache(e.to_string()))?;
        let cached: CachedSnapshot =
            serde_json::from_str(&content).map_err(|e| ClientError::Cache(e.to_string()))?;

        if epoch_secs().saturating_sub(cached.stored_at) > self.ttl.as_secs() {
            debug!("cached snapshot expired");
            return Ok(None);
        }

        debug!("using cached snapshot");
        Ok(Some(cached.snapshot))
    }

    /// Store a fresh snapshot, creating the cache directory as needed.
    ///
    /// # Errors
    /// Returns `ClientError::Cache` when the file cannot be written.
    pub fn store(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ClientError::Cache(e.to_string()))?;
        }

        let cached = CachedSnapshot {
            stored_at: epoch_secs(),
            snapshot: snapshot.clone(),
        };
        let content =
            serde_json::to_string(&cached).map_err(|e| ClientError::Cache(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| ClientError::Cache(e.to_string()))?;

        debug!(path = %self.path.display(), "snapshot cached");
        Ok(())
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cache_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("xeninv-cache-test-{tag}-{}", std::process::id()))
    }

    #[test]
    fn test_load_missing_cache() {
        let cache = SnapshotCache::new(&temp_cache_dir("missing"), Duration::from_secs(60));
        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn test_store_and_load_round_trip() {
        let dir = temp_cache_dir("roundtrip");
        let cache = SnapshotCache::new(&dir, Duration::from_secs(60));

        let mut snapshot = Snapshot::default();
        snapshot.pools.insert("p1".to_string(), serde_json::Map::new());
        cache.store(&snapshot).unwrap();

        let loaded = cache.load().unwrap().unwrap();
        assert_eq!(loaded.pools.len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_expired_snapshot_is_ignored() {
        let dir = temp_cache_dir("expired");
        let cache = SnapshotCache::new(&dir, Duration::from_secs(0));

        cache.store(&Snapshot::default()).unwrap();
        std::thread::sleep(Duration::from_millis(1100));
        assert!(cache.load().unwrap().is_none());

        std::fs::remove_dir_all(&dir).ok();
    }
}
