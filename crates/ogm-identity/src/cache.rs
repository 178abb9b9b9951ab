//! Bounded cache of wrapper types, keyed by concrete type name.
//!
//! Building a [`WrapperType`] happens at most once per type while the entry
//! stays resident. The build runs outside the lock; when two threads race on
//! the same type, the first insert wins and the loser's build is discarded.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use tracing::{debug, warn};

use crate::config::IdentityConfig;
use crate::error::IdentityResult;
use crate::wrapper::WrapperType;

/// Bounded cache of wrapper types keyed by type name.
///
/// Shared between trackers through an `Arc`. Lookups and inserts are
/// serialized by one lock; the least recently used entry is evicted
/// when the cache is full.
pub struct WrapperTypeCache {
    entries: Mutex<LruCache<String, Arc<WrapperType>>>,
    builds: AtomicU64,
}

impl WrapperTypeCache {
    /// Empty cache holding at most `capacity` wrapper types.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            builds: AtomicU64::new(0),
        }
    }

    /// Cache sized from configuration, falling back to the default capacity
    /// when the configured one is zero.
    pub fn from_config(config: &IdentityConfig) -> Self {
        Self::new(
            config
                .cache_capacity()
                .unwrap_or(IdentityConfig::DEFAULT_CAPACITY),
        )
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Arc<WrapperType>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached wrapper type for `type_name`, marking it recently used.
    pub fn get(&self, type_name: &str) -> Option<Arc<WrapperType>> {
        self.lock().get(type_name).cloned()
    }

    /// Return the cached wrapper type for `type_name`, building and
    /// inserting it on a miss. A failed build leaves the cache unchanged.
    pub fn find_or_insert<F>(&self, type_name: &str, build: F) -> IdentityResult<Arc<WrapperType>>
    where
        F: FnOnce() -> IdentityResult<WrapperType>,
    {
        if let Some(hit) = self.get(type_name) {
            return Ok(hit);
        }

        let built = match build() {
            Ok(built) => Arc::new(built),
            Err(e) => {
                warn!(type_name, error = %e, "wrapper type construction failed");
                return Err(e);
            }
        };
        self.builds.fetch_add(1, Ordering::Relaxed);

        let mut entries = self.lock();
        if let Some(existing) = entries.get(type_name) {
            return Ok(Arc::clone(existing));
        }
        if let Some((evicted, _)) = entries.push(type_name.to_string(), Arc::clone(&built)) {
            warn!(type_name, evicted = %evicted, "wrapper type evicted");
        }
        debug!(type_name, wrapper = built.name(), "wrapper type cached");
        Ok(built)
    }

    /// Number of cached wrapper types.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of cached wrapper types.
    pub fn capacity(&self) -> NonZeroUsize {
        self.lock().cap()
    }

    /// Number of wrapper types built so far, including discarded ones.
    pub fn builds(&self) -> u64 {
        self.builds.load(Ordering::Relaxed)
    }

    /// Returns `true` if a wrapper type for `type_name` is cached. Does not
    /// touch the recency order.
    pub fn contains(&self, type_name: &str) -> bool {
        self.lock().contains(type_name)
    }

    /// Drop every cached wrapper type.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Default for WrapperTypeCache {
    fn default() -> Self {
        Self::new(IdentityConfig::DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for WrapperTypeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrapperTypeCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("builds", &self.builds())
            .finish()
    }
}
