//! Builder for the LRU cache family.
//!
//! One configuration, three shapes: a single-threaded [`LruCache`], a
//! mutex-guarded [`ConcurrentLruCache`], or a [`ShardedLruCache`].
//!
//! ## Example
//!
//! ```rust
//! use loon::builder::LruBuilder;
//!
//! let mut cache = LruBuilder::new(100).build::<u64, String>();
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some(&"hello".to_string()));
//!
//! let sharded = LruBuilder::new(1024).shards(8).seed(42).build_sharded::<u64, u64>();
//! assert_eq!(sharded.shard_count(), 8);
//! ```

use std::hash::{BuildHasher, Hash};

use rustc_hash::FxBuildHasher;
use tracing::warn;

use crate::error::ConfigError;
#[cfg(feature = "concurrency")]
use crate::policy::lru::ConcurrentLruCache;
use crate::policy::lru::LruCache;
#[cfg(feature = "concurrency")]
use crate::policy::sharded_lru::ShardedLruCache;

/// Shard count used by [`LruBuilder::build_sharded`] when none is set,
/// reduced to the capacity for tiny caches.
pub const DEFAULT_SHARDS: usize = 16;

/// Collects cache parameters; the `build*` methods validate them.
#[derive(Debug, Clone)]
pub struct LruBuilder<S = FxBuildHasher> {
    capacity: usize,
    hasher: S,
    shards: Option<usize>,
    seed: u64,
}

impl LruBuilder<FxBuildHasher> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            hasher: FxBuildHasher,
            shards: None,
            seed: 0,
        }
    }
}

impl<S> LruBuilder<S> {
    /// Total number of entries (summed over shards when sharded).
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Replaces the hasher used by the key index.
    pub fn hasher<S2>(self, hasher: S2) -> LruBuilder<S2> {
        LruBuilder {
            capacity: self.capacity,
            hasher,
            shards: self.shards,
            seed: self.seed,
        }
    }

    /// Shard count for [`build_sharded`](Self::build_sharded).
    pub fn shards(mut self, shards: usize) -> Self {
        self.shards = Some(shards);
        self
    }

    /// Seed mixed into shard selection.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validated_capacity(&self) -> Result<usize, ConfigError> {
        if self.capacity == 0 {
            let err = ConfigError::invalid_capacity(self.capacity);
            warn!(error = %err, "rejected lru cache configuration");
            return Err(err);
        }
        Ok(self.capacity)
    }
}

impl<S: BuildHasher> LruBuilder<S> {
    pub fn try_build<K, V>(self) -> Result<LruCache<K, V, S>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        let capacity = self.validated_capacity()?;
        LruCache::try_with_hasher(capacity, self.hasher)
    }

    /// # Panics
    ///
    /// Panics if the capacity is zero.
    pub fn build<K, V>(self) -> LruCache<K, V, S>
    where
        K: Eq + Hash + Clone,
    {
        match self.try_build() {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    #[cfg(feature = "concurrency")]
    pub fn try_build_concurrent<K, V>(self) -> Result<ConcurrentLruCache<K, V, S>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        self.try_build().map(ConcurrentLruCache::from_cache)
    }

    /// # Panics
    ///
    /// Panics if the capacity is zero.
    #[cfg(feature = "concurrency")]
    pub fn build_concurrent<K, V>(self) -> ConcurrentLruCache<K, V, S>
    where
        K: Eq + Hash + Clone,
    {
        match self.try_build_concurrent() {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }
}

#[cfg(feature = "concurrency")]
impl<S: BuildHasher + Clone> LruBuilder<S> {
    /// Builds a sharded cache. Without an explicit [`shards`](Self::shards)
    /// call the shard count is `min(DEFAULT_SHARDS, capacity)`.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] for a zero capacity, an explicit zero shard count, or
    /// more shards than capacity.
    pub fn try_build_sharded<K, V>(self) -> Result<ShardedLruCache<K, V, S>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        let capacity = self.validated_capacity()?;
        let shards = self
            .shards
            .unwrap_or_else(|| DEFAULT_SHARDS.min(capacity));
        ShardedLruCache::try_with_hasher(capacity, shards, self.seed, self.hasher).map_err(|err| {
            warn!(error = %err, capacity, shards, "rejected sharded lru configuration");
            err
        })
    }

    /// # Panics
    ///
    /// Panics under the same conditions
    /// [`try_build_sharded`](Self::try_build_sharded) errors.
    pub fn build_sharded<K, V>(self) -> ShardedLruCache<K, V, S>
    where
        K: Eq + Hash + Clone,
    {
        match self.try_build_sharded() {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::RandomState;

    use super::*;

    #[test]
    fn test_build_single_threaded() {
        let mut cache = LruBuilder::new(2).build::<u64, String>();

        cache.put(1, "one".to_string());
        cache.put(2, "two".to_string());
        cache.put(3, "three".to_string());

        assert_eq!(cache.size(), 2);
        assert!(!cache.contains(&1));
        assert!(cache.contains(&2));
        assert!(cache.contains(&3));
    }

    #[test]
    fn test_zero_capacity_rejected_everywhere() {
        assert!(LruBuilder::new(0).try_build::<u8, u8>().is_err());
        assert!(LruBuilder::new(10)
            .capacity(0)
            .try_build::<u8, u8>()
            .is_err());
        #[cfg(feature = "concurrency")]
        {
            assert!(LruBuilder::new(0).try_build_concurrent::<u8, u8>().is_err());
            assert!(LruBuilder::new(0).try_build_sharded::<u8, u8>().is_err());
        }
    }

    #[test]
    fn test_custom_hasher() {
        let mut cache = LruBuilder::new(4)
            .hasher(RandomState::new())
            .build::<&str, u32>();
        cache.put("a", 1);
        assert_eq!(cache.get("a"), Some(&1));
    }

    #[cfg(feature = "concurrency")]
    #[test]
    fn test_sharded_defaults_and_overrides() {
        let cache = LruBuilder::new(4).build_sharded::<u32, u32>();
        assert_eq!(cache.shard_count(), 4);

        let cache = LruBuilder::new(1000).build_sharded::<u32, u32>();
        assert_eq!(cache.shard_count(), DEFAULT_SHARDS);
        assert_eq!(cache.capacity(), 1000);

        let cache = LruBuilder::new(64).shards(3).seed(9).build_sharded::<u32, u32>();
        assert_eq!(cache.shard_count(), 3);
        assert_eq!(cache.shard_capacities().iter().sum::<usize>(), 64);

        assert!(LruBuilder::new(2)
            .shards(0)
            .try_build_sharded::<u32, u32>()
            .is_err());
        assert!(LruBuilder::new(2)
            .shards(3)
            .try_build_sharded::<u32, u32>()
            .is_err());
    }

    #[cfg(feature = "concurrency")]
    #[test]
    fn test_build_concurrent() {
        let cache = LruBuilder::new(8).build_concurrent::<u32, u32>();
        cache.put(1, 1);
        assert_eq!(cache.get(&1), Some(1));
        assert_eq!(cache.capacity(), 8);
    }
}
