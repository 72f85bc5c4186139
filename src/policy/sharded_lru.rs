//! # Sharded LRU Cache
//!
//! Partitions keys across N independent [`LruCache`] shards, each behind its
//! own `parking_lot::Mutex`. A key always maps to the same shard
//! ([`ShardSelector`]), so threads touching different shards never contend.
//!
//! ```text
//!   put(k, v) ──► ShardSelector(seed, k) ──► shard i
//!
//!   ┌──────────────────┐ ┌──────────────────┐     ┌──────────────────┐
//!   │ Mutex<LruCache>  │ │ Mutex<LruCache>  │ ... │ Mutex<LruCache>  │
//!   │ capacity c0      │ │ capacity c1      │     │ capacity cN-1    │
//!   └──────────────────┘ └──────────────────┘     └──────────────────┘
//!
//!   c0 + c1 + ... + cN-1 == capacity, each ci ≥ 1
//! ```
//!
//! Recency is tracked per shard: a full shard evicts its own LRU entry even
//! if another shard holds an older one. Total size never exceeds the
//! configured capacity.
//!
//! ## Example Usage
//!
//! ```
//! use loon::policy::sharded_lru::ShardedLruCache;
//!
//! let cache: ShardedLruCache<u64, String> = ShardedLruCache::new(1024, 8);
//! cache.put(7, "seven".to_string());
//! assert_eq!(cache.get(&7), Some("seven".to_string()));
//! assert_eq!(cache.shard_count(), 8);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;
use tracing::debug;

use crate::ds::shard::ShardSelector;
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::MetricsSnapshotProvider;
use crate::policy::lru::LruCache;

pub struct ShardedLruCache<K, V, S = FxBuildHasher> {
    shards: Box<[Mutex<LruCache<K, V, S>>]>,
    selector: ShardSelector,
    capacity: usize,
}

/// Splits `capacity` over `shards`, handing the remainder to the first
/// shards one slot at a time.
fn shard_capacities(capacity: usize, shards: usize) -> impl Iterator<Item = usize> {
    let base = capacity / shards;
    let extra = capacity % shards;
    (0..shards).map(move |i| base + usize::from(i < extra))
}

impl<K, V> ShardedLruCache<K, V, FxBuildHasher>
where
    K: Eq + Hash + Clone,
{
    /// # Panics
    ///
    /// Panics under the same conditions [`try_new`](Self::try_new) errors.
    pub fn new(capacity: usize, shards: usize) -> Self {
        match Self::try_new(capacity, shards) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates `shards` shards sharing `capacity` entries, with seed 0.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` or `shards` is zero, or if
    /// `capacity < shards` (a shard would get no slots).
    pub fn try_new(capacity: usize, shards: usize) -> Result<Self, ConfigError> {
        Self::try_with_hasher(capacity, shards, 0, FxBuildHasher)
    }
}

impl<K, V, S> ShardedLruCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher + Clone,
{
    /// Fully configured constructor; `seed` perturbs shard placement.
    pub fn try_with_hasher(
        capacity: usize,
        shards: usize,
        seed: u64,
        hasher: S,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::invalid_capacity(capacity));
        }
        if shards == 0 {
            return Err(ConfigError::new("shard count must be greater than zero"));
        }
        if capacity < shards {
            return Err(ConfigError::new(format!(
                "capacity {capacity} is smaller than shard count {shards}"
            )));
        }

        let shards_vec = shard_capacities(capacity, shards)
            .map(|cap| LruCache::try_with_hasher(cap, hasher.clone()).map(Mutex::new))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(capacity, shards, seed, "sharded lru cache created");
        Ok(Self {
            shards: shards_vec.into_boxed_slice(),
            selector: ShardSelector::new(shards, seed),
            capacity,
        })
    }

    /// # Panics
    ///
    /// Panics under the same conditions
    /// [`try_with_hasher`](Self::try_with_hasher) errors.
    pub fn with_hasher(capacity: usize, shards: usize, seed: u64, hasher: S) -> Self {
        match Self::try_with_hasher(capacity, shards, seed, hasher) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<K, V, S> ShardedLruCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    /// Installs one listener on every shard. It runs under the evicting
    /// shard's lock and must not call back into this cache.
    pub fn with_eviction_listener<F>(self, listener: F) -> Self
    where
        F: Fn(K, V) + Send + Sync + 'static,
        K: 'static,
        V: 'static,
    {
        let listener = Arc::new(listener);
        for shard in self.shards.iter() {
            let listener = Arc::clone(&listener);
            shard
                .lock()
                .set_eviction_listener(move |key: K, value: V| (*listener)(key, value));
        }
        self
    }

    #[inline]
    fn shard<Q>(&self, key: &Q) -> &Mutex<LruCache<K, V, S>>
    where
        Q: Hash + ?Sized,
    {
        &self.shards[self.selector.shard_for_key(key)]
    }

    /// Index of the shard `key` lives in.
    pub fn shard_index<Q>(&self, key: &Q) -> usize
    where
        Q: Hash + ?Sized,
    {
        self.selector.shard_for_key(key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.shard(key).lock().get(key).cloned()
    }

    /// Runs `f` on the value for `key` under the shard lock, promoting it.
    pub fn get_with<Q, R, F>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> R,
    {
        self.shard(key).lock().get(key).map(f)
    }

    pub fn peek_with<Q, R, F>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> R,
    {
        self.shard(key).lock().peek(key).map(f)
    }

    pub fn put(&self, key: K, value: V) {
        self.shard(&key).lock().put(key, value);
    }

    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.shard(&key).lock().insert(key, value)
    }

    /// Builds the value before taking any lock; on `Err` nothing changes.
    pub fn try_put_with<E, F>(&self, key: K, make: F) -> Result<(), E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let value = make()?;
        self.put(key, value);
        Ok(())
    }

    /// Returns a clone of the value for `key`, inserting `make()` on a miss.
    /// `make` runs with no shard locked; a concurrent insert of the same key
    /// wins over the built value.
    pub fn get_or_insert_with<F>(&self, key: K, make: F) -> V
    where
        F: FnOnce() -> V,
        V: Clone,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = make();
        self.shard(&key).lock().get_or_insert(key, value).clone()
    }

    pub fn erase<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard(key).lock().erase(key)
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard(key).lock().remove(key)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard(key).lock().contains(key)
    }

    pub fn touch<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard(key).lock().touch(key)
    }

    /// Sum of shard sizes. Each shard is locked in turn, so under concurrent
    /// writes the result is a snapshot, not a linearizable count.
    pub fn size(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().size()).sum()
    }

    pub fn len(&self) -> usize {
        self.size()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.lock().is_empty())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Capacity of each shard, in shard order.
    pub fn shard_capacities(&self) -> Vec<usize> {
        self.shards.iter().map(|shard| shard.lock().capacity()).collect()
    }

    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.lock().clear();
        }
    }

    /// Checks every shard, and that each key sits in the shard it hashes to.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        for (idx, shard) in self.shards.iter().enumerate() {
            let shard = shard.lock();
            shard
                .check_invariants()
                .map_err(|err| InvariantError::new(format!("shard {idx}: {err}")))?;
            if shard.keys().any(|key| self.selector.shard_for_key(key) != idx) {
                return Err(InvariantError::new(format!(
                    "shard {idx} holds a key that hashes to another shard"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(feature = "metrics")]
impl<K, V, S> ShardedLruCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    /// Counters summed over all shards.
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        let mut total = LruMetricsSnapshot::default();
        for shard in self.shards.iter() {
            total.accumulate(&shard.lock().metrics_snapshot());
        }
        total
    }
}

#[cfg(feature = "metrics")]
impl<K, V, S> MetricsSnapshotProvider<LruMetricsSnapshot> for ShardedLruCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    fn snapshot(&self) -> LruMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V, S> fmt::Debug for ShardedLruCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedLruCache")
            .field("shards", &self.shards.len())
            .field("capacity", &self.capacity)
            .field("seed", &self.selector.seed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_split_spreads_remainder() {
        let caps: Vec<_> = shard_capacities(10, 4).collect();
        assert_eq!(caps, vec![3, 3, 2, 2]);
        assert_eq!(shard_capacities(8, 8).sum::<usize>(), 8);
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert!(ShardedLruCache::<u32, u32>::try_new(0, 4).is_err());
        assert!(ShardedLruCache::<u32, u32>::try_new(16, 0).is_err());
        let err = ShardedLruCache::<u32, u32>::try_new(3, 4).unwrap_err();
        assert!(err.message().contains("smaller than shard count"));
    }

    #[test]
    fn shard_capacities_add_up() {
        let cache: ShardedLruCache<u32, u32> = ShardedLruCache::new(100, 7);
        let caps = cache.shard_capacities();
        assert_eq!(caps.len(), 7);
        assert_eq!(caps.iter().sum::<usize>(), 100);
        assert!(caps.iter().all(|&c| c == 14 || c == 15));
    }

    #[test]
    fn basic_operations() {
        let cache = ShardedLruCache::new(64, 4);
        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        assert_eq!(cache.get("a"), Some(1));
        assert!(cache.contains("b"));
        assert_eq!(cache.insert("a".to_string(), 10), Some(1));
        assert_eq!(cache.peek_with("a", |v| *v), Some(10));
        assert!(cache.erase("b"));
        assert!(!cache.erase("b"));
        assert_eq!(cache.size(), 1);
        assert!(cache.check_invariants().is_ok());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn size_never_exceeds_capacity() {
        let cache = ShardedLruCache::new(32, 4);
        for key in 0..1_000u32 {
            cache.put(key, key);
            assert!(cache.size() <= 32);
        }
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn eviction_is_lru_within_a_shard() {
        let cache: ShardedLruCache<u32, u32> = ShardedLruCache::new(8, 2);
        // five keys that all land in shard 0 (capacity 4)
        let same_shard: Vec<u32> = (0..)
            .filter(|k| cache.shard_index(k) == 0)
            .take(5)
            .collect();
        for &key in &same_shard[..4] {
            cache.put(key, key);
        }
        cache.get(&same_shard[0]);
        cache.put(same_shard[4], 0);
        assert!(cache.contains(&same_shard[0]));
        assert!(!cache.contains(&same_shard[1]));
    }

    #[test]
    fn listener_fires_on_every_shard() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let evicted = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&evicted);
        let cache = ShardedLruCache::new(4, 4).with_eviction_listener(move |_k: u32, _v: u32| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        for key in 0..100 {
            cache.put(key, key);
        }
        assert_eq!(evicted.load(Ordering::SeqCst), 100 - cache.size());
    }

    #[test]
    fn get_or_insert_with_builds_without_holding_a_shard() {
        use std::sync::mpsc;
        use std::thread;
        use std::time::Duration;

        let cache: Arc<ShardedLruCache<u32, usize>> = Arc::new(ShardedLruCache::new(8, 2));
        let other = Arc::clone(&cache);

        let value = cache.get_or_insert_with(1, move || {
            let (tx, rx) = mpsc::channel();
            thread::spawn(move || {
                // Touches both shards, including the one `1` maps to.
                let _ = tx.send(other.size());
            });
            rx.recv_timeout(Duration::from_secs(5))
                .expect("size() from another thread blocked while the value was built")
        });

        assert_eq!(value, 0);
        assert_eq!(cache.get(&1), Some(0));
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn try_put_with_error_changes_nothing() {
        let cache: ShardedLruCache<u32, u32> = ShardedLruCache::new(4, 2);
        let result: Result<(), &str> = cache.try_put_with(1, || Err("no"));
        assert!(result.is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_insert_with(1, || 5), 5);
        assert_eq!(cache.get_or_insert_with(1, || 6), 5);
    }
}
