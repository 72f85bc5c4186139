//! # Least Recently Used (LRU) Cache
//!
//! Bounded key/value cache that evicts the least recently touched entry when
//! an insert would exceed capacity. Every operation on the hot path is O(1)
//! and allocation-free once the cache is constructed.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                         LruCache<K, V, S>                            │
//!   │                                                                      │
//!   │   ┌──────────────────────────────┐                                   │
//!   │   │  KeyIndex<K, S>              │                                   │
//!   │   │  ┌────────┬──────────┐       │                                   │
//!   │   │  │  key   │  SlotId  │       │                                   │
//!   │   │  ├────────┼──────────┤       │                                   │
//!   │   │  │ "a"    │   #2  ───┼───┐   │                                   │
//!   │   │  │ "b"    │   #0  ───┼─┐ │   │                                   │
//!   │   │  └────────┴──────────┘ │ │   │                                   │
//!   │   └────────────────────────┼─┼───┘                                   │
//!   │                            ▼ ▼                                       │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  SlotArena<Entry<K, V>>   [ b | _ | a | _ ]  (preallocated)  │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  RecencyList (links parallel to the arena)                   │   │
//!   │   │     HEAD ──► [#2 a] ◄──► [#0 b] ◄── TAIL                     │   │
//!   │   │              MRU           LRU                               │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The index maps a key to the slot holding its entry; the recency list links
//! slots by index. No node ever moves, and no pointer is stored anywhere, so
//! the core contains no `unsafe`.
//!
//! ## Operations Flow
//!
//! ```text
//!   put(D) with the cache full (capacity = 3)
//!
//!     HEAD ──► [A] ◄──► [B] ◄──► [C] ◄── TAIL
//!
//!     1. index miss for D; clone D for the index
//!     2. pop_back → C; release C's slot; index.remove(C)
//!     3. acquire slot for D; index.insert(D); push_front(D)
//!     4. listener(C)
//!
//!     HEAD ──► [D] ◄──► [A] ◄──► [B] ◄── TAIL
//!
//!   get(B)
//!
//!     1. index hit → slot of B
//!     2. move_to_front(B)
//!
//!     HEAD ──► [B] ◄──► [D] ◄──► [A] ◄── TAIL
//!
//!   contains(A) / peek(A): index lookup only, order unchanged
//! ```
//!
//! ## Methods
//!
//! | Method                   | Complexity | Description                                |
//! |--------------------------|------------|--------------------------------------------|
//! | `try_new(capacity)`      | O(cap)     | Preallocate; `ConfigError` on zero         |
//! | `put(k, v)`              | O(1)       | Insert or update, may evict the LRU entry  |
//! | `insert(k, v)`           | O(1)       | `put` returning the previous value         |
//! | `try_put_with(k, f)`     | O(1)       | Build the value first; no change on `Err`  |
//! | `get(&k)`                | O(1)       | Value, promotes to MRU                     |
//! | `peek(&k)`               | O(1)       | Value without promotion                    |
//! | `contains(&k)`           | O(1)       | Membership without promotion               |
//! | `erase(&k)` / `remove`   | O(1)       | Drop an entry; no-op when absent           |
//! | `touch(&k)`              | O(1)       | Promote without reading                    |
//! | `pop_lru()` / `peek_lru` | O(1)       | Tail entry                                 |
//! | `recency_rank(&k)`       | O(n)       | Position from MRU (0)                      |
//! | `iter()`                 | O(n)       | Entries MRU → LRU                          |
//! | `clear()`                | O(cap)     | Drop all entries, keep the allocation      |
//!
//! ## Eviction Listener
//!
//! An [`EvictionListener`] installed with
//! [`with_eviction_listener`](LruCache::with_eviction_listener) receives the
//! owned key and value of each entry evicted for capacity, synchronously,
//! after the cache is already consistent again. It cannot reach the cache.
//!
//! ## Thread Safety
//!
//! - `LruCache`: single-threaded; `Send` when its parts are.
//! - [`ConcurrentLruCache`]: one `LruCache` behind a `parking_lot::Mutex`
//!   (feature `concurrency`). `get` updates recency, so even reads need
//!   exclusive access; a reader/writer lock would buy nothing.
//! - For contended workloads use
//!   [`ShardedLruCache`](crate::policy::sharded_lru::ShardedLruCache).
//!
//! ## Example Usage
//!
//! ```
//! use loon::policy::lru::LruCache;
//!
//! let mut cache = LruCache::new(2);
//! cache.put(1, "a");
//! cache.put(2, "b");
//! assert_eq!(cache.get(&1), Some(&"a"));
//!
//! cache.put(3, "c"); // evicts 2, the least recently used
//! assert!(!cache.contains(&2));
//! assert_eq!(cache.size(), 2);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
#[cfg(feature = "concurrency")]
use std::sync::Arc;

#[cfg(feature = "concurrency")]
use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;
use tracing::debug;

use crate::ds::key_index::KeyIndex;
use crate::ds::recency_list::RecencyList;
use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LruMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, LruMetricsReadRecorder, LruMetricsRecorder, MetricsSnapshotProvider,
};
use crate::traits::{CoreCache, EvictionListener, LruCacheTrait, MutableCache};

/// Arena payload: the key is kept next to the value so eviction can clear
/// the index entry.
struct Entry<K, V> {
    key: K,
    value: V,
}

type BoxedListener<K, V> = Box<dyn EvictionListener<K, V> + Send>;

/// Arena-backed LRU cache.
///
/// `K` is cloned once per new key (one copy lives in the index, one in the
/// slot). The hasher defaults to `FxBuildHasher`; supply a keyed hasher via
/// [`with_hasher`](Self::with_hasher) when keys come from untrusted input.
pub struct LruCache<K, V, S = FxBuildHasher> {
    arena: SlotArena<Entry<K, V>>,
    index: KeyIndex<K, S>,
    order: RecencyList,
    capacity: usize,
    listener: Option<BoxedListener<K, V>>,
    #[cfg(feature = "metrics")]
    metrics: LruMetrics,
}

#[cold]
#[inline(never)]
fn corrupted(detail: &dyn fmt::Display) -> ! {
    panic!("lru cache invariant violated: {detail}")
}

impl<K, V> LruCache<K, V, FxBuildHasher>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. Use [`try_new`](Self::try_new) to get a
    /// [`ConfigError`] instead.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use loon::policy::lru::LruCache;
    ///
    /// let cache = LruCache::<u32, u32>::try_new(16).unwrap();
    /// assert_eq!(cache.capacity(), 16);
    /// assert!(LruCache::<u32, u32>::try_new(0).is_err());
    /// ```
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        Self::try_with_hasher(capacity, FxBuildHasher)
    }
}

impl<K, V, S> LruCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    /// Creates a cache with a custom hasher.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_hasher(capacity: usize, hasher: S) -> Self {
        match Self::try_with_hasher(capacity, hasher) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Fallible form of [`with_hasher`](Self::with_hasher).
    ///
    /// ```
    /// use std::collections::hash_map::RandomState;
    /// use loon::policy::lru::LruCache;
    ///
    /// let mut cache: LruCache<String, u32, RandomState> =
    ///     LruCache::try_with_hasher(8, RandomState::new()).unwrap();
    /// cache.put("k".to_string(), 1);
    /// assert_eq!(cache.get("k"), Some(&1));
    /// ```
    pub fn try_with_hasher(capacity: usize, hasher: S) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::invalid_capacity(capacity));
        }
        debug!(capacity, "lru cache created");
        Ok(Self {
            arena: SlotArena::with_capacity(capacity),
            index: KeyIndex::with_capacity_and_hasher(capacity, hasher),
            order: RecencyList::with_capacity(capacity),
            capacity,
            listener: None,
            #[cfg(feature = "metrics")]
            metrics: LruMetrics::default(),
        })
    }

    /// Installs `listener`, replacing any previous one.
    pub fn with_eviction_listener<L>(mut self, listener: L) -> Self
    where
        L: EvictionListener<K, V> + Send + 'static,
    {
        self.set_eviction_listener(listener);
        self
    }

    /// Installs `listener` on an existing cache, replacing any previous one.
    pub fn set_eviction_listener<L>(&mut self, listener: L)
    where
        L: EvictionListener<K, V> + Send + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    /// Removes the eviction listener. Returns `true` if one was installed.
    pub fn clear_eviction_listener(&mut self) -> bool {
        self.listener.take().is_some()
    }

    #[inline]
    fn entry(&self, id: SlotId) -> &Entry<K, V> {
        match self.arena.get(id) {
            Some(entry) => entry,
            None => corrupted(&format_args!("slot {id} is linked but free")),
        }
    }

    #[inline]
    fn entry_mut(&mut self, id: SlotId) -> &mut Entry<K, V> {
        match self.arena.get_mut(id) {
            Some(entry) => entry,
            None => corrupted(&format_args!("slot {id} is linked but free")),
        }
    }

    #[inline]
    fn take_slot(&mut self, id: SlotId) -> Entry<K, V> {
        match self.arena.release(id) {
            Some(entry) => entry,
            None => corrupted(&format_args!("slot {id} released twice")),
        }
    }

    #[inline]
    fn promote(&mut self, id: SlotId) {
        if !self.order.move_to_front(id) {
            corrupted(&format_args!("slot {id} is indexed but not linked"));
        }
    }

    #[inline]
    fn link_front(&mut self, id: SlotId) {
        if !self.order.push_front(id) {
            corrupted(&format_args!("fresh slot {id} is already linked"));
        }
    }

    #[inline]
    fn unlink(&mut self, id: SlotId) {
        if !self.order.unlink(id) {
            corrupted(&format_args!("slot {id} is indexed but not linked"));
        }
    }

    /// Removes the tail entry and returns it. The caller notifies the
    /// listener once the cache is consistent again.
    fn evict_lru(&mut self) -> (K, V) {
        #[cfg(feature = "metrics")]
        self.metrics.record_evict_call();

        let id = match self.order.pop_back() {
            Ok(id) => id,
            Err(err) => corrupted(&err),
        };
        let entry = self.take_slot(id);
        self.index.remove(&entry.key);

        #[cfg(feature = "metrics")]
        self.metrics.record_evicted_entry();

        (entry.key, entry.value)
    }

    /// Stores a key that is known to be absent, evicting first if full.
    ///
    /// Everything that can run caller code before the new entry is linked
    /// (`K::clone`) happens before the victim is removed, and the listener
    /// runs last.
    fn insert_new(&mut self, key: K, value: V) -> SlotId {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        let index_key = key.clone();
        let evicted = if self.arena.is_full() {
            Some(self.evict_lru())
        } else {
            None
        };

        let id = match self.arena.acquire(Entry { key, value }) {
            Ok(id) => id,
            Err(err) => corrupted(&err),
        };
        self.index.insert(index_key, id);
        self.link_front(id);

        debug_assert_eq!(self.index.len(), self.order.len());
        debug_assert_eq!(self.arena.len(), self.order.len());

        if let Some((evicted_key, evicted_value)) = evicted {
            if let Some(listener) = self.listener.as_mut() {
                listener.on_evict(evicted_key, evicted_value);
            }
        }
        id
    }

    /// Inserts or updates `key`, returning the previous value.
    ///
    /// Either way `key` becomes the most recently used entry. When a new key
    /// arrives at capacity, the least recently used entry is evicted first.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if let Some(id) = self.index.find(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            let previous = std::mem::replace(&mut self.entry_mut(id).value, value);
            self.promote(id);
            return Some(previous);
        }

        self.insert_new(key, value);
        None
    }

    /// Inserts or updates `key`. See [`insert`](Self::insert).
    #[inline]
    pub fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    /// Builds the value with `make` and then inserts it.
    ///
    /// The cache is not touched until `make` has returned `Ok`; an `Err` (or a
    /// panic inside `make`) leaves it exactly as it was.
    ///
    /// ```
    /// use loon::policy::lru::LruCache;
    ///
    /// let mut cache = LruCache::new(2);
    /// cache.put("a", 1);
    ///
    /// let failed: Result<(), &str> = cache.try_put_with("b", || Err("backend down"));
    /// assert_eq!(failed, Err("backend down"));
    /// assert_eq!(cache.size(), 1);
    ///
    /// cache.try_put_with::<(), _>("b", || Ok(2)).unwrap();
    /// assert_eq!(cache.peek("b"), Some(&2));
    /// ```
    pub fn try_put_with<E, F>(&mut self, key: K, make: F) -> Result<(), E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let value = make()?;
        self.insert(key, value);
        Ok(())
    }

    /// Returns the value for `key`, computing and inserting it on a miss.
    pub fn get_or_insert_with<F>(&mut self, key: K, make: F) -> &V
    where
        F: FnOnce() -> V,
    {
        if let Some(id) = self.index.find(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_hit();

            self.promote(id);
            return &self.entry(id).value;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_get_miss();

        let value = make();
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();
        let id = self.insert_new(key, value);
        &self.entry(id).value
    }

    /// Returns the resident value for `key`, promoted, or stores `value` when
    /// the key is absent. Used by the shared caches after building `value`
    /// outside their lock.
    #[cfg(feature = "concurrency")]
    pub(crate) fn get_or_insert(&mut self, key: K, value: V) -> &V {
        if let Some(id) = self.index.find(&key) {
            self.promote(id);
            return &self.entry(id).value;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();
        let id = self.insert_new(key, value);
        &self.entry(id).value
    }

    /// Fallible form of [`get_or_insert_with`](Self::get_or_insert_with).
    /// On `Err` nothing is inserted.
    pub fn try_get_or_insert_with<E, F>(&mut self, key: K, make: F) -> Result<&V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(id) = self.index.find(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_hit();

            self.promote(id);
            return Ok(&self.entry(id).value);
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_get_miss();

        let value = make()?;
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();
        let id = self.insert_new(key, value);
        Ok(&self.entry(id).value)
    }

    /// Returns the value for `key` and promotes it to most recently used.
    /// A miss changes nothing.
    #[inline]
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(id) = self.index.find(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        self.promote(id);
        Some(&self.entry(id).value)
    }

    /// Mutable form of [`get`](Self::get); also promotes.
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(id) = self.index.find(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        self.promote(id);
        Some(&mut self.entry_mut(id).value)
    }

    /// Returns the value for `key` without changing recency.
    #[inline]
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_peek_call();

        let id = self.index.find(key)?;

        #[cfg(feature = "metrics")]
        (&self.metrics).record_peek_found();

        Some(&self.entry(id).value)
    }

    /// Membership test. Never promotes.
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_contains_call();

        self.index.contains(key)
    }

    /// Removes `key`, returning its value. The eviction listener is not
    /// called.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        #[cfg(feature = "metrics")]
        self.metrics.record_erase_call();

        let id = self.index.remove(key)?;
        self.unlink(id);
        let entry = self.take_slot(id);

        #[cfg(feature = "metrics")]
        self.metrics.record_erase_found();

        Some(entry.value)
    }

    /// Removes `key`. Returns `false` when it was not present.
    #[inline]
    pub fn erase<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove(key).is_some()
    }

    /// Promotes `key` to most recently used without reading it.
    #[inline]
    pub fn touch<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        #[cfg(feature = "metrics")]
        self.metrics.record_touch_call();

        let Some(id) = self.index.find(key) else {
            return false;
        };
        self.promote(id);

        #[cfg(feature = "metrics")]
        self.metrics.record_touch_found();

        true
    }

    /// Removes and returns the least recently used entry. The eviction
    /// listener is not called.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lru_call();

        let id = self.order.pop_back().ok()?;
        let entry = self.take_slot(id);
        self.index.remove(&entry.key);

        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lru_found();

        Some((entry.key, entry.value))
    }

    /// The entry that the next eviction would remove.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_peek_lru_call();

        let id = self.order.back()?;

        #[cfg(feature = "metrics")]
        (&self.metrics).record_peek_lru_found();

        let entry = self.entry(id);
        Some((&entry.key, &entry.value))
    }

    /// The most recently used entry.
    pub fn peek_mru(&self) -> Option<(&K, &V)> {
        let entry = self.entry(self.order.front()?);
        Some((&entry.key, &entry.value))
    }

    /// Position of `key` counted from the MRU end (0). O(n).
    pub fn recency_rank<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_recency_rank_call();

        let target = self.index.find(key)?;
        for (rank, id) in self.order.iter().enumerate() {
            #[cfg(feature = "metrics")]
            (&self.metrics).record_recency_rank_scan_step();

            if id == target {
                #[cfg(feature = "metrics")]
                (&self.metrics).record_recency_rank_found();
                return Some(rank);
            }
        }
        None
    }

    /// Entries from most to least recently used. Does not change recency.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&K, &V)> + '_ {
        self.order.iter().map(move |id| {
            let entry = self.entry(id);
            (&entry.key, &entry.value)
        })
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Number of entries.
    #[inline]
    pub fn size(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.arena.is_full()
    }

    pub fn hasher(&self) -> &S {
        self.index.hasher()
    }

    /// Drops every entry without calling the eviction listener. Keeps the
    /// preallocated storage.
    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        let dropped = self.len();
        self.index.clear();
        self.order.clear();
        self.arena.clear();
        debug!(dropped, capacity = self.capacity, "lru cache cleared");
    }

    /// Cross-checks the index, recency list and arena.
    ///
    /// O(n). Meant for tests and diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantError`] describing the first inconsistency found.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let len = self.order.len();
        if self.index.len() != len {
            return Err(InvariantError::new(format!(
                "index holds {} keys but recency list links {len} slots",
                self.index.len()
            )));
        }
        if self.arena.len() != len {
            return Err(InvariantError::new(format!(
                "arena holds {} entries but recency list links {len} slots",
                self.arena.len()
            )));
        }
        if len > self.capacity {
            return Err(InvariantError::new(format!(
                "size {len} exceeds capacity {}",
                self.capacity
            )));
        }

        let mut walked = 0usize;
        for id in self.order.iter() {
            walked += 1;
            if walked > len {
                return Err(InvariantError::new("recency list contains a cycle"));
            }
            let Some(entry) = self.arena.get(id) else {
                return Err(InvariantError::new(format!(
                    "recency list links free slot {id}"
                )));
            };
            if self.index.find(&entry.key) != Some(id) {
                return Err(InvariantError::new(format!(
                    "slot {id} is linked but not indexed"
                )));
            }
        }
        if walked != len {
            return Err(InvariantError::new(format!(
                "walked {walked} linked slots, expected {len}"
            )));
        }

        for (key, id) in self.index.iter() {
            if !self.order.is_linked(id) {
                return Err(InvariantError::new(format!(
                    "indexed slot {id} is not linked"
                )));
            }
            match self.arena.get(id) {
                Some(entry) if entry.key == *key => {},
                Some(_) => {
                    return Err(InvariantError::new(format!(
                        "slot {id} holds a different key than its index entry"
                    )))
                },
                None => {
                    return Err(InvariantError::new(format!("index points at free slot {id}")))
                },
            }
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.order.debug_validate_invariants();
        if let Err(err) = self.check_invariants() {
            panic!("{err}");
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V, S> LruCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        LruMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            evict_calls: self.metrics.evict_calls,
            evicted_entries: self.metrics.evicted_entries,
            erase_calls: self.metrics.erase_calls,
            erase_found: self.metrics.erase_found,
            clear_calls: self.metrics.clear_calls,
            pop_lru_calls: self.metrics.pop_lru_calls,
            pop_lru_found: self.metrics.pop_lru_found,
            touch_calls: self.metrics.touch_calls,
            touch_found: self.metrics.touch_found,
            peek_calls: self.metrics.peek_calls.get(),
            peek_found: self.metrics.peek_found.get(),
            contains_calls: self.metrics.contains_calls.get(),
            peek_lru_calls: self.metrics.peek_lru_calls.get(),
            peek_lru_found: self.metrics.peek_lru_found.get(),
            recency_rank_calls: self.metrics.recency_rank_calls.get(),
            recency_rank_found: self.metrics.recency_rank_found.get(),
            recency_rank_scan_steps: self.metrics.recency_rank_scan_steps.get(),
            cache_len: self.len(),
            capacity: self.capacity,
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V, S> MetricsSnapshotProvider<LruMetricsSnapshot> for LruCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    fn snapshot(&self) -> LruMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V, S> CoreCache<K, V> for LruCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    #[inline]
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        LruCache::insert(self, key, value)
    }

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        LruCache::get(self, key)
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        LruCache::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        LruCache::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        LruCache::clear(self)
    }
}

impl<K, V, S> MutableCache<K, V> for LruCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    #[inline]
    fn remove(&mut self, key: &K) -> Option<V> {
        LruCache::remove(self, key)
    }
}

impl<K, V, S> LruCacheTrait<K, V> for LruCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    fn pop_lru(&mut self) -> Option<(K, V)> {
        LruCache::pop_lru(self)
    }

    fn peek_lru(&self) -> Option<(&K, &V)> {
        LruCache::peek_lru(self)
    }

    fn touch(&mut self, key: &K) -> bool {
        LruCache::touch(self, key)
    }

    fn recency_rank(&self, key: &K) -> Option<usize> {
        LruCache::recency_rank(self, key)
    }
}

impl<K, V, S> Extend<(K, V)> for LruCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, S> fmt::Debug for LruCache<K, V, S>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Entries<'a, K, V, S>(&'a LruCache<K, V, S>);

        impl<K, V, S> fmt::Debug for Entries<'_, K, V, S>
        where
            K: Eq + Hash + Clone + fmt::Debug,
            V: fmt::Debug,
            S: BuildHasher,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_map().entries(self.0.iter()).finish()
            }
        }

        f.debug_struct("LruCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("entries", &Entries(self))
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ConcurrentLruCache
// ---------------------------------------------------------------------------

/// Thread-safe LRU cache: one [`LruCache`] behind a `parking_lot::Mutex`.
///
/// Every method takes the lock for exactly one O(1) cache operation (or one
/// O(n) walk for `recency_rank`). Values are returned by clone or through a
/// closure that runs under the lock. Cloning the handle shares the cache.
///
/// # Example
///
/// ```
/// use std::thread;
/// use loon::policy::lru::ConcurrentLruCache;
///
/// let cache: ConcurrentLruCache<u64, u64> = ConcurrentLruCache::new(1024);
/// let handles: Vec<_> = (0..4)
///     .map(|t| {
///         let cache = cache.clone();
///         thread::spawn(move || {
///             for i in 0..100 {
///                 cache.put(t * 100 + i, i);
///             }
///         })
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
/// assert_eq!(cache.size(), 400);
/// ```
#[cfg(feature = "concurrency")]
pub struct ConcurrentLruCache<K, V, S = FxBuildHasher> {
    inner: Arc<Mutex<LruCache<K, V, S>>>,
}

#[cfg(feature = "concurrency")]
impl<K, V, S> Clone for ConcurrentLruCache<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentLruCache<K, V, FxBuildHasher>
where
    K: Eq + Hash + Clone,
{
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self::from_cache(LruCache::new(capacity))
    }

    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        LruCache::try_new(capacity).map(Self::from_cache)
    }
}

#[cfg(feature = "concurrency")]
impl<K, V, S> ConcurrentLruCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    /// Wraps an existing cache, listener included.
    pub fn from_cache(cache: LruCache<K, V, S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    pub fn try_with_hasher(capacity: usize, hasher: S) -> Result<Self, ConfigError> {
        LruCache::try_with_hasher(capacity, hasher).map(Self::from_cache)
    }

    /// Installs `listener`. It runs under the cache lock and must not call
    /// back into this cache.
    pub fn with_eviction_listener<L>(self, listener: L) -> Self
    where
        L: EvictionListener<K, V> + Send + 'static,
    {
        self.inner.lock().set_eviction_listener(listener);
        self
    }

    /// Clones out the value for `key`, promoting it.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Runs `f` on the value for `key` under the lock, promoting it.
    pub fn get_with<Q, R, F>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> R,
    {
        self.inner.lock().get(key).map(f)
    }

    /// Runs `f` on the value for `key` without promoting it.
    pub fn peek_with<Q, R, F>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> R,
    {
        self.inner.lock().peek(key).map(f)
    }

    pub fn put(&self, key: K, value: V) {
        self.inner.lock().put(key, value);
    }

    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.lock().insert(key, value)
    }

    /// Builds the value before taking the lock; on `Err` the cache is not
    /// touched.
    pub fn try_put_with<E, F>(&self, key: K, make: F) -> Result<(), E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let value = make()?;
        self.inner.lock().put(key, value);
        Ok(())
    }

    /// Returns a clone of the value for `key`, inserting `make()` on a miss.
    ///
    /// `make` runs with the lock released. If another thread stores `key`
    /// in the meantime, its value is kept and the built one is dropped.
    pub fn get_or_insert_with<F>(&self, key: K, make: F) -> V
    where
        F: FnOnce() -> V,
        V: Clone,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = make();
        self.inner.lock().get_or_insert(key, value).clone()
    }

    pub fn erase<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().erase(key)
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().remove(key)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().contains(key)
    }

    pub fn touch<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().touch(key)
    }

    pub fn pop_lru(&self) -> Option<(K, V)> {
        self.inner.lock().pop_lru()
    }

    pub fn recency_rank<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().recency_rank(key)
    }

    pub fn size(&self) -> usize {
        self.inner.lock().size()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }
}

#[cfg(all(feature = "metrics", feature = "concurrency"))]
impl<K, V, S> ConcurrentLruCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

#[cfg(all(feature = "metrics", feature = "concurrency"))]
impl<K, V, S> MetricsSnapshotProvider<LruMetricsSnapshot> for ConcurrentLruCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    fn snapshot(&self) -> LruMetricsSnapshot {
        self.metrics_snapshot()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V, S> fmt::Debug for ConcurrentLruCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.lock();
        f.debug_struct("ConcurrentLruCache")
            .field("len", &cache.len())
            .field("capacity", &cache.capacity())
            .finish_non_exhaustive()
    }
}
