//! # Cache Traits
//!
//! Policy-agnostic interfaces implemented by [`LruCache`](crate::policy::lru::LruCache),
//! plus the [`EvictionListener`] hook the caches call when capacity forces an
//! entry out.
//!
//! ```text
//!   ┌─────────────────────────────────────────┐
//!   │            CoreCache<K, V>              │
//!   │                                         │
//!   │  insert(&mut, K, V) → Option<V>         │
//!   │  get(&mut, &K) → Option<&V>             │
//!   │  contains(&, &K) → bool                 │
//!   │  len / is_empty / capacity / clear      │
//!   └──────────────────┬──────────────────────┘
//!                      │
//!                      ▼
//!   ┌─────────────────────────────────────────┐
//!   │          MutableCache<K, V>             │
//!   │  remove(&K) → Option<V>                 │
//!   │  remove_batch(&[K])                     │
//!   └──────────────────┬──────────────────────┘
//!                      │
//!                      ▼
//!   ┌─────────────────────────────────────────┐
//!   │          LruCacheTrait<K, V>            │
//!   │  pop_lru() → (K, V)                     │
//!   │  peek_lru() → (&K, &V)                  │
//!   │  touch(&K) → bool                       │
//!   │  recency_rank(&K) → usize               │
//!   └─────────────────────────────────────────┘
//! ```
//!
//! Code written against these traits works with any implementation:
//!
//! ```
//! use loon::policy::lru::LruCache;
//! use loon::traits::CoreCache;
//!
//! fn warm<C: CoreCache<u64, String>>(cache: &mut C, entries: &[(u64, String)]) {
//!     for (key, value) in entries {
//!         cache.insert(*key, value.clone());
//!     }
//! }
//!
//! let mut cache = LruCache::new(100);
//! warm(&mut cache, &[(1, "one".to_string()), (2, "two".to_string())]);
//! assert_eq!(CoreCache::len(&cache), 2);
//! ```

/// Operations every cache supports.
pub trait CoreCache<K, V> {
    /// Inserts a key-value pair, returning the previous value if it existed.
    ///
    /// If the cache is at capacity, an entry may be evicted according to the
    /// cache's eviction policy before the new entry is inserted.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Gets a reference to a value by key.
    ///
    /// May update eviction order. Use [`contains`](Self::contains) to check
    /// existence without side effects.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Checks if a key exists without updating access state.
    fn contains(&self, key: &K) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;

    fn clear(&mut self);
}

/// Caches that allow removal of arbitrary keys.
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Removes a key, returning its value if it was present.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Removes each key in turn; results line up with `keys`.
    fn remove_batch(&mut self, keys: &[K]) -> Vec<Option<V>> {
        keys.iter().map(|key| self.remove(key)).collect()
    }
}

/// LRU-specific operations that respect access order.
///
/// # Example
///
/// ```
/// use loon::policy::lru::LruCache;
/// use loon::traits::{CoreCache, LruCacheTrait};
///
/// let mut cache: LruCache<u64, &str> = LruCache::new(3);
/// CoreCache::insert(&mut cache, 1, "first");
/// CoreCache::insert(&mut cache, 2, "second");
/// CoreCache::insert(&mut cache, 3, "third");
///
/// // Access key 1 to make it MRU; key 2 is now LRU
/// CoreCache::get(&mut cache, &1);
/// assert_eq!(LruCacheTrait::peek_lru(&cache).map(|(k, _)| *k), Some(2));
///
/// assert!(LruCacheTrait::touch(&mut cache, &2));
/// assert_eq!(LruCacheTrait::pop_lru(&mut cache).map(|(k, _)| k), Some(3));
/// ```
pub trait LruCacheTrait<K, V>: MutableCache<K, V> {
    /// Removes and returns the least recently used entry.
    fn pop_lru(&mut self) -> Option<(K, V)>;

    /// Peeks at the LRU entry without removing it or changing order.
    fn peek_lru(&self) -> Option<(&K, &V)>;

    /// Promotes an entry to MRU without reading it. Returns `false` when the
    /// key is absent.
    fn touch(&mut self, key: &K) -> bool;

    /// Recency rank of a key (0 = most recent). O(n).
    fn recency_rank(&self, key: &K) -> Option<usize>;
}

/// Receives entries evicted for capacity.
///
/// Called synchronously from inside `put`/`insert` with the owned key and
/// value, once the new entry is stored. Not called for explicit removal
/// (`erase`, `remove`, `pop_lru`) or `clear`.
///
/// A listener cannot borrow the cache that owns it, so it cannot re-enter
/// the cache. Closures implement the trait directly:
///
/// ```
/// use std::sync::mpsc;
///
/// use loon::policy::lru::LruCache;
///
/// let (tx, rx) = mpsc::channel();
/// let mut cache = LruCache::new(1).with_eviction_listener(move |key: u32, value: &'static str| {
///     let _ = tx.send((key, value));
/// });
/// cache.put(1, "a");
/// cache.put(2, "b");
/// assert_eq!(rx.try_recv(), Ok((1, "a")));
/// ```
pub trait EvictionListener<K, V> {
    fn on_evict(&mut self, key: K, value: V);
}

impl<K, V, F> EvictionListener<K, V> for F
where
    F: FnMut(K, V),
{
    #[inline]
    fn on_evict(&mut self, key: K, value: V) {
        self(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Vec-backed reference implementation; front is LRU.
    struct MockLruCache {
        data: Vec<(i32, String)>,
        capacity: usize,
    }

    impl CoreCache<i32, String> for MockLruCache {
        fn insert(&mut self, key: i32, value: String) -> Option<String> {
            let previous = self.remove(&key);
            if self.data.len() >= self.capacity {
                self.data.remove(0);
            }
            self.data.push((key, value));
            previous
        }

        fn get(&mut self, key: &i32) -> Option<&String> {
            let pos = self.data.iter().position(|(k, _)| k == key)?;
            let entry = self.data.remove(pos);
            self.data.push(entry);
            self.data.last().map(|(_, v)| v)
        }

        fn contains(&self, key: &i32) -> bool {
            self.data.iter().any(|(k, _)| k == key)
        }

        fn len(&self) -> usize {
            self.data.len()
        }

        fn capacity(&self) -> usize {
            self.capacity
        }

        fn clear(&mut self) {
            self.data.clear();
        }
    }

    impl MutableCache<i32, String> for MockLruCache {
        fn remove(&mut self, key: &i32) -> Option<String> {
            let pos = self.data.iter().position(|(k, _)| k == key)?;
            Some(self.data.remove(pos).1)
        }
    }

    #[test]
    fn remove_batch_lines_up_with_keys() {
        let mut cache = MockLruCache {
            data: Vec::new(),
            capacity: 4,
        };
        cache.insert(1, "one".to_string());
        cache.insert(2, "two".to_string());

        let removed = cache.remove_batch(&[2, 5, 1]);
        assert_eq!(
            removed,
            vec![Some("two".to_string()), None, Some("one".to_string())]
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_returns_previous_value() {
        let mut cache = MockLruCache {
            data: Vec::new(),
            capacity: 2,
        };

        assert_eq!(cache.insert(1, "first".to_string()), None);
        assert_eq!(
            cache.insert(1, "second".to_string()),
            Some("first".to_string())
        );
        assert_eq!(cache.get(&1), Some(&"second".to_string()));
    }

    #[test]
    fn closures_are_eviction_listeners() {
        let mut seen = Vec::new();
        {
            let mut listener = |key: u8, value: char| seen.push((key, value));
            listener.on_evict(1, 'a');
            listener.on_evict(2, 'b');
        }
        assert_eq!(seen, vec![(1, 'a'), (2, 'b')]);
    }

    struct Counting(usize);

    impl EvictionListener<u64, u64> for Counting {
        fn on_evict(&mut self, _key: u64, _value: u64) {
            self.0 += 1;
        }
    }

    #[test]
    fn struct_listener() {
        let mut counter = Counting(0);
        counter.on_evict(1, 1);
        assert_eq!(counter.0, 1);
    }
}
