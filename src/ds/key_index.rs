//! Key → slot index used by the arena-backed caches.
//!
//! A thin wrapper over `HashMap<K, SlotId, S>` that fixes the operation set
//! the caches rely on (`find`, `insert`, `remove`) and defaults the hasher to
//! `FxBuildHasher`. The map is sized for the cache capacity at construction so
//! steady-state inserts do not grow it.
//!
//! Lookups are expected O(1). Adversarial keys can still collide; callers
//! that face untrusted keys should supply a keyed hasher such as
//! `std::collections::hash_map::RandomState`.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use rustc_hash::FxBuildHasher;

use crate::ds::slot_arena::SlotId;

#[derive(Debug, Clone)]
pub struct KeyIndex<K, S = FxBuildHasher> {
    map: HashMap<K, SlotId, S>,
}

impl<K> KeyIndex<K, FxBuildHasher>
where
    K: Eq + Hash,
{
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, FxBuildHasher)
    }
}

impl<K, S> KeyIndex<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            map: HashMap::with_capacity_and_hasher(capacity, hasher),
        }
    }

    /// Returns the slot holding `key`, if any.
    #[inline]
    pub fn find<Q>(&self, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).copied()
    }

    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Associates `key` with `id`, returning the slot it replaced.
    #[inline]
    pub fn insert(&mut self, key: K, id: SlotId) -> Option<SlotId> {
        self.map.insert(key, id)
    }

    /// Drops the association for `key`. No-op when absent.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.remove(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn hasher(&self) -> &S {
        self.map.hasher()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, SlotId)> {
        self.map.iter().map(|(key, id)| (key, *id))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::RandomState;

    use super::*;

    #[test]
    fn find_insert_remove() {
        let mut index = KeyIndex::with_capacity(4);
        assert_eq!(index.find(&"a"), None);

        assert_eq!(index.insert("a", SlotId(0)), None);
        assert_eq!(index.insert("b", SlotId(1)), None);
        assert_eq!(index.find(&"a"), Some(SlotId(0)));
        assert!(index.contains(&"b"));
        assert_eq!(index.len(), 2);

        assert_eq!(index.remove(&"a"), Some(SlotId(0)));
        assert_eq!(index.remove(&"a"), None);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn insert_overwrites_existing_association() {
        let mut index = KeyIndex::with_capacity(2);
        index.insert(7u32, SlotId(0));
        assert_eq!(index.insert(7u32, SlotId(1)), Some(SlotId(0)));
        assert_eq!(index.find(&7), Some(SlotId(1)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn borrowed_lookups() {
        let mut index = KeyIndex::with_capacity(2);
        index.insert(String::from("key"), SlotId(3));
        assert_eq!(index.find("key"), Some(SlotId(3)));
        assert_eq!(index.remove("key"), Some(SlotId(3)));
        assert!(index.is_empty());
    }

    #[test]
    fn custom_hasher() {
        let mut index: KeyIndex<u64, RandomState> =
            KeyIndex::with_capacity_and_hasher(8, RandomState::new());
        for i in 0..8 {
            index.insert(i, SlotId(i as usize));
        }
        assert_eq!(index.find(&5), Some(SlotId(5)));
        index.clear();
        assert!(index.is_empty());
    }
}
