//! Deterministic key-to-shard mapping for sharded caches.
//!
//! ```text
//!   key ──► FxHasher(seed, key) ──► h: u64 ──► (h * shards) >> 64 ──► shard
//!
//!   ┌─────────┬─────────┬─────────┬─────────┐
//!   │ Shard 0 │ Shard 1 │ Shard 2 │ Shard 3 │
//!   └─────────┴─────────┴─────────┴─────────┘
//! ```
//!
//! The reduction takes the high bits of a 64x64 multiply rather than `h %
//! shards`, which avoids a division on the hot path and does not depend on
//! the weak low bits of a multiplicative hash.
//!
//! The seed is hashed before the key so that shard placement is decorrelated
//! from the unseeded `FxBuildHasher` used by each shard's index.
//!
//! ## Example Usage
//!
//! ```
//! use loon::ds::ShardSelector;
//!
//! let selector = ShardSelector::new(4, 0);
//!
//! let shard = selector.shard_for_key(&"user:123");
//! assert!(shard < 4);
//! assert_eq!(selector.shard_for_key(&"user:123"), shard);
//! ```

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// Deterministic shard selector using a seeded hash.
///
/// The same `(key, seed, shards)` tuple always produces the same shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector for `shards` shards. The shard count is clamped to
    /// at least 1.
    ///
    /// ```
    /// use loon::ds::ShardSelector;
    ///
    /// assert_eq!(ShardSelector::new(16, 0).shard_count(), 16);
    /// assert_eq!(ShardSelector::new(0, 0).shard_count(), 1);
    /// ```
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: shards.max(1),
            seed,
        }
    }

    #[inline]
    pub fn shard_count(&self) -> usize {
        self.shards
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Maps a key to a shard index in `[0, shards)`.
    #[inline]
    pub fn shard_for_key<K: Hash + ?Sized>(&self, key: &K) -> usize {
        if self.shards == 1 {
            return 0;
        }
        let mut hasher = FxHasher::default();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        let hash = hasher.finish();
        ((u128::from(hash) * self.shards as u128) >> 64) as usize
    }
}

impl Default for ShardSelector {
    /// Single shard, seed 0.
    fn default() -> Self {
        Self::new(1, 0)
    }
}
