/// Point-in-time copy of an LRU cache's counters plus size gauges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LruMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,

    pub evict_calls: u64,
    pub evicted_entries: u64,

    pub erase_calls: u64,
    pub erase_found: u64,
    pub clear_calls: u64,

    pub pop_lru_calls: u64,
    pub pop_lru_found: u64,
    pub touch_calls: u64,
    pub touch_found: u64,

    pub peek_calls: u64,
    pub peek_found: u64,
    pub contains_calls: u64,
    pub peek_lru_calls: u64,
    pub peek_lru_found: u64,
    pub recency_rank_calls: u64,
    pub recency_rank_found: u64,
    pub recency_rank_scan_steps: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
}

impl LruMetricsSnapshot {
    /// Fraction of `get` calls that hit, or `0.0` before the first call.
    pub fn hit_rate(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }

    /// Adds `other` into `self`. Used to fold per-shard snapshots.
    pub fn accumulate(&mut self, other: &Self) {
        self.get_calls += other.get_calls;
        self.get_hits += other.get_hits;
        self.get_misses += other.get_misses;
        self.insert_calls += other.insert_calls;
        self.insert_updates += other.insert_updates;
        self.insert_new += other.insert_new;
        self.evict_calls += other.evict_calls;
        self.evicted_entries += other.evicted_entries;
        self.erase_calls += other.erase_calls;
        self.erase_found += other.erase_found;
        self.clear_calls += other.clear_calls;
        self.pop_lru_calls += other.pop_lru_calls;
        self.pop_lru_found += other.pop_lru_found;
        self.touch_calls += other.touch_calls;
        self.touch_found += other.touch_found;
        self.peek_calls += other.peek_calls;
        self.peek_found += other.peek_found;
        self.contains_calls += other.contains_calls;
        self.peek_lru_calls += other.peek_lru_calls;
        self.peek_lru_found += other.peek_lru_found;
        self.recency_rank_calls += other.recency_rank_calls;
        self.recency_rank_found += other.recency_rank_found;
        self.recency_rank_scan_steps += other.recency_rank_scan_steps;
        self.cache_len += other.cache_len;
        self.capacity += other.capacity;
    }
}
