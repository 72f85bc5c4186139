#![no_main]

use std::sync::mpsc;

use libfuzzer_sys::fuzz_target;
use loon::policy::lru::LruCache;

// Fuzz arbitrary operation sequences on LruCache
//
// Checks the capacity bound, that put/get round-trip, that peek and contains
// leave order alone, that only full-cache inserts evict (and evict the LRU
// entry), and the structural invariants after every step.
fuzz_target!(|data: &[u8]| {
    let Some((&cap, data)) = data.split_first() else {
        return;
    };
    let capacity = usize::from(cap % 16) + 1;
    let (tx, evicted) = mpsc::channel();
    let mut cache: LruCache<u8, u8> =
        LruCache::new(capacity).with_eviction_listener(move |key: u8, value: u8| {
            let _ = tx.send((key, value));
        });

    for pair in data.chunks_exact(2) {
        let op = pair[0] % 8;
        let key = pair[1] % 32;
        let value = pair[0];

        match op {
            0 | 1 => {
                let was_full = cache.is_full();
                let was_present = cache.contains(&key);
                let lru = cache.peek_lru().map(|(k, v)| (*k, *v));
                let before = cache.size();
                cache.put(key, value);
                let victim = evicted.try_recv().ok();
                if was_full && !was_present {
                    assert_eq!(victim, lru);
                } else {
                    assert_eq!(victim, None);
                }
                assert_eq!(cache.peek_mru().map(|(k, v)| (*k, *v)), Some((key, value)));
                if was_present || was_full {
                    assert_eq!(cache.size(), before);
                } else {
                    assert_eq!(cache.size(), before + 1);
                }
            },
            2 => {
                let hit = cache.get(&key).copied();
                if let Some(v) = hit {
                    assert_eq!(cache.recency_rank(&key), Some(0));
                    assert_eq!(cache.peek(&key), Some(&v));
                }
            },
            3 => {
                let order: Vec<u8> = cache.keys().copied().collect();
                let _ = cache.peek(&key);
                let _ = cache.contains(&key);
                let _ = cache.peek_lru();
                assert!(cache.keys().copied().eq(order));
            },
            4 => {
                let was_present = cache.contains(&key);
                assert_eq!(cache.erase(&key), was_present);
                assert!(!cache.erase(&key));
                assert!(!cache.contains(&key));
            },
            5 => {
                let touched = cache.touch(&key);
                assert_eq!(touched, cache.contains(&key));
                if touched {
                    assert_eq!(cache.peek_mru().map(|(k, _)| *k), Some(key));
                }
            },
            6 => {
                let lru = cache.peek_lru().map(|(k, v)| (*k, *v));
                assert_eq!(cache.pop_lru(), lru);
            },
            7 => {
                if value % 8 == 0 {
                    cache.clear();
                    assert!(cache.is_empty());
                    assert!(evicted.try_recv().is_err());
                } else {
                    assert_eq!(cache.iter().len(), cache.size());
                }
            },
            _ => unreachable!(),
        }

        assert!(cache.size() <= cache.capacity());
        if let Err(err) = cache.check_invariants() {
            panic!("invariant violated: {err}");
        }
    }
});
