#![no_main]

use libfuzzer_sys::fuzz_target;
use loon::ds::{SlotArena, SlotId};

// Fuzz arbitrary operation sequences on a bounded SlotArena
//
// acquire / release / get / get_mut / is_occupied / iter / clear, with a
// capacity taken from the first byte so the full path is reachable.
fuzz_target!(|data: &[u8]| {
    let Some((&cap, data)) = data.split_first() else {
        return;
    };
    let capacity = usize::from(cap % 32) + 1;
    let mut arena: SlotArena<u32> = SlotArena::with_capacity(capacity);
    let mut live: Vec<(SlotId, u32)> = Vec::new();

    for pair in data.chunks_exact(2) {
        let op = pair[0] % 7;
        let value = u32::from(pair[1]);

        match op {
            0 => {
                // acquire
                match arena.acquire(value) {
                    Ok(id) => {
                        assert!(id.index() < capacity);
                        assert!(live.iter().all(|&(other, _)| other != id));
                        live.push((id, value));
                        assert_eq!(arena.get(id), Some(&value));
                    },
                    Err(rejected) => {
                        assert_eq!(live.len(), capacity);
                        assert!(arena.is_full());
                        assert_eq!(rejected.into_inner(), value);
                    },
                }
            },
            1 => {
                // release
                if !live.is_empty() {
                    let (id, expected) = live.swap_remove(value as usize % live.len());
                    assert_eq!(arena.release(id), Some(expected));
                    assert!(!arena.is_occupied(id));
                    assert_eq!(arena.release(id), None);
                }
            },
            2 => {
                // get on a possibly stale index
                let id = SlotId::new(value as usize % (capacity + 2));
                let expected = live.iter().find(|&&(other, _)| other == id).map(|(_, v)| v);
                assert_eq!(arena.get(id), expected);
            },
            3 => {
                // get_mut
                if !live.is_empty() {
                    let slot = value as usize % live.len();
                    let id = live[slot].0;
                    if let Some(v) = arena.get_mut(id) {
                        *v = value;
                        live[slot].1 = value;
                    }
                    assert_eq!(arena.get(id), Some(&value));
                }
            },
            4 => {
                // is_occupied
                let id = SlotId::new(value as usize % (capacity + 2));
                let expected = live.iter().any(|&(other, _)| other == id);
                assert_eq!(arena.is_occupied(id), expected);
            },
            5 => {
                // iter
                assert_eq!(arena.iter().count(), live.len());
                for (id, v) in arena.iter() {
                    assert!(live.contains(&(id, *v)));
                }
            },
            6 => {
                // clear
                arena.clear();
                live.clear();
                assert!(arena.is_empty());
            },
            _ => unreachable!(),
        }

        assert_eq!(arena.len(), live.len());
        assert_eq!(arena.capacity(), capacity);
        assert_eq!(arena.is_full(), live.len() == capacity);
    }
});
