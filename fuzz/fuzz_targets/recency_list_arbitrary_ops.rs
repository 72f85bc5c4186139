#![no_main]

use std::collections::VecDeque;

use libfuzzer_sys::fuzz_target;
use loon::ds::{RecencyList, SlotId};

// Fuzz arbitrary operation sequences on RecencyList against a VecDeque model
// (front = MRU). Indices past capacity exercise the rejection paths.
fuzz_target!(|data: &[u8]| {
    let Some((&cap, data)) = data.split_first() else {
        return;
    };
    let capacity = usize::from(cap % 16) + 1;
    let mut list = RecencyList::with_capacity(capacity);
    let mut model: VecDeque<usize> = VecDeque::new();

    for pair in data.chunks_exact(2) {
        let op = pair[0] % 6;
        let index = usize::from(pair[1]) % (capacity + 2);
        let id = SlotId::new(index);
        let in_model = model.contains(&index);

        match op {
            0 => {
                let expected = index < capacity && !in_model;
                assert_eq!(list.push_front(id), expected);
                if expected {
                    model.push_front(index);
                }
            },
            1 => {
                assert_eq!(list.unlink(id), in_model);
                model.retain(|&i| i != index);
            },
            2 => {
                assert_eq!(list.move_to_front(id), in_model);
                if in_model {
                    model.retain(|&i| i != index);
                    model.push_front(index);
                }
            },
            3 => {
                let popped = list.pop_back().ok().map(SlotId::index);
                assert_eq!(popped, model.pop_back());
            },
            4 => {
                assert_eq!(list.is_linked(id), in_model);
            },
            5 => {
                list.clear();
                model.clear();
            },
            _ => unreachable!(),
        }

        assert_eq!(list.len(), model.len());
        assert_eq!(list.front().map(SlotId::index), model.front().copied());
        assert_eq!(list.back().map(SlotId::index), model.back().copied());
        assert!(list.iter().map(SlotId::index).eq(model.iter().copied()));
        assert!(list.iter_lru().map(SlotId::index).eq(model.iter().rev().copied()));
    }
});
