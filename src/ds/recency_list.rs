//! Index-linked recency list over arena slots.
//!
//! Links are plain `usize` indices stored in an array parallel to the
//! [`SlotArena`](crate::ds::SlotArena): `links[i]` holds the neighbours of slot
//! `i`. Two extra entries at the end of the array act as head and tail
//! sentinels, so linking and unlinking never branch on "first" or "last".
//!
//! ## Architecture
//!
//! ```text
//!   links (capacity = 3, HEAD = 3, TAIL = 4)
//!   ┌───────┬──────────────────────┐
//!   │ index │ Link { prev, next }  │
//!   ├───────┼──────────────────────┤
//!   │   0   │ { prev: 2, next: 4 } │   slot 0 = LRU
//!   │   1   │ { prev: NIL, next: NIL } │   slot 1 unlinked
//!   │   2   │ { prev: 3, next: 0 } │   slot 2 = MRU
//!   │ HEAD  │ { prev: NIL, next: 2 } │
//!   │ TAIL  │ { prev: 0, next: NIL } │
//!   └───────┴──────────────────────┘
//!
//!   HEAD ─► [2] ◄──► [0] ◄── TAIL
//!           MRU      LRU
//! ```
//!
//! ## Performance
//! - `push_front` / `unlink` / `move_to_front` / `pop_back`: O(1)
//! - `iter`: O(n)
//! - `clear`: O(capacity)
//!
//! `debug_validate_invariants()` is available in debug/test builds.

use crate::ds::slot_arena::SlotId;
use crate::error::EmptyList;

const NIL: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Link {
    prev: usize,
    next: usize,
}

impl Link {
    const UNLINKED: Link = Link {
        prev: NIL,
        next: NIL,
    };
}

/// Doubly linked MRU → LRU ordering of slot ids.
#[derive(Debug, Clone)]
pub struct RecencyList {
    links: Vec<Link>,
    head: usize,
    tail: usize,
    len: usize,
}

impl RecencyList {
    /// Creates an empty list able to order slots `0..capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        let head = capacity;
        let tail = capacity + 1;
        let mut links = vec![Link::UNLINKED; capacity + 2];
        links[head].next = tail;
        links[tail].prev = head;
        Self {
            links,
            head,
            tail,
            len: 0,
        }
    }

    /// Number of linked slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots the list can order.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.head
    }

    /// Returns `true` if `id` is currently in the list.
    #[inline]
    pub fn is_linked(&self, id: SlotId) -> bool {
        id.0 < self.head && self.links[id.0].prev != NIL
    }

    /// Most recently used slot.
    #[inline]
    pub fn front(&self) -> Option<SlotId> {
        let first = self.links[self.head].next;
        (first != self.tail).then_some(SlotId(first))
    }

    /// Least recently used slot.
    #[inline]
    pub fn back(&self) -> Option<SlotId> {
        let last = self.links[self.tail].prev;
        (last != self.head).then_some(SlotId(last))
    }

    /// Links `id` at the MRU end. Returns `false` if `id` is out of range or
    /// already linked.
    #[inline]
    pub fn push_front(&mut self, id: SlotId) -> bool {
        if id.0 >= self.head || self.links[id.0].prev != NIL {
            return false;
        }
        let first = self.links[self.head].next;
        self.links[id.0] = Link {
            prev: self.head,
            next: first,
        };
        self.links[first].prev = id.0;
        self.links[self.head].next = id.0;
        self.len += 1;
        true
    }

    /// Removes `id` from wherever it sits, reconnecting its neighbours.
    /// Returns `false` if `id` was not linked.
    #[inline]
    pub fn unlink(&mut self, id: SlotId) -> bool {
        if !self.is_linked(id) {
            return false;
        }
        let Link { prev, next } = self.links[id.0];
        self.links[prev].next = next;
        self.links[next].prev = prev;
        self.links[id.0] = Link::UNLINKED;
        self.len -= 1;
        true
    }

    /// Promotes a linked slot to the MRU end. Returns `false` if `id` is not
    /// linked.
    #[inline]
    pub fn move_to_front(&mut self, id: SlotId) -> bool {
        if !self.is_linked(id) {
            return false;
        }
        if self.links[self.head].next == id.0 {
            return true;
        }
        self.unlink(id);
        self.push_front(id)
    }

    /// Unlinks and returns the LRU slot.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyList`] when no slot is linked.
    #[inline]
    pub fn pop_back(&mut self) -> Result<SlotId, EmptyList> {
        let id = self.back().ok_or(EmptyList)?;
        self.unlink(id);
        Ok(id)
    }

    /// Unlinks every slot.
    pub fn clear(&mut self) {
        self.links.fill(Link::UNLINKED);
        self.links[self.head].next = self.tail;
        self.links[self.tail].prev = self.head;
        self.len = 0;
    }

    /// Iterates slot ids from MRU to LRU.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            current: self.links[self.head].next,
            remaining: self.len,
        }
    }

    /// Iterates slot ids from LRU to MRU.
    pub fn iter_lru(&self) -> IterLru<'_> {
        IterLru {
            list: self,
            current: self.links[self.tail].prev,
            remaining: self.len,
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.links.len(), self.head + 2);
        assert_eq!(self.links[self.head].prev, NIL);
        assert_eq!(self.links[self.tail].next, NIL);

        let mut seen = vec![false; self.head];
        let mut count = 0usize;
        let mut prev = self.head;
        let mut current = self.links[self.head].next;

        while current != self.tail {
            assert!(current < self.head, "link {current} points outside slot range");
            assert!(!seen[current], "slot {current} linked twice");
            seen[current] = true;
            assert_eq!(self.links[current].prev, prev);
            prev = current;
            current = self.links[current].next;
            count += 1;
            assert!(count <= self.len);
        }

        assert_eq!(self.links[self.tail].prev, prev);
        assert_eq!(count, self.len);
        for (idx, linked) in seen.iter().enumerate() {
            if !linked {
                assert_eq!(self.links[idx], Link::UNLINKED);
            }
        }
    }
}

/// MRU → LRU iterator over slot ids.
pub struct Iter<'a> {
    list: &'a RecencyList,
    current: usize,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = SlotId;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.current == self.list.tail {
            return None;
        }
        let id = SlotId(self.current);
        self.current = self.list.links[self.current].next;
        self.remaining -= 1;
        Some(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// LRU → MRU iterator over slot ids.
pub struct IterLru<'a> {
    list: &'a RecencyList,
    current: usize,
    remaining: usize,
}

impl Iterator for IterLru<'_> {
    type Item = SlotId;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.current == self.list.head {
            return None;
        }
        let id = SlotId(self.current);
        self.current = self.list.links[self.current].prev;
        self.remaining -= 1;
        Some(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for IterLru<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &RecencyList) -> Vec<usize> {
        list.iter().map(SlotId::index).collect()
    }

    #[test]
    fn recency_list_basic_ops() {
        let mut list = RecencyList::with_capacity(4);
        assert!(list.push_front(SlotId(0)));
        assert!(list.push_front(SlotId(1)));
        assert!(list.push_front(SlotId(2)));

        assert_eq!(list.front(), Some(SlotId(2)));
        assert_eq!(list.back(), Some(SlotId(0)));
        assert_eq!(list.len(), 3);

        assert!(list.move_to_front(SlotId(0)));
        assert_eq!(ids(&list), vec![0, 2, 1]);

        assert!(list.unlink(SlotId(2)));
        assert_eq!(ids(&list), vec![0, 1]);

        assert_eq!(list.pop_back(), Ok(SlotId(1)));
        assert_eq!(list.pop_back(), Ok(SlotId(0)));
        assert_eq!(list.pop_back(), Err(EmptyList));
        assert!(list.is_empty());
        list.debug_validate_invariants();
    }

    #[test]
    fn push_front_rejects_linked_and_out_of_range() {
        let mut list = RecencyList::with_capacity(2);
        assert!(list.push_front(SlotId(1)));
        assert!(!list.push_front(SlotId(1)));
        assert!(!list.push_front(SlotId(2)));
        assert!(!list.push_front(SlotId(usize::MAX - 1)));
        assert_eq!(list.len(), 1);
        list.debug_validate_invariants();
    }

    #[test]
    fn unlink_and_move_on_unlinked_slot_are_noops() {
        let mut list = RecencyList::with_capacity(3);
        assert!(!list.unlink(SlotId(0)));
        assert!(!list.move_to_front(SlotId(0)));
        assert!(!list.is_linked(SlotId(5)));
        assert!(list.is_empty());
    }

    #[test]
    fn move_to_front_of_head_keeps_order() {
        let mut list = RecencyList::with_capacity(3);
        for i in 0..3 {
            list.push_front(SlotId(i));
        }
        assert!(list.move_to_front(SlotId(2)));
        assert_eq!(ids(&list), vec![2, 1, 0]);
        assert!(list.move_to_front(SlotId(1)));
        assert_eq!(ids(&list), vec![1, 2, 0]);
        list.debug_validate_invariants();
    }

    #[test]
    fn unlink_middle_and_ends() {
        let mut list = RecencyList::with_capacity(3);
        for i in 0..3 {
            list.push_front(SlotId(i));
        }
        assert!(list.unlink(SlotId(1)));
        assert_eq!(ids(&list), vec![2, 0]);
        assert!(list.unlink(SlotId(2)));
        assert_eq!(list.front(), Some(SlotId(0)));
        assert_eq!(list.back(), Some(SlotId(0)));
        assert!(list.unlink(SlotId(0)));
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        list.debug_validate_invariants();
    }

    #[test]
    fn iter_lru_is_reverse_of_iter() {
        let mut list = RecencyList::with_capacity(5);
        for i in [3, 1, 4, 0] {
            list.push_front(SlotId(i));
        }
        let forward: Vec<_> = list.iter().collect();
        let mut backward: Vec<_> = list.iter_lru().collect();
        backward.reverse();
        assert_eq!(forward, backward);
        assert_eq!(list.iter().len(), 4);
    }

    #[test]
    fn clear_resets_sentinels() {
        let mut list = RecencyList::with_capacity(3);
        list.push_front(SlotId(0));
        list.push_front(SlotId(1));
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert!(!list.is_linked(SlotId(0)));
        assert!(list.push_front(SlotId(0)));
        list.debug_validate_invariants();
    }

    #[test]
    fn zero_capacity_list_is_always_empty() {
        let mut list = RecencyList::with_capacity(0);
        assert!(!list.push_front(SlotId(0)));
        assert_eq!(list.pop_back(), Err(EmptyList));
        assert_eq!(list.iter().count(), 0);
        list.debug_validate_invariants();
    }
}
