//! Preallocated slot arena with a free list.
//!
//! All slots are allocated up front by [`SlotArena::with_capacity`]; afterwards
//! `acquire` and `release` only move values in and out of existing slots and
//! push/pop indices on the free list. No operation reallocates.
//!
//! ```text
//!   slots:     [ Some(a) | None | Some(c) | None ]
//!   free_list: [ 3, 1 ]            (top of stack = next slot handed out)
//! ```
//!
//! A [`SlotId`] is the index of a slot and stays valid for the slot's
//! occupied lifetime. Released indices are recycled LIFO so hot slots stay
//! in cache.

use std::fmt;

use crate::error::CapacityExhausted;

/// Stable handle to an occupied slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    /// Creates a handle from a raw slot index.
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw slot index.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Fixed-capacity arena of `Option<T>` slots.
#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Option<T>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<T> SlotArena<T> {
    /// Creates an arena with `capacity` free slots.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            free_list: (0..capacity).rev().collect(),
            len: 0,
        }
    }

    /// Moves `value` into a free slot and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityExhausted`] carrying `value` back when every slot is
    /// occupied.
    #[inline]
    pub fn acquire(&mut self, value: T) -> Result<SlotId, CapacityExhausted<T>> {
        let Some(idx) = self.free_list.pop() else {
            return Err(CapacityExhausted::new(value));
        };
        debug_assert!(self.slots[idx].is_none(), "free list handed out occupied slot {idx}");
        self.slots[idx] = Some(value);
        self.len += 1;
        Ok(SlotId(idx))
    }

    /// Frees the slot and moves its value out. Returns `None` if `id` is out
    /// of range or already free.
    #[inline]
    pub fn release(&mut self, id: SlotId) -> Option<T> {
        let value = self.slots.get_mut(id.0)?.take()?;
        self.free_list.push(id.0);
        self.len -= 1;
        Some(value)
    }

    #[inline]
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Returns `true` if `id` names an occupied slot.
    #[inline]
    pub fn is_occupied(&self, id: SlotId) -> bool {
        matches!(self.slots.get(id.0), Some(Some(_)))
    }

    /// Number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total number of slots, occupied or free.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.free_list.is_empty()
    }

    /// Drops every stored value and returns all slots to the free list.
    /// Keeps the allocation.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.free_list.clear();
        self.free_list.extend((0..self.slots.len()).rev());
        self.len = 0;
    }

    /// Iterates occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|value| (SlotId(idx), value)))
    }
}
