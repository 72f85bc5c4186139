//! Fixed-capacity FIFO ring buffer.
//!
//! Capacity is a const generic, the storage is inline, and nothing allocates
//! after construction. When full, [`RingBuffer::push`] either rejects the new
//! element (default) or overwrites the oldest one (see
//! [`RingBuffer::with_overwrite`]).
//!
//! ```text
//!   read ─┐            ┌─ write
//!         ▼            ▼
//!   [ _ | 1 | 2 | 3 | _ | _ ]   len = 3, N = 6
//! ```
//!
//! ## Example Usage
//!
//! ```
//! use loon::ds::RingBuffer;
//!
//! let mut buffer: RingBuffer<i32, 4> = RingBuffer::new();
//! assert!(buffer.push(42));
//! assert!(buffer.push(43));
//! assert_eq!(buffer.pop(), Some(42));
//! ```
//!
//! A zero capacity fails to compile:
//!
//! ```compile_fail
//! use loon::ds::RingBuffer;
//! let buffer: RingBuffer<u8, 0> = RingBuffer::new();
//! ```

use std::fmt;

pub struct RingBuffer<T, const N: usize> {
    slots: [Option<T>; N],
    read: usize,
    write: usize,
    len: usize,
    overwrite: bool,
}

impl<T, const N: usize> RingBuffer<T, N> {
    const NON_ZERO: () = assert!(N > 0, "RingBuffer capacity must be greater than zero");

    /// Creates an empty buffer that rejects pushes when full.
    pub fn new() -> Self {
        Self::with_overwrite(false)
    }

    /// Creates an empty buffer. With `overwrite` set, a push into a full
    /// buffer drops the oldest element instead of failing.
    pub fn with_overwrite(overwrite: bool) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_ZERO;
        Self {
            slots: std::array::from_fn(|_| None),
            read: 0,
            write: 0,
            len: 0,
            overwrite,
        }
    }

    #[inline]
    fn advance(idx: usize) -> usize {
        if idx + 1 == N {
            0
        } else {
            idx + 1
        }
    }

    /// Appends `value` at the back.
    ///
    /// Returns `false` (and drops `value`) if the buffer is full and
    /// overwriting is disabled.
    #[inline]
    pub fn push(&mut self, value: T) -> bool {
        if self.is_full() {
            if !self.overwrite {
                return false;
            }
            // write == read here; the slot being replaced holds the oldest element
            self.read = Self::advance(self.read);
        } else {
            self.len += 1;
        }
        self.slots[self.write] = Some(value);
        self.write = Self::advance(self.write);
        true
    }

    /// Removes and returns the front (oldest) element.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let value = self.slots[self.read].take();
        self.read = Self::advance(self.read);
        self.len -= 1;
        value
    }

    /// Oldest element.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        self.slots[self.read].as_ref()
    }

    /// Newest element.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        let last = if self.write == 0 { N - 1 } else { self.write - 1 };
        self.slots[last].as_ref()
    }

    /// Drops the front element. Returns `false` if the buffer was empty.
    #[inline]
    pub fn discard(&mut self) -> bool {
        self.pop().is_some()
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Returns `true` if pushes into a full buffer overwrite the oldest element.
    #[inline]
    pub fn overwrites(&self) -> bool {
        self.overwrite
    }

    pub fn clear(&mut self) {
        while self.pop().is_some() {}
        self.read = 0;
        self.write = 0;
    }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).filter_map(move |offset| self.slots[(self.read + offset) % N].as_ref())
    }
}

impl<T, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for RingBuffer<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &N)
            .field("overwrite", &self.overwrite)
            .field("items", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_on_construction() {
        let buffer: RingBuffer<i32, 10> = RingBuffer::new();
        assert!(buffer.is_empty());
        assert!(!buffer.is_full());
        assert!(!buffer.overwrites());
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.capacity(), 10);
    }

    #[test]
    fn push_and_pop() {
        let mut buffer: RingBuffer<i32, 10> = RingBuffer::new();
        assert!(buffer.push(42));
        assert_eq!(buffer.len(), 1);
        assert!(!buffer.is_empty());
        assert_eq!(buffer.pop(), Some(42));
        assert!(buffer.is_empty());
        assert_eq!(buffer.pop(), None);
    }

    #[test]
    fn front_and_back() {
        let mut buffer: RingBuffer<i32, 10> = RingBuffer::new();
        assert_eq!(buffer.front(), None);
        assert_eq!(buffer.back(), None);
        buffer.push(1);
        buffer.push(2);
        buffer.push(3);
        assert_eq!(buffer.front(), Some(&1));
        assert_eq!(buffer.back(), Some(&3));
    }

    #[test]
    fn discard_until_empty() {
        let mut buffer: RingBuffer<i32, 10> = RingBuffer::new();
        buffer.push(1);
        buffer.push(2);

        assert!(buffer.discard());
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.front(), Some(&2));

        assert!(buffer.discard());
        assert!(buffer.is_empty());
        assert!(!buffer.discard());
    }

    #[test]
    fn rejects_push_when_full() {
        let mut buffer: RingBuffer<i32, 10> = RingBuffer::new();
        for i in 0..10 {
            assert!(buffer.push(i));
        }
        assert!(buffer.is_full());
        assert!(!buffer.push(100));
        assert_eq!(buffer.len(), 10);
        assert_eq!(buffer.front(), Some(&0));
        assert_eq!(buffer.back(), Some(&9));
    }

    #[test]
    fn overwrite_drops_oldest() {
        let mut buffer: RingBuffer<i32, 5> = RingBuffer::with_overwrite(true);
        for i in 0..5 {
            assert!(buffer.push(i));
        }
        assert!(buffer.push(100));
        assert!(buffer.is_full());
        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.front(), Some(&1));
        assert_eq!(buffer.back(), Some(&100));

        let drained: Vec<_> = std::iter::from_fn(|| buffer.pop()).collect();
        assert_eq!(drained, vec![1, 2, 3, 4, 100]);
    }

    #[test]
    fn wraps_around_many_times() {
        let mut buffer: RingBuffer<u32, 3> = RingBuffer::new();
        for i in 0..100 {
            assert!(buffer.push(i));
            assert!(buffer.push(i + 1000));
            assert_eq!(buffer.pop(), Some(i));
            assert_eq!(buffer.back(), Some(&(i + 1000)));
            assert_eq!(buffer.pop(), Some(i + 1000));
        }
        assert!(buffer.is_empty());
    }

    #[test]
    fn iter_runs_oldest_to_newest_across_wrap() {
        let mut buffer: RingBuffer<u8, 4> = RingBuffer::with_overwrite(true);
        for i in 0..6 {
            buffer.push(i);
        }
        let items: Vec<_> = buffer.iter().copied().collect();
        assert_eq!(items, vec![2, 3, 4, 5]);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.iter().count(), 0);
    }
}
