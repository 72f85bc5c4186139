//! Bounded lock-free single-producer single-consumer queue.
//!
//! [`channel`] returns a [`Producer`] / [`Consumer`] pair sharing a ring of
//! `N + 1` slots; one slot is always left empty so that `head == tail` means
//! empty and `tail + 1 == head` means full without a separate counter.
//!
//! ```text
//!          head (consumer)        tail (producer)
//!             ▼                      ▼
//!   [ _ | _ | a | b | c | _ | _ | _ ]      N = 7, 8 slots
//! ```
//!
//! The producer publishes a slot with a `Release` store of `tail`; the
//! consumer observes it with an `Acquire` load, and symmetrically for `head`.
//! Each index has a single writer, so neither side needs read-modify-write
//! atomics. `head` and `tail` live on separate cache lines.
//!
//! Both handles take `&mut self`, which statically enforces one producer and
//! one consumer.
//!
//! ## Example Usage
//!
//! ```
//! use loon::ds::spsc;
//!
//! let (mut tx, mut rx) = spsc::channel::<u64, 3>();
//! tx.push(1).unwrap();
//! tx.push(2).unwrap();
//! tx.push(3).unwrap();
//! assert!(tx.push(4).is_err());
//!
//! assert_eq!(rx.pop(), Some(1));
//! ```

use std::cell::UnsafeCell;
use std::fmt;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_utils::CachePadded;

/// Creates a queue holding up to `N` elements.
///
/// ```compile_fail
/// let (_tx, _rx) = loon::ds::spsc::channel::<u8, 0>();
/// ```
pub fn channel<T, const N: usize>() -> (Producer<T, N>, Consumer<T, N>) {
    let shared = Arc::new(Shared::<T, N>::new());
    (
        Producer {
            shared: Arc::clone(&shared),
        },
        Consumer { shared },
    )
}

struct Shared<T, const N: usize> {
    /// Next slot the consumer reads. Written only by the consumer.
    head: CachePadded<AtomicUsize>,
    /// Next slot the producer writes. Written only by the producer.
    tail: CachePadded<AtomicUsize>,
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
}

// SAFETY: a slot is written only by the producer while it lies outside
// [head, tail) and read only by the consumer while it lies inside; the
// acquire/release pairs on head and tail order those accesses.
unsafe impl<T: Send, const N: usize> Sync for Shared<T, N> {}
unsafe impl<T: Send, const N: usize> Send for Shared<T, N> {}

impl<T, const N: usize> Shared<T, N> {
    const SLOTS: usize = {
        assert!(N > 0, "SPSC queue capacity must be greater than zero");
        N + 1
    };

    fn new() -> Self {
        let slots = (0..Self::SLOTS)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect();
        Self {
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            slots,
        }
    }

    #[inline]
    fn next(idx: usize) -> usize {
        if idx + 1 == Self::SLOTS {
            0
        } else {
            idx + 1
        }
    }

    fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    fn is_full(&self) -> bool {
        Self::next(self.tail.load(Ordering::Acquire)) == self.head.load(Ordering::Acquire)
    }

    fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        if tail >= head {
            tail - head
        } else {
            Self::SLOTS - head + tail
        }
    }
}

impl<T, const N: usize> Drop for Shared<T, N> {
    fn drop(&mut self) {
        let mut head = *self.head.get_mut();
        let tail = *self.tail.get_mut();
        while head != tail {
            // SAFETY: slots in [head, tail) were initialised by the producer
            // and never read by the consumer.
            unsafe { self.slots[head].get_mut().assume_init_drop() };
            head = Self::next(head);
        }
    }
}

/// Returned by [`Producer::push`] when the queue is full. Carries the value
/// back to the caller.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// Returns the value that could not be pushed.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Full(..)")
    }
}

impl<T> fmt::Display for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("spsc queue is full")
    }
}

impl<T> std::error::Error for Full<T> {}

/// Writing half of an SPSC queue.
pub struct Producer<T, const N: usize> {
    shared: Arc<Shared<T, N>>,
}

impl<T, const N: usize> Producer<T, N> {
    /// Appends `value`, or hands it back in [`Full`] if `N` elements are
    /// already queued.
    #[inline]
    pub fn push(&mut self, value: T) -> Result<(), Full<T>> {
        let shared = &*self.shared;
        let tail = shared.tail.load(Ordering::Relaxed);
        let next = Shared::<T, N>::next(tail);
        if next == shared.head.load(Ordering::Acquire) {
            return Err(Full(value));
        }
        // SAFETY: `tail` is outside [head, tail) so the consumer is not
        // touching it, and we are the only producer.
        unsafe { (*shared.slots[tail].get()).write(value) };
        shared.tail.store(next, Ordering::Release);
        Ok(())
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        self.shared.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.shared.is_full()
    }

    /// Snapshot of the queued element count.
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// Returns `true` once the consumer has been dropped.
    pub fn is_abandoned(&self) -> bool {
        Arc::strong_count(&self.shared) == 1
    }
}

impl<T, const N: usize> fmt::Debug for Producer<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("capacity", &N)
            .field("len", &self.len())
            .finish()
    }
}

/// Reading half of an SPSC queue.
pub struct Consumer<T, const N: usize> {
    shared: Arc<Shared<T, N>>,
}

impl<T, const N: usize> Consumer<T, N> {
    /// Removes the oldest element, or returns `None` if the queue is empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        let shared = &*self.shared;
        let head = shared.head.load(Ordering::Relaxed);
        if head == shared.tail.load(Ordering::Acquire) {
            return None;
        }
        // SAFETY: `head` is inside [head, tail), so the producer initialised
        // it and released it before advancing tail.
        let value = unsafe { (*shared.slots[head].get()).assume_init_read() };
        shared.head.store(Shared::<T, N>::next(head), Ordering::Release);
        Some(value)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        self.shared.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.shared.is_full()
    }

    /// Snapshot of the queued element count.
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// Returns `true` once the producer has been dropped.
    pub fn is_abandoned(&self) -> bool {
        Arc::strong_count(&self.shared) == 1
    }
}

impl<T, const N: usize> fmt::Debug for Consumer<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("capacity", &N)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[test]
    fn pop_empty() {
        let (tx, mut rx) = channel::<i32, 3>();
        assert!(rx.is_empty());
        assert!(tx.is_empty());
        assert_eq!(rx.pop(), None);
    }

    #[test]
    fn push_until_full() {
        let (mut tx, rx) = channel::<i32, 3>();
        assert!(tx.push(1).is_ok());
        assert!(tx.push(2).is_ok());
        assert!(tx.push(3).is_ok());
        assert!(tx.is_full());
        assert!(rx.is_full());
        assert_eq!(tx.push(4).unwrap_err().into_inner(), 4);
        assert_eq!(tx.len(), 3);
        assert_eq!(tx.capacity(), 3);
    }

    #[test]
    fn push_and_pop_in_order_across_wrap() {
        let (mut tx, mut rx) = channel::<u32, 2>();
        for i in 0..50 {
            tx.push(i).unwrap();
            tx.push(i + 100).unwrap();
            assert_eq!(rx.pop(), Some(i));
            assert_eq!(rx.pop(), Some(i + 100));
            assert_eq!(rx.pop(), None);
        }
        assert_eq!(rx.len(), 0);
    }

    #[test]
    fn abandoned_flags() {
        let (tx, rx) = channel::<u8, 1>();
        assert!(!tx.is_abandoned());
        drop(rx);
        assert!(tx.is_abandoned());
    }

    #[test]
    fn drop_releases_queued_values() {
        static DROPS: AtomicUsize = AtomicUsize::new(0);

        struct Tracked;
        impl Drop for Tracked {
            fn drop(&mut self) {
                DROPS.fetch_add(1, Ordering::SeqCst);
            }
        }

        let (mut tx, mut rx) = channel::<Tracked, 4>();
        for _ in 0..3 {
            assert!(tx.push(Tracked).is_ok());
        }
        drop(rx.pop());
        assert_eq!(DROPS.load(Ordering::SeqCst), 1);
        drop(tx);
        drop(rx);
        assert_eq!(DROPS.load(Ordering::SeqCst), 3);
    }
}
