//! Double-ended list with Redis list-command semantics.
//!
//! Backed by a `VecDeque`, so pushes and pops at either end are O(1) and
//! `lrange` is O(range). Index arguments to `lrange` follow Redis: both ends
//! are inclusive and negative indices count back from the tail (`-1` is the
//! last element). Out-of-range bounds are clamped; an empty or inverted range
//! yields nothing.
//!
//! ## Example Usage
//!
//! ```
//! use loon::ds::RedisList;
//!
//! let mut list = RedisList::new();
//! list.rpush("hello");
//! list.rpush("world");
//! assert_eq!(list.lrange(0, -1), vec!["hello", "world"]);
//! assert_eq!(list.lpop(), Some("hello"));
//! ```

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisList<T> {
    items: VecDeque<T>,
}

impl<T> RedisList<T> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// `LPUSH`: prepends `value`, returns the new length.
    #[inline]
    pub fn lpush(&mut self, value: T) -> usize {
        self.items.push_front(value);
        self.items.len()
    }

    /// `RPUSH`: appends `value`, returns the new length.
    #[inline]
    pub fn rpush(&mut self, value: T) -> usize {
        self.items.push_back(value);
        self.items.len()
    }

    /// `LPOP`: removes the first element.
    #[inline]
    pub fn lpop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// `RPOP`: removes the last element.
    #[inline]
    pub fn rpop(&mut self) -> Option<T> {
        self.items.pop_back()
    }

    /// `LPOP key count`: removes up to `count` elements from the head, in
    /// list order.
    pub fn lpop_count(&mut self, count: usize) -> Vec<T> {
        let count = count.min(self.items.len());
        self.items.drain(..count).collect()
    }

    /// `RPOP key count`: removes up to `count` elements from the tail. The
    /// result keeps list order (`[.., n-2, n-1]`).
    pub fn rpop_count(&mut self, count: usize) -> Vec<T> {
        let count = count.min(self.items.len());
        let start = self.items.len() - count;
        self.items.drain(start..).collect()
    }

    /// Borrowing form of [`lrange`](Self::lrange).
    pub fn range(&self, start: isize, stop: isize) -> impl Iterator<Item = &T> + '_ {
        let bounds = self.resolve(start, stop);
        let (from, to) = bounds.unwrap_or((0, 0));
        self.items.range(from..to)
    }

    /// `LRANGE`: elements between `start` and `stop`, both inclusive.
    pub fn lrange(&self, start: isize, stop: isize) -> Vec<T>
    where
        T: Clone,
    {
        self.range(start, stop).cloned().collect()
    }

    /// `LLEN`.
    #[inline]
    pub fn llen(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }

    /// Maps Redis-style inclusive bounds to a half-open `[from, to)` range.
    fn resolve(&self, start: isize, stop: isize) -> Option<(usize, usize)> {
        let len = isize::try_from(self.items.len()).ok()?;
        let start = if start < 0 { len + start } else { start };
        let stop = if stop < 0 { len + stop } else { stop };
        if start > stop || start >= len || stop < 0 {
            return None;
        }
        let from = start.max(0) as usize;
        let to = stop.min(len - 1) as usize + 1;
        Some((from, to))
    }
}

impl<T> Default for RedisList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for RedisList<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items: VecDeque::from(items),
        }
    }
}

impl<T> FromIterator<T> for RedisList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<T> for RedisList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_to(n: i32) -> RedisList<i32> {
        (1..=n).collect()
    }

    #[test]
    fn empty_on_construction() {
        let list: RedisList<i32> = RedisList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert_eq!(list.llen(), 0);
    }

    #[test]
    fn push_returns_new_length() {
        let mut list = RedisList::new();
        assert_eq!(list.lpush(1), 1);
        assert_eq!(list.lpush(2), 2);
        assert_eq!(list.rpush(3), 3);
        assert_eq!(list.lrange(0, -1), vec![2, 1, 3]);
    }

    #[test]
    fn lpop_and_rpop() {
        let mut list = RedisList::new();
        list.lpush(1);
        list.lpush(2);
        assert_eq!(list.lpop(), Some(2));
        assert_eq!(list.rpop(), Some(1));
        assert_eq!(list.lpop(), None);
        assert_eq!(list.rpop(), None);
    }

    #[test]
    fn pop_count_keeps_list_order() {
        let mut list = one_to(3);
        assert_eq!(list.lpop_count(2), vec![1, 2]);
        assert_eq!(list.len(), 1);

        let mut list = one_to(3);
        assert_eq!(list.rpop_count(2), vec![2, 3]);
        assert_eq!(list.len(), 1);

        let mut list = one_to(2);
        assert_eq!(list.rpop_count(10), vec![1, 2]);
        assert!(list.lpop_count(5).is_empty());
    }

    #[test]
    fn lrange_positive_and_negative() {
        let list = one_to(4);
        assert_eq!(list.lrange(1, 2), vec![2, 3]);
        assert_eq!(list.lrange(-2, -1), vec![3, 4]);
        assert_eq!(list.lrange(0, -1), vec![1, 2, 3, 4]);
        assert_eq!(list.lrange(-100, 1), vec![1, 2]);
        assert_eq!(list.lrange(2, 100), vec![3, 4]);
    }

    #[test]
    fn lrange_invalid_ranges_are_empty() {
        let list = one_to(2);
        assert!(list.lrange(5, 10).is_empty());
        assert!(list.lrange(1, 0).is_empty());
        assert!(list.lrange(0, -5).is_empty());

        let empty: RedisList<i32> = RedisList::new();
        assert!(empty.lrange(0, -1).is_empty());
    }

    #[test]
    fn construction_from_vec() {
        let list = RedisList::from(vec![1, 2, 3]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.lrange(0, -1), vec![1, 2, 3]);
        let borrowed: Vec<_> = list.range(0, 0).collect();
        assert_eq!(borrowed, vec![&1]);
    }
}
