//! Error types for the loon library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when construction parameters are invalid
//!   (zero capacity, zero shards, fewer slots than shards).
//! - [`InvariantError`]: Returned by `check_invariants` diagnostics when the
//!   index, recency list and arena disagree.
//! - [`CapacityExhausted`]: Returned by [`SlotArena::acquire`] when no slot is
//!   free. Hands the rejected value back.
//! - [`EmptyList`]: Returned by [`RecencyList::pop_back`] on an empty list.
//!
//! Lookup misses are not errors; they are `None`.
//!
//! ## Example Usage
//!
//! ```
//! use loon::error::ConfigError;
//! use loon::policy::lru::LruCache;
//!
//! let cache: Result<LruCache<u64, String>, ConfigError> = LruCache::try_new(128);
//! assert!(cache.is_ok());
//!
//! let bad = LruCache::<u64, String>::try_new(0);
//! assert!(bad.is_err());
//! ```
//!
//! [`SlotArena::acquire`]: crate::ds::SlotArena::acquire
//! [`RecencyList::pop_back`]: crate::ds::RecencyList::pop_back

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by [`LruCache::check_invariants`](crate::policy::lru::LruCache::check_invariants).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when construction parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`LruCache::try_new`](crate::policy::lru::LruCache::try_new) and the
/// builder's `try_build*` methods.
///
/// # Example
///
/// ```
/// use loon::policy::lru::LruCache;
///
/// let err = LruCache::<u64, u64>::try_new(0).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// The error every cache constructor returns for `capacity == 0`.
    #[inline]
    pub fn invalid_capacity(capacity: usize) -> Self {
        Self(format!(
            "cache capacity must be greater than zero, got {capacity}"
        ))
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// CapacityExhausted
// ---------------------------------------------------------------------------

/// Error returned by [`SlotArena::acquire`](crate::ds::SlotArena::acquire)
/// when every slot is occupied. Owns the value that could not be stored.
#[derive(Clone, PartialEq, Eq)]
pub struct CapacityExhausted<T>(T);

impl<T> CapacityExhausted<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Returns the rejected value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for CapacityExhausted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CapacityExhausted(..)")
    }
}

impl<T> fmt::Display for CapacityExhausted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("slot arena has no free slot")
    }
}

impl<T> std::error::Error for CapacityExhausted<T> {}

// ---------------------------------------------------------------------------
// EmptyList
// ---------------------------------------------------------------------------

/// Error returned when popping from an empty
/// [`RecencyList`](crate::ds::RecencyList).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyList;

impl fmt::Display for EmptyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("recency list is empty")
    }
}

impl std::error::Error for EmptyList {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
