//! loon: low-latency in-memory data structures.
//!
//! The centrepiece is an LRU cache built on a preallocated slot arena with
//! integer-indexed recency links ([`policy::lru::LruCache`]), with mutex and
//! sharded wrappers for shared use. Alongside it: a const-capacity ring
//! buffer, a lock-free SPSC queue and a Redis-style list.

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;
