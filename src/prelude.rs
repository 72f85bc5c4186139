pub use crate::builder::LruBuilder;
pub use crate::ds::{RedisList, RingBuffer, ShardSelector};
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::LruMetricsSnapshot;
#[cfg(feature = "concurrency")]
pub use crate::policy::lru::ConcurrentLruCache;
pub use crate::policy::lru::LruCache;
#[cfg(feature = "concurrency")]
pub use crate::policy::sharded_lru::ShardedLruCache;
pub use crate::traits::{CoreCache, EvictionListener, LruCacheTrait, MutableCache};
