pub mod key_index;
pub mod recency_list;
pub mod redis_list;
pub mod ring_buffer;
pub mod shard;
pub mod slot_arena;
pub mod spsc;

pub use key_index::KeyIndex;
pub use recency_list::RecencyList;
pub use redis_list::RedisList;
pub use ring_buffer::RingBuffer;
pub use shard::ShardSelector;
pub use slot_arena::{SlotArena, SlotId};
