//! Session store implementations

mod record_store;
mod traits;

pub use record_store::{MemoryStore, RecordStore, StoredValue, TOMBSTONE};
pub use traits::{SessionStore, TouchOutcome};

#[cfg(feature = "redis-store")]
mod redis_store;

#[cfg(feature = "redis-store")]
pub use redis_store::RedisStore;
