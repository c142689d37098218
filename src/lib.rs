//! # connect-redis-store
//!
//! Session store that persists express-session records in Redis using the
//! same layout as Node.js connect-redis, so Rust and Node.js applications can
//! share one session key space.
//!
//! ## Features
//!
//! - **Connect-redis compatible storage**: `prefix + id` keys holding JSON, with the TTL
//!   taken from the cookie expiry, a fixed default, or a callback
//! - **Full store interface**: get, set, touch, destroy, clear, length, ids, all
//! - **Non-blocking enumeration**: bulk operations walk the key space with `SCAN`, never `KEYS`
//! - **Optional tombstones**: destroyed sessions cannot be resurrected by late writes, and
//!   concurrent writes are merged
//! - **Pluggable clients and serializers**: Redis via the `redis` crate, or in memory
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use connect_redis_store::{RedisStore, SessionData, SessionStore, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> connect_redis_store::Result<()> {
//!     let config = StoreConfig::new().with_prefix("sess:").with_ttl(3600);
//!     let store = RedisStore::from_url("redis://127.0.0.1/", config).await?;
//!
//!     let mut session = SessionData::new(3600);
//!     session.set("views", 1);
//!     store.set("some-session-id", &session).await?;
//!
//!     let loaded = store.get("some-session-id").await?;
//!     assert_eq!(loaded.and_then(|s| s.get::<i32>("views")), Some(1));
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod key;
pub mod merge;
pub mod scan;
pub mod serializer;
pub mod session;
pub mod store;
pub mod ttl;

pub use client::{KvClient, MemoryClient, ScanCursor, ScanPage};
pub use config::StoreConfig;
pub use error::{Result, SessionError};
pub use key::KeyCodec;
pub use serializer::{JsonSerializer, Serializer};
pub use session::{SessionCookie, SessionData};
pub use store::{MemoryStore, RecordStore, SessionStore, StoredValue, TouchOutcome};
pub use ttl::Ttl;

#[cfg(feature = "redis-store")]
pub use client::RedisClient;

#[cfg(feature = "redis-store")]
pub use store::RedisStore;
