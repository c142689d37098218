//! Redis session store compatible with connect-redis

use redis::aio::ConnectionManager;

use super::RecordStore;
use crate::client::RedisClient;
use crate::config::StoreConfig;
use crate::error::Result;

/// Redis session store compatible with connect-redis
///
/// This store uses the same format as the Node.js connect-redis package,
/// allowing seamless session sharing between Rust and Node.js applications.
///
/// # Example
///
/// ```rust,ignore
/// use connect_redis_store::{RedisStore, StoreConfig};
///
/// let client = redis::Client::open("redis://127.0.0.1/")?;
/// let store = RedisStore::connect(client, StoreConfig::new()).await?;
/// ```
pub type RedisStore = RecordStore<RedisClient>;

impl RedisStore {
    /// Create a new Redis store over a connection manager
    pub async fn connect(client: redis::Client, config: StoreConfig) -> Result<Self> {
        Ok(Self::new(RedisClient::new(client).await?, config))
    }

    /// Create a new Redis store from a connection string
    pub async fn from_url(url: &str, config: StoreConfig) -> Result<Self> {
        Ok(Self::new(RedisClient::from_url(url).await?, config))
    }

    /// Create a new Redis store from an existing connection manager
    pub fn from_connection_manager(conn: ConnectionManager, config: StoreConfig) -> Self {
        Self::new(RedisClient::from_connection(conn), config)
    }
}
