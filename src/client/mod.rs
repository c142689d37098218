//! Key-value store clients
//!
//! The record store only needs six commands (`GET`, `SET [EX]`, `EXPIRE`,
//! `DEL`, `MGET` and `SCAN`). [`KvClient`] is that command set; each
//! supported driver gets one implementation, chosen when the store is built.

mod memory;

pub use memory::MemoryClient;

#[cfg(feature = "redis-store")]
mod redis_client;

#[cfg(feature = "redis-store")]
pub use redis_client::RedisClient;

use async_trait::async_trait;

use crate::error::Result;

/// Position of an incremental `SCAN`.
///
/// Opaque to callers; iteration starts at [`ScanCursor::start`] and ends when
/// the store hands back a terminal cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCursor(String);

impl ScanCursor {
    pub fn start() -> Self {
        Self("0".to_string())
    }

    pub fn new<S: Into<String>>(cursor: S) -> Self {
        Self(cursor.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the store signalled the end of iteration.
    ///
    /// Drivers report the final cursor either as the integer `0` or as the
    /// string `"0"`; both end up here as a zero-valued number.
    pub fn is_terminal(&self) -> bool {
        self.0.trim().parse::<u64>() == Ok(0)
    }
}

impl From<u64> for ScanCursor {
    fn from(cursor: u64) -> Self {
        Self(cursor.to_string())
    }
}

/// One page of `SCAN` results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPage {
    pub cursor: ScanCursor,
    pub keys: Vec<String>,
}

/// Commands the session store issues against the key-value store.
///
/// Each call is a single store command and a single suspension point.
/// Errors are returned as-is; retries belong to the driver.
#[async_trait]
pub trait KvClient: Send + Sync + 'static {
    /// `GET key`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// `SET key value [EX ttl]`
    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<()>;

    /// `EXPIRE key ttl`; false when the key did not exist
    async fn expire(&self, key: &str, ttl_secs: i64) -> Result<bool>;

    /// `DEL key...`; returns the number of keys removed
    async fn del(&self, keys: &[String]) -> Result<u64>;

    /// `MGET key...`; one entry per key, `None` where the key is absent
    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>>;

    /// `SCAN cursor MATCH pattern COUNT count`
    async fn scan(&self, cursor: &ScanCursor, pattern: &str, count: usize) -> Result<ScanPage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_cursor() {
        assert!(ScanCursor::start().is_terminal());
        assert!(ScanCursor::from(0).is_terminal());
        assert!(ScanCursor::new("00").is_terminal());
        assert!(!ScanCursor::new("17").is_terminal());
        assert!(!ScanCursor::from(1u64 << 40).is_terminal());
    }
}
