//! Redis client backed by the `redis` crate
//!
//! Commands are issued exactly as connect-redis issues them, so a Node.js
//! application and this crate can share the same keys:
//! - `SET key json EX ttl` / `SET key json`
//! - `EXPIRE key ttl`
//! - `DEL`, `MGET` and `SCAN ... MATCH ... COUNT` with explicit arguments

use async_trait::async_trait;
use redis::aio::{ConnectionLike, ConnectionManager};
use redis::{AsyncCommands, Value};

use super::{KvClient, ScanCursor, ScanPage};
use crate::error::{Result, SessionError};

/// Redis client over any async `redis` connection
///
/// The default connection type is [`ConnectionManager`], which reconnects on
/// its own; a `MultiplexedConnection` works the same way. The connection is
/// cloned per command and shared by every in-flight operation.
///
/// # Example
///
/// ```rust,ignore
/// use connect_redis_store::RedisClient;
///
/// let client = redis::Client::open("redis://127.0.0.1/")?;
/// let client = RedisClient::new(client).await?;
/// ```
#[derive(Clone)]
pub struct RedisClient<C = ConnectionManager> {
    conn: C,
}

impl RedisClient<ConnectionManager> {
    /// Connect through a connection manager
    pub async fn new(client: redis::Client) -> Result<Self> {
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    /// Connect from a connection string
    pub async fn from_url(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| {
            SessionError::Store(format!("Failed to create Redis client: {}", e))
        })?;
        Self::new(client).await
    }
}

impl<C> RedisClient<C>
where
    C: ConnectionLike + Clone + Send + Sync + 'static,
{
    /// Wrap an existing connection
    pub fn from_connection(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<C> KvClient for RedisClient<C>
where
    C: ConnectionLike + Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let data: Option<String> = conn.get(key).await?;
        Ok(data)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<()> {
        let mut conn = self.conn.clone();
        match ttl_secs {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl).await?,
            None => conn.set::<_, _, ()>(key, value).await?,
        }
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_secs: i64) -> Result<bool> {
        let mut conn = self.conn.clone();
        let refreshed: bool = conn.expire(key, ttl_secs).await?;
        Ok(refreshed)
    }

    async fn del(&self, keys: &[String]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("DEL");
        for key in keys {
            cmd.arg(key);
        }
        let removed: u64 = cmd.query_async(&mut conn).await?;
        Ok(removed)
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        // Always MGET, even for one key, so the reply is an array
        let mut cmd = redis::cmd("MGET");
        for key in keys {
            cmd.arg(key);
        }
        let values: Vec<Option<String>> = cmd.query_async(&mut conn).await?;
        Ok(values)
    }

    async fn scan(&self, cursor: &ScanCursor, pattern: &str, count: usize) -> Result<ScanPage> {
        let mut conn = self.conn.clone();
        let (next, keys): (Value, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor.as_str())
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(count)
            .query_async(&mut conn)
            .await?;

        Ok(ScanPage {
            cursor: cursor_from_value(next)?,
            keys,
        })
    }
}

fn cursor_from_value(value: Value) -> Result<ScanCursor> {
    match value {
        Value::Int(n) => Ok(ScanCursor::new(n.to_string())),
        Value::BulkString(bytes) => String::from_utf8(bytes)
            .map(ScanCursor::new)
            .map_err(|e| SessionError::Store(format!("Invalid SCAN cursor: {}", e))),
        Value::SimpleString(s) => Ok(ScanCursor::new(s)),
        other => Err(SessionError::Store(format!(
            "Unexpected SCAN cursor reply: {:?}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    // Tests marked #[ignore] require a running Redis instance
    // Run with: cargo test --features redis-store -- --ignored

    use super::*;
    use crate::config::StoreConfig;
    use crate::session::{SessionCookie, SessionData};
    use crate::store::{RecordStore, SessionStore, TouchOutcome};
    use chrono::{Duration, Utc};

    #[test]
    fn test_cursor_from_value() {
        assert!(cursor_from_value(Value::Int(0)).unwrap().is_terminal());
        assert!(cursor_from_value(Value::BulkString(b"0".to_vec()))
            .unwrap()
            .is_terminal());
        let cursor = cursor_from_value(Value::BulkString(b"1792".to_vec())).unwrap();
        assert_eq!(cursor.as_str(), "1792");
        assert!(!cursor.is_terminal());
        assert!(cursor_from_value(Value::Nil).is_err());
    }

    async fn ttl_of(key: &str) -> i64 {
        let client = redis::Client::open("redis://127.0.0.1/").unwrap();
        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        conn.ttl(key).await.unwrap()
    }

    #[tokio::test]
    #[ignore]
    async fn test_redis_store_lifecycle() {
        let client = RedisClient::from_url("redis://127.0.0.1/").await.unwrap();
        let prefix = format!("test-{}:", uuid::Uuid::new_v4());
        let store = RecordStore::new(client, StoreConfig::new().with_prefix(prefix.clone()));

        store.clear().await.unwrap();

        let mut plain = SessionData::default();
        plain.set("foo", "bar");
        store.set("123", &plain).await.unwrap();
        assert_eq!(store.get("123").await.unwrap(), Some(plain));
        assert!(ttl_of(&format!("{}123", prefix)).await >= 86399);

        let expiring = SessionData::default()
            .with_cookie(SessionCookie::expiring_at(Utc::now() + Duration::seconds(60)));
        store.set("456", &expiring).await.unwrap();
        let ttl = ttl_of(&format!("{}456", prefix)).await;
        assert!(ttl <= 60 && ttl > 0);

        let later = SessionData::default()
            .with_cookie(SessionCookie::expiring_at(Utc::now() + Duration::seconds(90)));
        assert_eq!(store.touch("456", &later).await.unwrap(), TouchOutcome::Refreshed);
        assert!(ttl_of(&format!("{}456", prefix)).await > 60);

        assert_eq!(store.length().await.unwrap(), 2);
        let mut ids = store.ids().await.unwrap();
        ids.sort();
        assert_eq!(ids, vec!["123", "456"]);

        store.destroy("456").await.unwrap();
        assert_eq!(store.length().await.unwrap(), 1);

        for i in 0..1000 {
            let session = SessionData::default()
                .with_cookie(SessionCookie::expiring_at(Utc::now() + Duration::seconds(60)));
            store.set(&format!("s{}", i), &session).await.unwrap();
        }
        assert_eq!(store.length().await.unwrap(), 1001);

        store.clear().await.unwrap();
        assert_eq!(store.length().await.unwrap(), 0);
    }
}
