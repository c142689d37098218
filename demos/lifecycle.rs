//! Session lifecycle against a live Redis, in the connect-redis key layout
//!
//! Sessions written here can be read by a Node.js application using
//! express-session and connect-redis with the same prefix, and vice versa.
//!
//! Run with: REDIS_URL=redis://127.0.0.1/ cargo run --example lifecycle

use chrono::{Duration, Utc};
use connect_redis_store::{RedisStore, SessionCookie, SessionData, SessionStore, StoreConfig};

#[tokio::main]
async fn main() -> connect_redis_store::Result<()> {
    // Set up logging
    tracing_subscriber::fmt::init();

    // Get Redis URL from environment or use default
    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());
    let prefix = std::env::var("SESSION_PREFIX").unwrap_or_else(|_| "demo-sess:".to_string());

    println!("Connecting to Redis at {}", redis_url);

    let config = StoreConfig::new()
        .with_prefix(prefix.as_str()) // Must match connect-redis prefix
        .with_ttl(86400);
    let store = RedisStore::from_url(&redis_url, config).await?;

    store.clear().await?;

    let mut plain = SessionData::default();
    plain.set("foo", "bar");
    store.set("123", &plain).await?;
    println!("get 123 -> {:?}", store.get("123").await?);

    let expires = Utc::now() + Duration::seconds(60);
    store
        .set("456", &SessionData::default().with_cookie(SessionCookie::expiring_at(expires)))
        .await?;

    let later = Utc::now() + Duration::seconds(90);
    let outcome = store
        .touch("456", &SessionData::default().with_cookie(SessionCookie::expiring_at(later)))
        .await?;
    println!("touch 456 -> {:?}", outcome);

    let mut ids = store.ids().await?;
    ids.sort();
    println!("length = {}, ids = {:?}", store.length().await?, ids);

    for session in store.all().await? {
        println!("  {}", serde_json::to_string(&session)?);
    }

    store.destroy("456").await?;
    println!("after destroy: length = {}", store.length().await?);

    store.clear().await?;
    println!("after clear: length = {}", store.length().await?);

    Ok(())
}
