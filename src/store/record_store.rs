//! Key-value backed session store
//!
//! Storage format is the one connect-redis uses:
//! - Key: `prefix + session_id` (default prefix: "sess:")
//! - Value: serialized session data (JSON by default)
//! - TTL: from the configured TTL, the session cookie, or a callback
//!
//! With tombstones enabled, `destroy` overwrites the key with a short-lived
//! marker instead of deleting it, and `set` merges onto concurrent writes
//! and refuses to bring a destroyed session back.

use async_trait::async_trait;
use chrono::Utc;

use super::{SessionStore, TouchOutcome};
use crate::client::{KvClient, MemoryClient};
use crate::config::StoreConfig;
use crate::error::{Result, SessionError};
use crate::key::KeyCodec;
use crate::merge::deep_merge;
use crate::scan;
use crate::session::SessionData;

/// Value written in place of a destroyed session when tombstones are enabled.
pub const TOMBSTONE: &str = "TOMBSTONE";

/// What a key holds, as seen by tombstone-aware reads
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Record(SessionData),
    Tombstone,
}

/// Session store over any [`KvClient`]
///
/// Holds no session state of its own; every operation is a short sequence of
/// store commands on the shared client. No locking is done across commands,
/// so concurrent writers to one id race (last write wins, or merge when
/// tombstones are enabled).
pub struct RecordStore<C> {
    client: C,
    codec: KeyCodec,
    config: StoreConfig,
}

/// Session store kept in process memory, for development and tests
pub type MemoryStore = RecordStore<MemoryClient>;

impl<C: KvClient> RecordStore<C> {
    pub fn new(client: C, config: StoreConfig) -> Self {
        Self {
            client,
            codec: KeyCodec::new(config.prefix.clone()),
            config,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn key_codec(&self) -> &KeyCodec {
        &self.codec
    }

    /// Read a key without hiding tombstones.
    pub async fn get_stored(&self, sid: &str) -> Result<Option<StoredValue>> {
        let key = self.codec.key_for(sid);
        let raw = self.client.get(&key).await?;
        tracing::debug!(key = %key, found = raw.is_some(), "session get");

        match raw {
            Some(raw) => self.decode(&raw).map(Some),
            None => Ok(None),
        }
    }

    fn decode(&self, raw: &str) -> Result<StoredValue> {
        if self.config.tombstones && raw == TOMBSTONE {
            return Ok(StoredValue::Tombstone);
        }
        self.config.serializer.parse(raw).map(StoredValue::Record)
    }

    fn ttl_for(&self, sid: &str, session: &SessionData) -> i64 {
        self.config.ttl.seconds_for(sid, session)
    }

    async fn all_keys(&self) -> Result<Vec<String>> {
        scan::all_keys(
            &self.client,
            &self.codec.scan_pattern(),
            self.config.scan_count,
        )
        .await
    }

    /// Keys holding a session rather than a tombstone.
    ///
    /// Without tombstones this is every key under the prefix; with them it
    /// costs one extra `MGET`.
    async fn live_keys(&self) -> Result<Vec<String>> {
        let keys = self.all_keys().await?;
        if !self.config.tombstones || keys.is_empty() {
            return Ok(keys);
        }

        let values = self.client.mget(&keys).await?;
        Ok(keys
            .into_iter()
            .zip(values)
            .filter(|(_, value)| matches!(value, Some(raw) if raw != TOMBSTONE))
            .map(|(key, _)| key)
            .collect())
    }

    /// Resolve what `set` should write when tombstones are enabled.
    ///
    /// Returns None when the session was destroyed and must stay destroyed.
    async fn prepare_write(&self, sid: &str, session: &SessionData) -> Result<Option<SessionData>> {
        let mut record = match self.get_stored(sid).await? {
            Some(StoredValue::Tombstone) => return Ok(None),
            Some(StoredValue::Record(existing)) if existing.last_modified != session.last_modified => {
                let stamp = existing.last_modified;
                let mut merged = merge_sessions(existing, session)?;
                merged.last_modified = stamp;
                merged
            }
            Some(StoredValue::Record(existing)) => {
                let mut record = session.clone();
                record.last_modified = existing.last_modified;
                record
            }
            None => session.clone(),
        };

        // Strictly increasing so a writer that read the previous stamp
        // always sees a difference.
        let now = Utc::now().timestamp_millis();
        record.data.remove("lastModified");
        record.last_modified = Some(match record.last_modified {
            Some(prev) if prev >= now => prev + 1,
            _ => now,
        });
        Ok(Some(record))
    }
}

#[async_trait]
impl<C: KvClient> SessionStore for RecordStore<C> {
    async fn get(&self, sid: &str) -> Result<Option<SessionData>> {
        match self.get_stored(sid).await? {
            Some(StoredValue::Record(session)) => Ok(Some(session)),
            Some(StoredValue::Tombstone) | None => Ok(None),
        }
    }

    async fn set(&self, sid: &str, session: &SessionData) -> Result<()> {
        let key = self.codec.key_for(sid);

        let merged;
        let record = if self.config.tombstones {
            match self.prepare_write(sid, session).await? {
                Some(record) => {
                    merged = record;
                    &merged
                }
                None => {
                    tracing::warn!(key = %key, "write to destroyed session ignored");
                    return Ok(());
                }
            }
        } else {
            session
        };

        if self.config.disable_ttl {
            let value = self.config.serializer.stringify(record)?;
            tracing::debug!(key = %key, "session set without expiry");
            return self.client.set(&key, &value, None).await;
        }

        let ttl = self.ttl_for(sid, record);
        if ttl <= 0 {
            tracing::debug!(key = %key, ttl, "session already expired, destroying");
            return self.destroy(sid).await;
        }

        let value = self.config.serializer.stringify(record)?;
        tracing::debug!(key = %key, ttl, "session set");
        self.client.set(&key, &value, Some(ttl as u64)).await
    }

    async fn destroy(&self, sid: &str) -> Result<()> {
        let key = self.codec.key_for(sid);

        if self.config.tombstones {
            tracing::debug!(key = %key, "session tombstoned");
            return self
                .client
                .set(&key, TOMBSTONE, Some(self.config.tombstone_ttl))
                .await;
        }

        tracing::debug!(key = %key, "session destroyed");
        self.client.del(&[key]).await?;
        Ok(())
    }

    async fn touch(&self, sid: &str, session: &SessionData) -> Result<TouchOutcome> {
        if self.config.disable_touch || self.config.disable_ttl {
            return Ok(TouchOutcome::Skipped);
        }

        let key = self.codec.key_for(sid);
        if self.config.tombstones
            && self.client.get(&key).await?.as_deref() == Some(TOMBSTONE)
        {
            return Ok(TouchOutcome::Expired);
        }

        let ttl = self.ttl_for(sid, session);
        if ttl <= 0 {
            self.destroy(sid).await?;
            return Ok(TouchOutcome::Expired);
        }

        if self.client.expire(&key, ttl).await? {
            tracing::debug!(key = %key, ttl, "session touched");
            Ok(TouchOutcome::Refreshed)
        } else {
            tracing::warn!(key = %key, "touch on missing session");
            Ok(TouchOutcome::Expired)
        }
    }

    async fn clear(&self) -> Result<()> {
        let keys = self.all_keys().await?;
        if keys.is_empty() {
            return Ok(());
        }

        let removed = self.client.del(&keys).await?;
        tracing::debug!(removed, "sessions cleared");
        Ok(())
    }

    async fn length(&self) -> Result<usize> {
        Ok(self.live_keys().await?.len())
    }

    async fn ids(&self) -> Result<Vec<String>> {
        let keys = self.live_keys().await?;
        Ok(keys
            .iter()
            .map(|key| self.codec.id_from(key).to_string())
            .collect())
    }

    async fn all(&self) -> Result<Vec<SessionData>> {
        let keys = self.all_keys().await?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let values = self.client.mget(&keys).await?;
        let mut sessions = Vec::with_capacity(keys.len());
        for (key, raw) in keys.iter().zip(values) {
            // Expired between SCAN and MGET
            let Some(raw) = raw else { continue };
            if let StoredValue::Record(mut session) = self.decode(&raw)? {
                session.data.remove("id");
                session.id = Some(self.codec.id_from(key).to_string());
                sessions.push(session);
            }
        }
        Ok(sessions)
    }
}

impl<C: Clone> Clone for RecordStore<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            codec: self.codec.clone(),
            config: self.config.clone(),
        }
    }
}

impl MemoryStore {
    /// Create a store over a fresh in-memory client
    pub fn in_memory(config: StoreConfig) -> Self {
        Self::new(MemoryClient::new(), config)
    }
}

/// Merge `incoming` onto `existing`, incoming winning on conflicts.
fn merge_sessions(existing: SessionData, incoming: &SessionData) -> Result<SessionData> {
    let base = serde_json::to_value(existing)?;
    let update = serde_json::to_value(incoming)?;
    serde_json::from_value(deep_merge(base, update))
        .map_err(|e| SessionError::Serialization(format!("merged session: {}", e)))
}
