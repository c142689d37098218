//! In-memory key-value client
//!
//! This is primarily for development and testing.
//! For production, use RedisClient against a real server.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{KvClient, ScanCursor, ScanPage};
use crate::error::{Result, SessionError};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(exp) => exp > now,
            None => true,
        }
    }
}

/// In-memory client with Redis command semantics
///
/// Keys expire lazily: an expired key is invisible to every command and is
/// dropped on the next write. `SCAN` walks keys in lexical order and uses the
/// number of keys already returned as its cursor.
///
/// Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryClient {
    entries: Arc<RwLock<BTreeMap<String, Entry>>>,
}

impl MemoryClient {
    /// Create an empty client
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining time to live with `TTL` semantics: `-2` when the key is
    /// missing, `-1` when it has no expiry, otherwise seconds left (rounded).
    pub fn ttl(&self, key: &str) -> i64 {
        let now = Instant::now();
        let entries = self.entries.read();
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => match entry.expires_at {
                Some(exp) => ((exp - now).as_millis() as i64 + 500) / 1000,
                None => -1,
            },
            _ => -2,
        }
    }

    /// Drop expired keys
    pub fn cleanup_expired(&self) {
        let now = Instant::now();
        self.entries.write().retain(|_, entry| entry.is_live(now));
    }
}

#[async_trait]
impl KvClient for MemoryClient {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let entries = self.entries.read();
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<()> {
        if ttl_secs == Some(0) {
            return Err(SessionError::Store(
                "invalid expire time in 'set' command".to_string(),
            ));
        }
        let expires_at = ttl_secs.map(|secs| Instant::now() + Duration::from_secs(secs));

        self.cleanup_expired();
        self.entries.write().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_secs: i64) -> Result<bool> {
        let now = Instant::now();
        let mut entries = self.entries.write();

        if !entries.get(key).is_some_and(|entry| entry.is_live(now)) {
            return Ok(false);
        }

        if ttl_secs <= 0 {
            entries.remove(key);
        } else if let Some(entry) = entries.get_mut(key) {
            entry.expires_at = Some(now + Duration::from_secs(ttl_secs as u64));
        }
        Ok(true)
    }

    async fn del(&self, keys: &[String]) -> Result<u64> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let mut removed = 0;
        for key in keys {
            if let Some(entry) = entries.remove(key) {
                if entry.is_live(now) {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let now = Instant::now();
        let entries = self.entries.read();
        Ok(keys
            .iter()
            .map(|key| {
                entries
                    .get(key)
                    .filter(|entry| entry.is_live(now))
                    .map(|entry| entry.value.clone())
            })
            .collect())
    }

    async fn scan(&self, cursor: &ScanCursor, pattern: &str, count: usize) -> Result<ScanPage> {
        let offset: usize = cursor
            .as_str()
            .parse()
            .map_err(|_| SessionError::Store("invalid cursor".to_string()))?;
        let count = count.max(1);

        let now = Instant::now();
        let entries = self.entries.read();
        let mut matching = entries
            .iter()
            .filter(|(_, entry)| entry.is_live(now))
            .map(|(key, _)| key)
            .filter(|key| glob_match(pattern, key));

        let keys: Vec<String> = matching.by_ref().skip(offset).take(count).cloned().collect();
        let next = if matching.next().is_some() {
            offset + keys.len()
        } else {
            0
        };

        Ok(ScanPage {
            cursor: ScanCursor::from(next as u64),
            keys,
        })
    }
}

/// Redis `MATCH` glob subset: `*`, `?` and `\` escapes.
fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    // Position of the last `*` and the text index it currently absorbs up to
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() {
            match p[pi] {
                '*' => {
                    star = Some((pi, ti));
                    pi += 1;
                    continue;
                }
                '?' => {
                    pi += 1;
                    ti += 1;
                    continue;
                }
                '\\' if pi + 1 < p.len() => {
                    if p[pi + 1] == t[ti] {
                        pi += 2;
                        ti += 1;
                        continue;
                    }
                }
                c => {
                    if c == t[ti] {
                        pi += 1;
                        ti += 1;
                        continue;
                    }
                }
            }
        }

        match star {
            Some((sp, st)) => {
                pi = sp + 1;
                ti = st + 1;
                star = Some((sp, st + 1));
            }
            None => return false,
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}
