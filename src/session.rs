//! Session record structure compatible with express-session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Cookie data structure compatible with express-session
///
/// Every field is optional so that a record written by another client
/// (e.g. `{"cookie":{"expires":"..."}}`) reads back exactly as it was stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookie {
    /// Original max age in milliseconds (as set initially)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_max_age: Option<i64>,

    /// Remaining max age in milliseconds, as written by old connect releases
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<i64>,

    /// Expiration time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// SameSite attribute; express-session allows either a bool or a string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<Value>,

    /// Cookie attributes not modelled above (e.g. `priority`, `partitioned`)
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl SessionCookie {
    /// Create a new session cookie with the given max age in seconds
    pub fn new(max_age_secs: u64) -> Self {
        let max_age_ms = (max_age_secs * 1000) as i64;
        let expires = Utc::now() + chrono::Duration::seconds(max_age_secs as i64);

        Self {
            original_max_age: Some(max_age_ms),
            expires: Some(expires),
            path: Some("/".to_string()),
            http_only: Some(true),
            ..Default::default()
        }
    }

    /// Cookie carrying only an absolute expiry
    pub fn expiring_at(expires: DateTime<Utc>) -> Self {
        Self {
            expires: Some(expires),
            ..Default::default()
        }
    }

    /// Check if the cookie has expired
    pub fn is_expired(&self) -> bool {
        match self.expires {
            Some(exp) => exp < Utc::now(),
            None => false,
        }
    }
}

/// Session record compatible with express-session/connect-redis
///
/// User data is flattened at the same level as `cookie`, so
/// `{"cookie":{...},"views":3}` maps to `cookie` plus `data["views"]`.
///
/// A top-level `id` that is not a string, or a `lastModified` that is not an
/// integer, belongs to the user data and stays in `data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Map<String, Value>")]
pub struct SessionData {
    /// Session id; only filled in by `SessionStore::all`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Cookie information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<SessionCookie>,

    /// Milliseconds since the epoch of the last merge-aware write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,

    /// Additional session data (flattened at same level as cookie)
    #[serde(flatten)]
    pub data: HashMap<String, Value>,
}

impl TryFrom<Map<String, Value>> for SessionData {
    type Error = serde_json::Error;

    fn try_from(mut map: Map<String, Value>) -> Result<Self, Self::Error> {
        let cookie = match map.remove("cookie") {
            None | Some(Value::Null) => None,
            Some(cookie) => Some(serde_json::from_value(cookie)?),
        };

        let id = match map.remove("id") {
            Some(Value::String(id)) => Some(id),
            Some(other) => {
                map.insert("id".to_string(), other);
                None
            }
            None => None,
        };

        let last_modified = match map.remove("lastModified") {
            Some(value) => match value.as_i64() {
                Some(stamp) => Some(stamp),
                None => {
                    map.insert("lastModified".to_string(), value);
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            id,
            cookie,
            last_modified,
            data: map.into_iter().collect(),
        })
    }
}

impl SessionData {
    /// Create a new session with a cookie of the given max age in seconds
    pub fn new(max_age_secs: u64) -> Self {
        Self {
            cookie: Some(SessionCookie::new(max_age_secs)),
            ..Default::default()
        }
    }

    /// Builder-style cookie setter
    pub fn with_cookie(mut self, cookie: SessionCookie) -> Self {
        self.cookie = Some(cookie);
        self
    }

    /// Get a value from session data
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set a value in session data
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) {
        if let Ok(v) = serde_json::to_value(value) {
            self.data.insert(key.to_string(), v);
        }
    }

    /// Remove a value from session data
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Check if a key exists
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Check if session data is empty (no user data)
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Absolute cookie expiry, if any
    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.cookie.as_ref().and_then(|c| c.expires)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_payload_round_trip() {
        let raw = json!({"foo": "bar", "nested": {"n": 1, "list": [1, 2]}});
        let session: SessionData = serde_json::from_value(raw.clone()).unwrap();
        assert!(session.cookie.is_none());
        assert_eq!(session.get::<String>("foo"), Some("bar".to_string()));
        assert_eq!(serde_json::to_value(&session).unwrap(), raw);
    }

    #[test]
    fn test_cookie_fields_are_camel_case() {
        let raw = json!({
            "cookie": {
                "originalMaxAge": 60000,
                "expires": "2030-01-01T00:00:00.000Z",
                "httpOnly": true,
                "path": "/",
                "sameSite": "lax"
            },
            "user": "alice"
        });
        let session: SessionData = serde_json::from_value(raw).unwrap();
        let cookie = session.cookie.as_ref().unwrap();
        assert_eq!(cookie.original_max_age, Some(60000));
        assert_eq!(cookie.http_only, Some(true));
        assert_eq!(cookie.same_site, Some(json!("lax")));
        assert!(!cookie.is_expired());

        let out = serde_json::to_value(&session).unwrap();
        assert_eq!(out["cookie"]["originalMaxAge"], 60000);
        assert!(out["cookie"].get("domain").is_none());
        assert_eq!(out["user"], "alice");
    }

    #[test]
    fn test_id_and_last_modified_are_optional() {
        let mut session = SessionData::new(60);
        assert!(serde_json::to_value(&session).unwrap().get("id").is_none());

        session.id = Some("abc".into());
        session.last_modified = Some(42);
        let out = serde_json::to_value(&session).unwrap();
        assert_eq!(out["id"], "abc");
        assert_eq!(out["lastModified"], 42);
    }

    #[test]
    fn test_foreign_id_and_last_modified_stay_in_data() {
        let raw = json!({"id": 42, "lastModified": "yesterday", "views": 1});
        let session: SessionData = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(session.id, None);
        assert_eq!(session.last_modified, None);
        assert_eq!(session.get::<i64>("id"), Some(42));
        assert_eq!(session.get::<u32>("views"), Some(1));
        assert_eq!(serde_json::to_value(&session).unwrap(), raw);
    }

    #[test]
    fn test_unknown_cookie_fields_survive() {
        let raw = json!({
            "cookie": {
                "originalMaxAge": 60000,
                "expires": "2030-01-01T00:00:00Z",
                "path": "/",
                "partitioned": true,
                "priority": "high"
            },
            "user": "alice"
        });
        let session: SessionData = serde_json::from_value(raw.clone()).unwrap();
        let cookie = session.cookie.as_ref().unwrap();
        assert_eq!(cookie.extra.get("priority"), Some(&json!("high")));
        assert_eq!(cookie.extra.get("partitioned"), Some(&json!(true)));
        assert_eq!(serde_json::to_value(&session).unwrap(), raw);
    }

    #[test]
    fn test_set_get_remove() {
        let mut session = SessionData::default();
        session.set("views", 3);
        assert!(session.contains("views"));
        assert_eq!(session.get::<i32>("views"), Some(3));
        assert_eq!(session.remove("views"), Some(json!(3)));
        assert!(session.is_empty());
    }

    #[test]
    fn test_expired_cookie() {
        let past = Utc::now() - chrono::Duration::seconds(5);
        assert!(SessionCookie::expiring_at(past).is_expired());
        assert!(!SessionCookie::default().is_expired());
    }
}
