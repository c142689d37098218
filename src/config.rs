//! Session store configuration

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SessionError};
use crate::serializer::{JsonSerializer, Serializer};
use crate::ttl::{Ttl, DEFAULT_TTL};

/// Default SCAN page size hint.
pub const DEFAULT_SCAN_COUNT: usize = 100;

/// Default lifetime in seconds of a tombstone left by `destroy`.
pub const DEFAULT_TOMBSTONE_TTL: u64 = 300;

/// Configuration for the session store
#[derive(Clone)]
pub struct StoreConfig {
    /// Session key prefix in store (default: "sess:")
    pub prefix: String,

    /// Session TTL, fixed seconds or per-session callback (default: 86400)
    pub ttl: Ttl,

    /// Store sessions without expiry; also turns `touch` into a no-op
    /// (default: false)
    pub disable_ttl: bool,

    /// Turn `touch` into a no-op (default: false)
    pub disable_touch: bool,

    /// Page size hint for SCAN (default: 100)
    pub scan_count: usize,

    /// Payload encoding (default: JSON)
    pub serializer: Arc<dyn Serializer>,

    /// Leave a tombstone on `destroy` and merge concurrent writes on `set`
    /// (default: false)
    pub tombstones: bool,

    /// Seconds a tombstone lives (default: 300)
    pub tombstone_ttl: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            prefix: "sess:".to_string(),
            ttl: Ttl::Fixed(DEFAULT_TTL),
            disable_ttl: false,
            disable_touch: false,
            scan_count: DEFAULT_SCAN_COUNT,
            serializer: Arc::new(JsonSerializer),
            tombstones: false,
            tombstone_ttl: DEFAULT_TOMBSTONE_TTL,
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("prefix", &self.prefix)
            .field("ttl", &self.ttl)
            .field("disable_ttl", &self.disable_ttl)
            .field("disable_touch", &self.disable_touch)
            .field("scan_count", &self.scan_count)
            .field("tombstones", &self.tombstones)
            .field("tombstone_ttl", &self.tombstone_ttl)
            .finish_non_exhaustive()
    }
}

impl StoreConfig {
    /// Create a configuration with connect-redis defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from a connect-redis style options object, e.g.
    /// `{"prefix": "app:", "ttl": 3600, "disableTouch": true}`.
    ///
    /// Missing or `null` options keep their defaults, and so do a `ttl`,
    /// `scanCount` or `tombstoneTTL` of `0`, as in connect-redis. Unknown keys
    /// are ignored. Options of the wrong type are a configuration error.
    pub fn from_options(options: &Value) -> Result<Self> {
        let options = options
            .as_object()
            .ok_or_else(|| config_error("options must be an object"))?;
        let mut config = Self::default();

        for (name, value) in options {
            if value.is_null() {
                continue;
            }
            match name.as_str() {
                "prefix" => {
                    config.prefix = value
                        .as_str()
                        .ok_or_else(|| config_error("prefix must be a string"))?
                        .to_string();
                }
                "ttl" => {
                    let secs = ttl_from_value(value)?;
                    if secs != 0 {
                        config.ttl = Ttl::Fixed(secs);
                    }
                }
                "disableTTL" => config.disable_ttl = flag(name, value)?,
                "disableTouch" => config.disable_touch = flag(name, value)?,
                "tombstones" => config.tombstones = flag(name, value)?,
                "scanCount" => {
                    if let Some(count) = non_zero(name, value)? {
                        config.scan_count = count as usize;
                    }
                }
                "tombstoneTTL" => {
                    if let Some(secs) = non_zero(name, value)? {
                        config.tombstone_ttl = secs;
                    }
                }
                _ => {}
            }
        }

        Ok(config)
    }

    /// Set the session key prefix in store (default: "sess:")
    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set a fixed TTL in seconds (default: 86400 = 1 day)
    pub fn with_ttl(mut self, secs: i64) -> Self {
        self.ttl = Ttl::Fixed(secs);
        self
    }

    /// Compute the TTL per session
    pub fn with_ttl_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &crate::session::SessionData) -> i64 + Send + Sync + 'static,
    {
        self.ttl = Ttl::callback(f);
        self
    }

    /// Store sessions without expiry (default: false)
    pub fn with_disable_ttl(mut self, disable: bool) -> Self {
        self.disable_ttl = disable;
        self
    }

    /// Make `touch` a no-op (default: false)
    pub fn with_disable_touch(mut self, disable: bool) -> Self {
        self.disable_touch = disable;
        self
    }

    /// Set the SCAN page size hint (default: 100)
    pub fn with_scan_count(mut self, count: usize) -> Self {
        self.scan_count = count.max(1);
        self
    }

    /// Use a custom payload serializer
    pub fn with_serializer<S: Serializer>(mut self, serializer: S) -> Self {
        self.serializer = Arc::new(serializer);
        self
    }

    /// Enable tombstones on destroy and merging on set (default: false)
    pub fn with_tombstones(mut self, enabled: bool) -> Self {
        self.tombstones = enabled;
        self
    }

    /// Set how long tombstones live in seconds (default: 300)
    pub fn with_tombstone_ttl(mut self, secs: u64) -> Self {
        self.tombstone_ttl = secs.max(1);
        self
    }
}

fn config_error(msg: &str) -> SessionError {
    SessionError::Configuration(msg.to_string())
}

fn ttl_from_value(value: &Value) -> Result<i64> {
    if let Some(secs) = value.as_i64() {
        return Ok(secs);
    }
    match value.as_f64() {
        Some(secs) if secs.is_finite() && secs.abs() < i64::MAX as f64 => Ok(secs.trunc() as i64),
        _ => Err(config_error("ttl must be a number or function")),
    }
}

fn flag(name: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| SessionError::Configuration(format!("{} must be a boolean", name)))
}

/// Non-negative integer option; `0` means "keep the default".
fn non_zero(name: &str, value: &Value) -> Result<Option<u64>> {
    match value.as_u64() {
        Some(0) => Ok(None),
        Some(n) => Ok(Some(n)),
        None => Err(SessionError::Configuration(format!(
            "{} must be a non-negative integer",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::new();
        assert_eq!(config.prefix, "sess:");
        assert!(matches!(config.ttl, Ttl::Fixed(86400)));
        assert_eq!(config.scan_count, 100);
        assert!(!config.disable_ttl);
        assert!(!config.disable_touch);
        assert!(!config.tombstones);
        assert_eq!(config.tombstone_ttl, 300);
    }

    #[test]
    fn test_from_options() {
        let config = StoreConfig::from_options(&json!({
            "prefix": "tobi",
            "ttl": 1000,
            "disableTTL": true,
            "disableTouch": true,
            "scanCount": 32,
            "tombstones": true,
            "tombstoneTTL": 60,
            "db": 1
        }))
        .unwrap();

        assert_eq!(config.prefix, "tobi");
        assert!(matches!(config.ttl, Ttl::Fixed(1000)));
        assert!(config.disable_ttl);
        assert!(config.disable_touch);
        assert_eq!(config.scan_count, 32);
        assert!(config.tombstones);
        assert_eq!(config.tombstone_ttl, 60);
    }

    #[test]
    fn test_empty_prefix_and_nulls() {
        let config = StoreConfig::from_options(&json!({"prefix": "", "ttl": null})).unwrap();
        assert_eq!(config.prefix, "");
        assert!(matches!(config.ttl, Ttl::Fixed(86400)));
    }

    #[test]
    fn test_zero_options_keep_defaults() {
        let config = StoreConfig::from_options(&json!({
            "ttl": 0,
            "scanCount": 0,
            "tombstoneTTL": 0
        }))
        .unwrap();
        assert!(matches!(config.ttl, Ttl::Fixed(86400)));
        assert_eq!(config.scan_count, 100);
        assert_eq!(config.tombstone_ttl, 300);
    }

    #[test]
    fn test_invalid_ttl() {
        let err = StoreConfig::from_options(&json!({"ttl": "1 day"})).unwrap_err();
        assert!(matches!(err, SessionError::Configuration(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: ttl must be a number or function"
        );
    }

    #[test]
    fn test_invalid_flags_and_counts() {
        assert!(StoreConfig::from_options(&json!({"disableTouch": "yes"})).is_err());
        assert!(StoreConfig::from_options(&json!({"scanCount": -1})).is_err());
        assert!(StoreConfig::from_options(&json!({"tombstoneTTL": "5m"})).is_err());
        assert!(StoreConfig::from_options(&json!({"prefix": 5})).is_err());
        assert!(StoreConfig::from_options(&json!([])).is_err());
    }

    #[test]
    fn test_builder() {
        let config = StoreConfig::new()
            .with_prefix("app:")
            .with_ttl(60)
            .with_scan_count(0)
            .with_tombstones(true);
        assert_eq!(config.prefix, "app:");
        assert!(matches!(config.ttl, Ttl::Fixed(60)));
        assert_eq!(config.scan_count, 1);
        assert!(config.tombstones);
        assert!(format!("{:?}", config).contains("app:"));
    }
}
