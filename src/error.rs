//! Session store error types

/// Errors that can occur during session store operations
///
/// A missing session is not an error: `get` reports it as `Ok(None)`, and a
/// touch that races an expiry reports `TouchOutcome::Expired`.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Session payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The key-value store rejected or failed a command
    #[error("Session store error: {0}")]
    Store(String),

    /// Invalid store configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Redis error (when redis-store feature is enabled)
    #[cfg(feature = "redis-store")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Serialization(err.to_string())
    }
}

/// Result type for session store operations
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_maps_to_serialization() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SessionError = err.into();
        assert!(matches!(err, SessionError::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization error:"));
    }
}
