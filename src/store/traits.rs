//! Session store trait

use async_trait::async_trait;

use crate::error::Result;
use crate::session::SessionData;

/// Result of refreshing a session's expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchOutcome {
    /// The expiry was extended
    Refreshed,
    /// The session was already gone (expired or destroyed); not an error
    Expired,
    /// Touching is disabled by configuration
    Skipped,
}

/// Trait for session storage backends
///
/// This trait mirrors the express-session store interface. Implementations
/// store each session under `prefix + session_id`.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Get a session by ID
    ///
    /// Returns None if the session doesn't exist
    async fn get(&self, sid: &str) -> Result<Option<SessionData>>;

    /// Set/update a session
    ///
    /// The TTL is derived from the store configuration and the session cookie
    async fn set(&self, sid: &str, session: &SessionData) -> Result<()>;

    /// Destroy/delete a session
    async fn destroy(&self, sid: &str) -> Result<()>;

    /// Touch a session - update its TTL without modifying data
    async fn touch(&self, sid: &str, session: &SessionData) -> Result<TouchOutcome>;

    /// Clear all sessions
    async fn clear(&self) -> Result<()>;

    /// Get the count of all sessions
    async fn length(&self) -> Result<usize>;

    /// Get all session IDs
    async fn ids(&self) -> Result<Vec<String>>;

    /// Get all sessions, each tagged with its `id`
    async fn all(&self) -> Result<Vec<SessionData>>;
}
