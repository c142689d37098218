//! Pluggable session payload encoding

use crate::error::Result;
use crate::session::SessionData;

/// Encodes sessions to the string stored under each key and back.
///
/// `parse(&stringify(s)?)` must give back a value equal to `s`.
pub trait Serializer: Send + Sync + 'static {
    fn stringify(&self, session: &SessionData) -> Result<String>;

    fn parse(&self, raw: &str) -> Result<SessionData>;
}

/// JSON encoding, the format connect-redis writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn stringify(&self, session: &SessionData) -> Result<String> {
        Ok(serde_json::to_string(session)?)
    }

    fn parse(&self, raw: &str) -> Result<SessionData> {
        Ok(serde_json::from_str(raw)?)
    }
}
