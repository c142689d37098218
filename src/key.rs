//! Mapping between session ids and storage keys

/// Maps session ids to `prefix + id` storage keys and back.
///
/// No escaping is applied to ids; an empty prefix is allowed and means the
/// store's whole key space is treated as sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCodec {
    prefix: String,
}

impl KeyCodec {
    pub fn new<S: Into<String>>(prefix: S) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Make a storage key from session ID
    pub fn key_for(&self, sid: &str) -> String {
        format!("{}{}", self.prefix, sid)
    }

    /// Recover the session ID from a storage key.
    ///
    /// Keys come from a prefix-matching scan, so a key that does not start
    /// with the prefix is returned unchanged.
    pub fn id_from<'a>(&self, key: &'a str) -> &'a str {
        key.strip_prefix(self.prefix.as_str()).unwrap_or(key)
    }

    /// SCAN `MATCH` pattern selecting every key under the prefix.
    ///
    /// Glob metacharacters in the prefix are escaped so they match literally.
    pub fn scan_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.prefix.len() + 1);
        for c in self.prefix.chars() {
            if matches!(c, '*' | '?' | '[' | ']' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('*');
        pattern
    }
}

impl Default for KeyCodec {
    fn default() -> Self {
        Self::new("sess:")
    }
}
