//! TTL computation for stored sessions

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use crate::session::SessionData;

/// One day in seconds.
pub const DEFAULT_TTL: i64 = 86400;

/// Per-session TTL callback, called with the session id and the session.
pub type TtlCallback = Arc<dyn Fn(&str, &SessionData) -> i64 + Send + Sync>;

/// Configured TTL: a fixed number of seconds or a per-session callback.
///
/// A fixed value is only the fallback: a session whose cookie carries an
/// expiry is stored until that expiry. A callback overrides everything.
#[derive(Clone)]
pub enum Ttl {
    Fixed(i64),
    Callback(TtlCallback),
}

impl Ttl {
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&str, &SessionData) -> i64 + Send + Sync + 'static,
    {
        Ttl::Callback(Arc::new(f))
    }

    /// Seconds the session should live, measured from `now`.
    ///
    /// May be zero or negative when the cookie already expired; callers
    /// treat that as "delete instead of store".
    pub fn seconds_at(&self, sid: &str, session: &SessionData, now: DateTime<Utc>) -> i64 {
        let default = match self {
            Ttl::Callback(f) => return f(sid, session),
            Ttl::Fixed(secs) => *secs,
        };

        let cookie = match &session.cookie {
            Some(cookie) => cookie,
            None => return default,
        };

        if let Some(expires) = cookie.expires {
            return seconds_until(expires, now);
        }

        // connect <= 2.x only stored a relative maxAge in milliseconds
        if let Some(max_age_ms) = cookie.max_age {
            return max_age_ms / 1000;
        }

        default
    }

    /// Seconds the session should live, measured from the current time.
    pub fn seconds_for(&self, sid: &str, session: &SessionData) -> i64 {
        self.seconds_at(sid, session, Utc::now())
    }
}

impl Default for Ttl {
    fn default() -> Self {
        Ttl::Fixed(DEFAULT_TTL)
    }
}

impl From<i64> for Ttl {
    fn from(secs: i64) -> Self {
        Ttl::Fixed(secs)
    }
}

impl fmt::Debug for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ttl::Fixed(secs) => f.debug_tuple("Fixed").field(secs).finish(),
            Ttl::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Whole seconds from `now` until `expires`, rounded up.
fn seconds_until(expires: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (expires - now).num_milliseconds();
    // Integer division truncates toward zero, which already is the ceiling
    // for negative values.
    if ms > 0 && ms % 1000 != 0 {
        ms / 1000 + 1
    } else {
        ms / 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionCookie;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2030-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_default_without_cookie() {
        let session = SessionData::default();
        assert_eq!(Ttl::default().seconds_at("a", &session, now()), 86400);
        assert_eq!(Ttl::Fixed(30).seconds_at("a", &session, now()), 30);
    }

    #[test]
    fn test_expires_is_rounded_up() {
        let session = SessionData::default()
            .with_cookie(SessionCookie::expiring_at(now() + Duration::milliseconds(59_001)));
        assert_eq!(Ttl::default().seconds_at("a", &session, now()), 60);

        let session = SessionData::default()
            .with_cookie(SessionCookie::expiring_at(now() + Duration::seconds(60)));
        assert_eq!(Ttl::Fixed(5).seconds_at("a", &session, now()), 60);
    }

    #[test]
    fn test_past_expiry_is_not_positive() {
        let session = SessionData::default()
            .with_cookie(SessionCookie::expiring_at(now() - Duration::milliseconds(1_500)));
        assert_eq!(Ttl::default().seconds_at("a", &session, now()), -1);

        let session = SessionData::default().with_cookie(SessionCookie::expiring_at(now()));
        assert_eq!(Ttl::default().seconds_at("a", &session, now()), 0);
    }

    #[test]
    fn test_legacy_max_age() {
        let cookie = SessionCookie {
            max_age: Some(2_999),
            ..Default::default()
        };
        let session = SessionData::default().with_cookie(cookie);
        assert_eq!(Ttl::default().seconds_at("a", &session, now()), 2);
    }

    #[test]
    fn test_callback_overrides_cookie() {
        let ttl = Ttl::callback(|sid, session| {
            if sid == "admin" {
                10
            } else {
                session.get::<i64>("ttl").unwrap_or(1)
            }
        });
        let mut session = SessionData::default()
            .with_cookie(SessionCookie::expiring_at(now() + Duration::seconds(600)));
        session.set("ttl", 42);

        assert_eq!(ttl.seconds_at("admin", &session, now()), 10);
        assert_eq!(ttl.seconds_at("user", &session, now()), 42);
        assert_eq!(format!("{:?}", ttl), "Callback(..)");
    }
}
