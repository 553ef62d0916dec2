use std::fmt;

/// Stable conversation identifier for one Slack thread.
///
/// The key is `"{channel}-{thread_ts}"`, where `thread_ts` falls back to the
/// message's own `ts` when the message starts a new thread. Every reply and
/// tool round trip of a turn is correlated through this one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Returns the timestamp a reply should thread under.
#[must_use]
pub fn thread_anchor<'a>(thread_ts: Option<&'a str>, ts: &'a str) -> &'a str {
    thread_ts.filter(|t| !t.is_empty()).unwrap_or(ts)
}

#[must_use]
pub fn derive_session_key(channel_id: &str, thread_ts: Option<&str>, ts: &str) -> SessionKey {
    SessionKey(format!("{channel_id}-{}", thread_anchor(thread_ts, ts)))
}
