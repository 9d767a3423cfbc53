use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ContextError, Result};

/// Identifies one Slack thread: the channel plus the `ts` of the thread's
/// root message.
///
/// Slack timestamps look like `1718000000.123456`; channel IDs never contain
/// a colon, so the wire format `{channel}:{thread_ts}` is unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadKey {
    pub channel: String,
    pub thread_ts: String,
}

impl ThreadKey {
    pub fn new(channel: impl Into<String>, thread_ts: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            thread_ts: thread_ts.into(),
        }
    }

    /// Return the canonical storage string.
    pub fn format(&self) -> String {
        format!("{}:{}", self.channel, self.thread_ts)
    }

    /// Parse a storage string back into a `ThreadKey`.
    pub fn parse(s: &str) -> Result<Self> {
        let (channel, thread_ts) = s
            .split_once(':')
            .ok_or_else(|| ContextError::InvalidKey(format!("missing ':' separator: {s}")))?;

        if channel.is_empty() || thread_ts.is_empty() {
            return Err(ContextError::InvalidKey(format!(
                "key components must not be empty: {s}"
            )));
        }

        Ok(Self::new(channel, thread_ts))
    }
}

impl std::fmt::Display for ThreadKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnRole::User => f.write_str("user"),
            TurnRole::Assistant => f.write_str("assistant"),
        }
    }
}

/// One question or answer in a research thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// The accumulated state of one research thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchContext {
    pub key: ThreadKey,
    /// Company the brief was generated for.
    pub company: String,
    /// The brief exactly as the model returned it (Markdown, not mrkdwn).
    pub brief: String,
    /// Set once at creation; the TTL runs from here.
    pub created_at: DateTime<Utc>,
    /// Follow-up turns in arrival order. Replayed verbatim to the model.
    #[serde(default)]
    pub conversation: Vec<Turn>,
}

impl ResearchContext {
    pub fn new(key: ThreadKey, company: impl Into<String>, brief: impl Into<String>) -> Self {
        Self::with_created_at(key, company, brief, Utc::now())
    }

    pub fn with_created_at(
        key: ThreadKey,
        company: impl Into<String>,
        brief: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            key,
            company: company.into(),
            brief: brief.into(),
            created_at,
            conversation: Vec::new(),
        }
    }

    /// `true` once strictly more than `ttl` has elapsed since creation.
    pub fn is_expired_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at > ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_thread_key() {
        let key = ThreadKey::new("D0123ABC", "1718000000.123456");
        let s = key.format();
        assert_eq!(s, "D0123ABC:1718000000.123456");
        assert_eq!(ThreadKey::parse(&s).expect("parse failed"), key);
    }

    #[test]
    fn parse_rejects_malformed_keys() {
        assert!(ThreadKey::parse("no-separator").is_err());
        assert!(ThreadKey::parse(":1718000000.1").is_err());
        assert!(ThreadKey::parse("C1:").is_err());
    }

    #[test]
    fn expiry_boundary() {
        let now = Utc::now();
        let ttl = Duration::hours(48);
        let key = ThreadKey::new("C1", "1.0");

        let old = ResearchContext::with_created_at(key.clone(), "Acme", "B", now - Duration::hours(49));
        let fresh = ResearchContext::with_created_at(key.clone(), "Acme", "B", now - Duration::hours(47));
        let exact = ResearchContext::with_created_at(key, "Acme", "B", now - ttl);

        assert!(old.is_expired_at(now, ttl));
        assert!(!fresh.is_expired_at(now, ttl));
        assert!(!exact.is_expired_at(now, ttl), "expiry is strictly greater than the TTL");
    }

    #[test]
    fn turn_roles_serialize_lowercase() {
        let json = serde_json::to_string(&Turn::assistant("A")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"A"}"#);
    }
}
