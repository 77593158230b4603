use serde::{Deserialize, Serialize};

/// A raw message record as returned by a thread fetch.
///
/// Only `text` matters to the pipeline; `user` and `ts` are kept for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// A record with no `text` field at all
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_ts(mut self, ts: impl Into<String>) -> Self {
        self.ts = Some(ts.into());
        self
    }
}

/// Message text with chat rich-link markup rewritten to bare URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedMessage {
    pub text: String,
}

impl NormalizedMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Identifies a conversation thread: the channel plus the root message timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadRef {
    pub channel: String,
    pub thread_ts: String,
}

impl ThreadRef {
    pub fn new(channel: impl Into<String>, thread_ts: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            thread_ts: thread_ts.into(),
        }
    }
}

/// Inner `event` object of an inbound `event_callback` delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    #[serde(rename = "type", default)]
    pub event_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
}

impl MessageEvent {
    /// The thread this event belongs to. A top-level message is its own thread root.
    pub fn thread_ref(&self) -> Option<ThreadRef> {
        let channel = self.channel.as_deref()?;
        let root = self.thread_ts.as_deref().or(self.ts.as_deref())?;
        Some(ThreadRef::new(channel, root))
    }

    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_missing_text_deserializes() {
        let msg: ChatMessage = serde_json::from_str(r#"{"user":"U1","ts":"1.0"}"#).unwrap();
        assert_eq!(msg.text, None);
        assert_eq!(msg.user.as_deref(), Some("U1"));
    }

    #[test]
    fn test_thread_ref_prefers_thread_ts() {
        let event = MessageEvent {
            event_type: "message".to_string(),
            channel: Some("C1".to_string()),
            ts: Some("222.2".to_string()),
            thread_ts: Some("111.1".to_string()),
            ..MessageEvent::default()
        };
        assert_eq!(event.thread_ref(), Some(ThreadRef::new("C1", "111.1")));
    }

    #[test]
    fn test_thread_ref_falls_back_to_ts() {
        let event = MessageEvent {
            channel: Some("C1".to_string()),
            ts: Some("222.2".to_string()),
            ..MessageEvent::default()
        };
        assert_eq!(event.thread_ref(), Some(ThreadRef::new("C1", "222.2")));
    }

    #[test]
    fn test_thread_ref_requires_channel() {
        let event = MessageEvent {
            ts: Some("222.2".to_string()),
            ..MessageEvent::default()
        };
        assert!(event.thread_ref().is_none());
    }
}
