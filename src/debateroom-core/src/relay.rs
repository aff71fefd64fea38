//! Best-effort chat relay onto the room's broadcast channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::DebateError;
use crate::participant::Speaker;
use crate::session::MediaSession;

/// A sender-tagged utterance shown to every participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    pub sender: Speaker,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatEvent {
    pub fn new(sender: Speaker, message: impl Into<String>) -> Self {
        Self {
            sender,
            message: message.into(),
            sent_at: Utc::now(),
        }
    }

    fn payload(&self) -> ChatPayload {
        ChatPayload {
            sender: self.sender.label().to_string(),
            message: self.message.clone(),
            timestamp: self.sent_at.timestamp_millis(),
        }
    }
}

/// Wire form of a chat event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatPayload {
    pub sender: String,
    pub message: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ChatPayload {
    pub fn decode(bytes: &[u8]) -> Result<Self, DebateError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Publishes chat events. Delivery failures are logged and dropped: at most
/// once, no retries.
#[derive(Debug, Clone)]
pub struct ChatRelay {
    topic: String,
}

impl ChatRelay {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Relay `event`. Returns whether it was delivered; never fails.
    pub async fn relay(&self, session: &mut dyn MediaSession, event: &ChatEvent) -> bool {
        match self.try_relay(session, event).await {
            Ok(()) => {
                debug!(sender = event.sender.label(), topic = %self.topic, "Chat message relayed");
                true
            }
            Err(e) => {
                warn!(sender = event.sender.label(), error = %e, "Failed to relay chat message");
                false
            }
        }
    }

    async fn try_relay(
        &self,
        session: &mut dyn MediaSession,
        event: &ChatEvent,
    ) -> Result<(), DebateError> {
        let payload = serde_json::to_vec(&event.payload())?;
        session
            .publish(payload, &self.topic, true)
            .await
            .map_err(|e| DebateError::RelayDelivery(e.to_string()))
    }
}

impl Default for ChatRelay {
    fn default() -> Self {
        Self::new("lk.chat")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedPlatform, Script};
    use crate::session::MediaPlatform;

    #[tokio::test]
    async fn test_relay_publishes_reliable_json() {
        let platform = ScriptedPlatform::new(Script::default());
        let mut session = platform.start(platform.request()).await.unwrap();
        let relay = ChatRelay::default();

        let event = ChatEvent::new(Speaker::Persona("AI Gandhi".into()), "Peace first.");
        assert!(relay.relay(session.as_mut(), &event).await);

        let published = platform.recorder().published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].topic, "lk.chat");
        assert!(published[0].reliable);
        assert_eq!(published[0].payload.sender, "AI Gandhi");
        assert_eq!(published[0].payload.message, "Peace first.");
        assert_eq!(published[0].payload.timestamp, event.sent_at.timestamp_millis());
    }

    #[tokio::test]
    async fn test_relay_failure_is_swallowed() {
        let platform = ScriptedPlatform::new(Script {
            failing_publishes: vec![0],
            ..Script::default()
        });
        let mut session = platform.start(platform.request()).await.unwrap();
        let relay = ChatRelay::new("debate.chat");

        let first = ChatEvent::new(Speaker::User, "dropped");
        let second = ChatEvent::new(Speaker::User, "kept");
        assert!(!relay.relay(session.as_mut(), &first).await);
        assert!(relay.relay(session.as_mut(), &second).await);

        let published = platform.recorder().published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].topic, "debate.chat");
        assert_eq!(published[0].payload.message, "kept");
    }
}
