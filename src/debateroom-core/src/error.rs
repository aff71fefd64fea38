//! Error types for the debate room.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DebateError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to acquire media session: {0}")]
    CapabilityAcquisition(String),

    #[error("Capability call failed: {0}")]
    Capability(String),

    #[error("Chat relay delivery failed: {0}")]
    RelayDelivery(String),

    #[error("OpenAI API error: {0}")]
    OpenAIError(#[from] async_openai::error::OpenAIError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("A debate is already running in room '{0}'")]
    RoomBusy(String),

    #[error("Debate worker for room '{room}' failed: {reason}")]
    Worker { room: String, reason: String },
}

impl DebateError {
    /// Whether this error ends the debate session instead of a single turn.
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            DebateError::ConfigError(_)
                | DebateError::CapabilityAcquisition(_)
                | DebateError::Worker { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(DebateError::ConfigError("room".into()).is_session_fatal());
        assert!(DebateError::CapabilityAcquisition("down".into()).is_session_fatal());
        assert!(!DebateError::RelayDelivery("closed".into()).is_session_fatal());
        assert!(!DebateError::Capability("timeout".into()).is_session_fatal());
    }
}
