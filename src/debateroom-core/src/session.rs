//! Real-time media session capability.
//!
//! The debate core never touches audio. A [`MediaPlatform`] hands out one
//! [`MediaSession`] per room, bundling speech recognition, reply generation,
//! speech synthesis and the room's broadcast channel. All calls may block.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::DebateError;
use crate::persona::PersonaProfile;
use crate::prompt::ComposedPrompt;
use crate::resolver::DebateConfiguration;

/// Speech recognizer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerConfig {
    pub model: String,
    pub language: String,
}

/// Reasoning (reply generation) settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningSettings {
    pub model: String,
    pub api_base: String,
    pub api_key: String,
    pub max_completion_tokens: u32,
}

/// Speech synthesizer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizerConfig {
    pub model: String,
    /// `None` uses the synthesizer's default voice.
    pub voice_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseSuppression {
    Disabled,
    /// Background voice cancellation.
    BackgroundVoice,
}

/// Everything needed to start the persona's media session.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub room: String,
    pub persona_name: String,
    pub instructions: ComposedPrompt,
    pub recognizer: RecognizerConfig,
    pub reasoning: ReasoningSettings,
    pub synthesizer: SynthesizerConfig,
    pub noise_suppression: NoiseSuppression,
}

impl SessionRequest {
    pub fn for_debate(
        settings: &Config,
        persona: &PersonaProfile,
        config: &DebateConfiguration,
        instructions: ComposedPrompt,
    ) -> Self {
        let (api_base, api_key, model) = settings.reasoning_endpoint();
        Self {
            room: config.room().to_string(),
            persona_name: persona.display_name.clone(),
            instructions,
            recognizer: RecognizerConfig {
                model: settings.models.stt_model.clone(),
                language: settings.models.stt_language.clone(),
            },
            reasoning: ReasoningSettings {
                model,
                api_base,
                api_key,
                max_completion_tokens: settings.models.max_completion_tokens,
            },
            synthesizer: SynthesizerConfig {
                model: settings.models.tts_model.clone(),
                voice_id: persona.voice_id.clone(),
            },
            noise_suppression: if settings.session.noise_suppression {
                NoiseSuppression::BackgroundVoice
            } else {
                NoiseSuppression::Disabled
            },
        }
    }
}

/// Source of media sessions.
#[async_trait]
pub trait MediaPlatform: Send + Sync {
    /// Acquire a session for the persona described by `request`.
    async fn start(&self, request: SessionRequest) -> Result<Box<dyn MediaSession>, DebateError>;
}

/// One live media session, exclusively owned by its orchestrator.
#[async_trait]
pub trait MediaSession: Send {
    /// Connect the media transport to the room.
    async fn connect(&mut self) -> Result<(), DebateError>;

    /// Produce (and speak) the persona's next utterance. `instructions`
    /// apply to this reply only; otherwise the conversation so far is used.
    async fn generate_reply(&mut self, instructions: Option<&str>) -> Result<String, DebateError>;

    /// Listen for human speech for at most `window`. `Ok(None)` when nothing
    /// was said.
    async fn listen_and_transcribe(&mut self, window: Duration)
    -> Result<Option<String>, DebateError>;

    /// Publish a payload on the room's broadcast channel.
    async fn publish(&mut self, payload: Vec<u8>, topic: &str, reliable: bool)
    -> Result<(), DebateError>;

    /// Release the session.
    async fn close(&mut self) -> Result<(), DebateError>;
}
