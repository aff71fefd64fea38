//! Configuration module for the debate agent's process settings.
//!
//! Settings come from an optional TOML file and are then overlaid with
//! environment variables through [`Config::apply_env`]. Per-debate
//! parameters live in [`crate::resolver`].

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::DebateError;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub models: ModelsConfig,
    pub reasoning: ReasoningConfig,
    pub voices: VoicesConfig,
    pub relay: RelayConfig,
    pub session: SessionConfig,
}

/// Model identifiers for the media session's capabilities.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub stt_model: String,
    pub stt_language: String,
    pub llm_model: String,
    pub tts_model: String,
    pub max_completion_tokens: u32,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            stt_model: "nova-3".to_string(),
            stt_language: "multi".to_string(),
            llm_model: "gpt-4o-mini".to_string(),
            tts_model: "sonic-2".to_string(),
            max_completion_tokens: 350,
        }
    }
}

/// Endpoint for the OpenAI-compatible reasoning capability.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    pub api_base: String,
    pub api_key: String,
    /// Route reasoning through OpenRouter when a key is present.
    pub use_openrouter: bool,
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: String,
    pub openrouter_api_base: String,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            use_openrouter: false,
            openrouter_api_key: None,
            openrouter_model: "mistralai/mistral-small-3.2-24b-instruct:free".to_string(),
            openrouter_api_base: "https://openrouter.ai/api/v1".to_string(),
        }
    }
}

/// Synthetic voice ids keyed by persona key (e.g. `socrates`).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct VoicesConfig(pub BTreeMap<String, String>);

impl VoicesConfig {
    pub fn get(&self, persona_key: &str) -> Option<&str> {
        self.0.get(persona_key).map(String::as_str)
    }
}

impl Default for VoicesConfig {
    fn default() -> Self {
        let voices = [
            ("socrates", "a2b37e34-0712-44c4-a2c9-222222222222"),
            ("einstein", "b3c48f45-1823-55d5-b3d0-333333333333"),
            ("trump", "c4d59g56-2934-66e6-c4e1-444444444444"),
            ("shakespeare", "d5e60h67-3045-77f7-d5f2-555555555555"),
            ("tesla", "e6f71i78-4156-88g8-e6g3-666666666666"),
            ("churchill", "f7g82j89-5267-99h9-f7h4-777777777777"),
            ("gandhi", "g8h93k90-6378-00i0-g8i5-888888888888"),
            ("jobs", "h9i04l01-7489-11j1-h9j6-999999999999"),
        ];
        Self(
            voices
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Broadcast channel settings for chat relay.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub topic: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            topic: "lk.chat".to_string(),
        }
    }
}

/// Media session options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub noise_suppression: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            noise_suppression: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        default_config()
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DebateError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| DebateError::ConfigError(format!("Failed to read config: {}", e)))?;

        Self::from_str(&content)
    }

    /// Load configuration from string content.
    pub fn from_str(content: &str) -> Result<Self, DebateError> {
        let mut config: Config = toml::from_str(content)
            .map_err(|e| DebateError::ConfigError(format!("Failed to parse config: {}", e)))?;

        // A partial [voices] table only overrides the personas it names.
        let mut voices = VoicesConfig::default();
        voices.0.append(&mut config.voices.0);
        config.voices = voices;
        Ok(config)
    }

    /// Overlay environment variables, read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("STT_MODEL") {
            self.models.stt_model = v;
        }
        if let Some(v) = non_empty("LLM_MODEL") {
            self.models.llm_model = v;
        }
        if let Some(v) = non_empty("TTS_MODEL") {
            self.models.tts_model = v;
        }
        if let Some(v) = non_empty("OPENAI_API_BASE").or_else(|| non_empty("OPENAI_BASE_URL")) {
            self.reasoning.api_base = v;
        }
        if let Some(v) = non_empty("OPENAI_API_KEY") {
            self.reasoning.api_key = v;
        }
        if let Some(v) = non_empty("OPENROUTER_API_KEY") {
            self.reasoning.openrouter_api_key = Some(v);
        }
        if let Some(v) = non_empty("USE_OPENROUTER") {
            self.reasoning.use_openrouter = v.eq_ignore_ascii_case("true");
        }

        let keys: Vec<String> = self.voices.0.keys().cloned().collect();
        for key in keys {
            if let Some(v) = non_empty(&format!("VOICE_{}", key.to_uppercase())) {
                self.voices.0.insert(key, v);
            }
        }
    }

    /// Reasoning endpoint actually used: (api_base, api_key, model).
    pub fn reasoning_endpoint(&self) -> (String, String, String) {
        match (&self.reasoning.openrouter_api_key, self.reasoning.use_openrouter) {
            (Some(key), true) => (
                self.reasoning.openrouter_api_base.clone(),
                key.clone(),
                self.reasoning.openrouter_model.clone(),
            ),
            _ => (
                self.reasoning.api_base.clone(),
                self.reasoning.api_key.clone(),
                self.models.llm_model.clone(),
            ),
        }
    }
}

/// Default configuration embedded in the binary.
pub fn default_config() -> Config {
    Config {
        models: ModelsConfig::default(),
        reasoning: ReasoningConfig::default(),
        voices: VoicesConfig::default(),
        relay: RelayConfig::default(),
        session: SessionConfig::default(),
    }
}
