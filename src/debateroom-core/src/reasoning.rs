//! OpenAI-compatible reasoning client.
//!
//! Keeps the persona's conversation history so replies without explicit
//! instructions continue from everything said so far.

use std::time::Duration;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
    CreateChatCompletionRequestArgs,
};
use regex::Regex;
use tracing::{debug, warn};

use crate::error::DebateError;
use crate::session::ReasoningSettings;

const MAX_RETRIES: u32 = 3;

/// Nudge sent when a reply is requested without new human input.
const CONTINUE_PROMPT: &str =
    "Continue the debate: advance your position and answer your opponent's latest points.";

/// Conversational reasoning capability for one persona.
pub struct ChatReasoner {
    client: Client<OpenAIConfig>,
    settings: ReasoningSettings,
    history: Vec<ChatCompletionRequestMessage>,
}

impl ChatReasoner {
    pub fn new(settings: ReasoningSettings, instructions: &str) -> Result<Self, DebateError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                DebateError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        let config = OpenAIConfig::new()
            .with_api_key(&settings.api_key)
            .with_api_base(&settings.api_base);

        Ok(Self {
            client: Client::with_config(config).with_http_client(http_client),
            settings,
            history: vec![system_message(instructions)],
        })
    }

    /// Record something the human said.
    pub fn observe_user(&mut self, text: &str) {
        self.history.push(user_message(text));
    }

    /// Number of messages in the conversation, including the system prompt.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Generate the next reply. `instructions` apply to this reply only.
    pub async fn reply(&mut self, instructions: Option<&str>) -> Result<String, DebateError> {
        let mut messages = self.history.clone();
        match instructions {
            Some(text) => messages.push(system_message(text)),
            None if !matches!(messages.last(), Some(ChatCompletionRequestMessage::User(_))) => {
                messages.push(user_message(CONTINUE_PROMPT))
            }
            None => {}
        }

        let raw = self.complete(messages).await?;
        let reply = sanitize_response(&raw);
        if reply.is_empty() {
            return Err(DebateError::Capability(
                "Reasoning capability returned an empty reply".to_string(),
            ));
        }

        self.history
            .push(ChatCompletionRequestMessage::Assistant(
                ChatCompletionRequestAssistantMessage {
                    content: Some(reply.clone().into()),
                    name: None,
                    tool_calls: None,
                    refusal: None,
                    audio: None,
                    function_call: None,
                },
            ));
        Ok(reply)
    }

    /// One completion, retried with exponential backoff.
    async fn complete(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> Result<String, DebateError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.settings.model)
            .max_completion_tokens(self.settings.max_completion_tokens)
            .messages(messages)
            .build()?;

        let mut last_error = None;
        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // 2s, 4s
                let delay = Duration::from_secs(1 << attempt);
                tokio::time::sleep(delay).await;
            }

            match self.client.chat().create(request.clone()).await {
                Ok(response) => {
                    let content = response
                        .choices
                        .first()
                        .and_then(|c| c.message.content.clone())
                        .unwrap_or_default();
                    debug!(model = %self.settings.model, chars = content.len(), "Completion received");
                    return Ok(content);
                }
                Err(e) => {
                    warn!(attempt = attempt + 1, error = %e, "Completion request failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.map(DebateError::from).unwrap_or_else(|| {
            DebateError::Capability("Unknown API error after retries".to_string())
        }))
    }
}

fn system_message(text: &str) -> ChatCompletionRequestMessage {
    ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
        content: text.to_string().into(),
        name: None,
    })
}

fn user_message(text: &str) -> ChatCompletionRequestMessage {
    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
        content: text.to_string().into(),
        name: None,
    })
}

/// Strip reasoning tags, markup and emphasis so the reply can be spoken.
pub fn sanitize_response(response: &str) -> String {
    let tags_to_strip = [
        "thinking",
        "think",
        "reflection",
        "reasoning",
        "thought",
        "scratchpad",
        "plan",
        "analysis",
    ];

    let mut result = response.to_string();

    for tag in &tags_to_strip {
        let pattern = format!(r"(?is)<{tag}[^>]*>.*?</{tag}>", tag = tag);
        if let Ok(re) = Regex::new(&pattern) {
            result = re.replace_all(&result, "").to_string();
        }
    }

    // Orphaned opening/closing tags
    if let Ok(orphan_re) = Regex::new(r"</?[\w]+[^>]*>") {
        result = orphan_re.replace_all(&result, "").to_string();
    }

    result = result.replace('*', "");

    if let Ok(ws_re) = Regex::new(r"\s+") {
        result = ws_re.replace_all(&result, " ").to_string();
    }

    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ReasoningSettings {
        ReasoningSettings {
            model: "gpt-4o-mini".to_string(),
            api_base: "http://127.0.0.1:9/v1".to_string(),
            api_key: "test".to_string(),
            max_completion_tokens: 200,
        }
    }

    #[test]
    fn test_sanitize_thinking_tags() {
        let input = "<thinking>Should I concede?</thinking>I shall not concede.";
        assert_eq!(sanitize_response(input), "I shall not concede.");
    }

    #[test]
    fn test_sanitize_multiline_tags_and_emphasis() {
        let input = "<reasoning>\nstep one\nstep two\n</reasoning>\n\nThis is **plainly** wrong.";
        assert_eq!(sanitize_response(input), "This is plainly wrong.");
    }

    #[test]
    fn test_sanitize_orphan_tags() {
        let input = "Friends <em>and</em> rivals</p>";
        assert_eq!(sanitize_response(input), "Friends and rivals");
    }

    #[test]
    fn test_sanitize_only_reasoning_is_empty() {
        assert_eq!(sanitize_response("<think>nothing to say</think>"), "");
    }

    #[test]
    fn test_history_tracks_human_turns() {
        let mut reasoner = ChatReasoner::new(settings(), "You are Tesla.").unwrap();
        assert_eq!(reasoner.history_len(), 1);
        reasoner.observe_user("Electricity should be free.");
        assert_eq!(reasoner.history_len(), 2);
    }
}
