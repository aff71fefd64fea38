//! Text-mode media session.
//!
//! Stands in for the real-time media platform when debating from a
//! terminal: typed lines are the human's "speech", the broadcast channel is
//! stdout, and replies come from the OpenAI-compatible reasoning client.

use std::time::Duration;

use async_trait::async_trait;
use colored::Colorize;
use debateroom_core::session::NoiseSuppression;
use debateroom_core::{
    ChatPayload, ChatReasoner, DebateError, MediaPlatform, MediaSession, SessionRequest, Speaker,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info};

/// Hands out console sessions.
pub struct ConsolePlatform;

#[async_trait]
impl MediaPlatform for ConsolePlatform {
    async fn start(&self, request: SessionRequest) -> Result<Box<dyn MediaSession>, DebateError> {
        let reasoner = ChatReasoner::new(request.reasoning.clone(), request.instructions.as_str())?;

        info!(
            room = %request.room,
            persona = %request.persona_name,
            stt = %request.recognizer.model,
            llm = %request.reasoning.model,
            tts = %request.synthesizer.model,
            voice = request.synthesizer.voice_id.as_deref().unwrap_or("default"),
            noise_suppression = request.noise_suppression != NoiseSuppression::Disabled,
            "Console session created"
        );

        Ok(Box::new(ConsoleSession {
            room: request.room,
            persona_name: request.persona_name,
            reasoner,
            input: BufReader::new(tokio::io::stdin()).lines(),
        }))
    }
}

struct ConsoleSession {
    room: String,
    persona_name: String,
    reasoner: ChatReasoner,
    input: Lines<BufReader<Stdin>>,
}

#[async_trait]
impl MediaSession for ConsoleSession {
    async fn connect(&mut self) -> Result<(), DebateError> {
        println!(
            "{} {}",
            "Connected to room".dimmed(),
            self.room.bright_white().bold()
        );
        println!();
        Ok(())
    }

    async fn generate_reply(&mut self, instructions: Option<&str>) -> Result<String, DebateError> {
        println!("{}", format!("  {} is speaking...", self.persona_name).dimmed());
        self.reasoner.reply(instructions).await
    }

    async fn listen_and_transcribe(
        &mut self,
        window: Duration,
    ) -> Result<Option<String>, DebateError> {
        println!(
            "{}",
            format!("  Your turn: type your argument ({}s)", window.as_secs()).bright_green()
        );

        match tokio::time::timeout(window, self.input.next_line()).await {
            Ok(Ok(Some(line))) => {
                let line = line.trim();
                if line.is_empty() {
                    return Ok(None);
                }
                self.reasoner.observe_user(line);
                Ok(Some(line.to_string()))
            }
            Ok(Ok(None)) => {
                debug!("stdin closed");
                Ok(None)
            }
            Ok(Err(e)) => Err(DebateError::Capability(format!("Failed to read input: {}", e))),
            Err(_) => Ok(None),
        }
    }

    async fn publish(
        &mut self,
        payload: Vec<u8>,
        topic: &str,
        _reliable: bool,
    ) -> Result<(), DebateError> {
        let chat = ChatPayload::decode(&payload)?;
        debug!(topic, sender = %chat.sender, "Publishing chat message");

        let sender = if chat.sender == Speaker::USER_LABEL {
            chat.sender.bright_green().bold()
        } else {
            chat.sender.bright_cyan().bold()
        };
        println!("{} {}", "▶".bright_cyan(), sender);
        for line in textwrap(&chat.message, 66).lines() {
            println!("  {}", line);
        }
        println!();
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DebateError> {
        println!("{}", format!("Left room {}", self.room).dimmed());
        Ok(())
    }
}

/// Simple text wrapping function.
fn textwrap(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut current_line_len = 0;

    for word in text.split_whitespace() {
        if current_line_len + word.len() + 1 > width && current_line_len > 0 {
            result.push('\n');
            current_line_len = 0;
        }
        if current_line_len > 0 {
            result.push(' ');
            current_line_len += 1;
        }
        result.push_str(word);
        current_line_len += word.len();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_textwrap_width() {
        let wrapped = textwrap("one two three four five six", 10);
        assert_eq!(wrapped, "one two\nthree four\nfive six");
    }

    #[test]
    fn test_textwrap_long_word() {
        assert_eq!(textwrap("supercalifragilistic", 5), "supercalifragilistic");
    }
}
