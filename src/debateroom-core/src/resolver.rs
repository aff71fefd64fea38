//! Resolution of inbound debate parameters into a [`DebateConfiguration`].

use std::time::Duration;

use serde::Deserialize;

use crate::error::DebateError;
use crate::participant::Stance;

pub const DEFAULT_TOPIC: &str = "AI Debate";
pub const DEFAULT_PERSONA: &str = "socrates";
pub const DEFAULT_TURN_MINUTES: u32 = 3;
pub const DEFAULT_TOTAL_ROUNDS: u32 = 4;

/// Debate parameters as delivered to the agent (`ROOM_METADATA`).
///
/// Every field is optional here; [`resolve`] applies defaults and rejects
/// what cannot be defaulted.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RawDebateParameters {
    pub room: Option<String>,
    pub topic: Option<String>,
    #[serde(alias = "personaId")]
    pub persona: Option<String>,
    #[serde(alias = "humanStance")]
    pub stance: Option<String>,
    #[serde(alias = "turnDuration", alias = "turnDurationMinutes")]
    pub turn_duration_min: Option<u32>,
    #[serde(alias = "numberOfTurns", alias = "totalRounds")]
    pub total_rounds: Option<u32>,
}

impl RawDebateParameters {
    /// Parse the JSON metadata record.
    pub fn from_json(json: &str) -> Result<Self, DebateError> {
        serde_json::from_str(json)
            .map_err(|e| DebateError::ConfigError(format!("Invalid room metadata: {}", e)))
    }

    /// Fields set in `overrides` replace the ones in `self`.
    pub fn merge(self, overrides: RawDebateParameters) -> Self {
        Self {
            room: overrides.room.or(self.room),
            topic: overrides.topic.or(self.topic),
            persona: overrides.persona.or(self.persona),
            stance: overrides.stance.or(self.stance),
            turn_duration_min: overrides.turn_duration_min.or(self.turn_duration_min),
            total_rounds: overrides.total_rounds.or(self.total_rounds),
        }
    }
}

/// Canonical, immutable debate configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebateConfiguration {
    room: String,
    topic: String,
    persona_id: String,
    human_stance: Stance,
    turn_duration_secs: u64,
    total_rounds: u32,
}

impl DebateConfiguration {
    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn persona_id(&self) -> &str {
        &self.persona_id
    }

    pub fn human_stance(&self) -> Stance {
        self.human_stance
    }

    /// Always the complement of the human's stance.
    pub fn ai_stance(&self) -> Stance {
        self.human_stance.opposite()
    }

    pub fn turn_duration_secs(&self) -> u64 {
        self.turn_duration_secs
    }

    pub fn turn_duration(&self) -> Duration {
        Duration::from_secs(self.turn_duration_secs)
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    /// Scheduled pacing time of the round loop, excluding capability latency.
    pub fn scheduled_duration(&self) -> Duration {
        self.turn_duration()
            .saturating_mul(2)
            .saturating_mul(self.total_rounds)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Validate and normalize raw parameters.
pub fn resolve(raw: &RawDebateParameters) -> Result<DebateConfiguration, DebateError> {
    let room = non_blank(&raw.room)
        .ok_or_else(|| DebateError::ConfigError("A room identifier is required".to_string()))?;

    let human_stance = match non_blank(&raw.stance) {
        Some(code) => code.parse::<Stance>()?,
        None => Stance::For,
    };

    let minutes = raw.turn_duration_min.unwrap_or(DEFAULT_TURN_MINUTES);
    if minutes == 0 {
        return Err(DebateError::ConfigError(
            "Turn duration must be at least one minute".to_string(),
        ));
    }

    Ok(DebateConfiguration {
        room: room.to_string(),
        topic: non_blank(&raw.topic).unwrap_or(DEFAULT_TOPIC).to_string(),
        persona_id: non_blank(&raw.persona).unwrap_or(DEFAULT_PERSONA).to_string(),
        human_stance,
        turn_duration_secs: u64::from(minutes) * 60,
        total_rounds: raw.total_rounds.unwrap_or(DEFAULT_TOTAL_ROUNDS),
    })
}
