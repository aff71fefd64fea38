//! Debate participants and their stances.
//!
//! A debate room always has exactly two speakers: the AI persona and the
//! human. Their stances are complementary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DebateError;

/// Position a participant argues. Strictly binary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    /// Arguing in favor of the topic ("pro").
    For,
    /// Arguing against the topic ("con").
    Against,
}

impl Stance {
    /// The stance the other side of the debate must take.
    pub fn opposite(self) -> Stance {
        match self {
            Stance::For => Stance::Against,
            Stance::Against => Stance::For,
        }
    }

    /// Phrase used when framing the stance in prompts.
    pub fn phrase(self) -> &'static str {
        match self {
            Stance::For => "in favor of",
            Stance::Against => "against",
        }
    }

    /// Short wire code used by the join form.
    pub fn code(self) -> &'static str {
        match self {
            Stance::For => "pro",
            Stance::Against => "con",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Stance::For => "FOR",
            Stance::Against => "AGAINST",
        }
    }
}

impl FromStr for Stance {
    type Err = DebateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pro" | "for" => Ok(Stance::For),
            "con" | "against" => Ok(Stance::Against),
            other => Err(DebateError::ConfigError(format!(
                "Unknown stance '{}': expected 'pro' or 'con'",
                other
            ))),
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Sender label attached to relayed chat events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Speaker {
    /// The AI persona, labelled with its display name.
    Persona(String),
    /// The human participant.
    User,
}

impl Speaker {
    pub const USER_LABEL: &'static str = "User";

    pub fn label(&self) -> &str {
        match self {
            Speaker::Persona(name) => name,
            Speaker::User => Self::USER_LABEL,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Speaker::User)
    }
}
