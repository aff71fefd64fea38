//! AI persona definitions.
//!
//! Personas are a closed set. Identifiers that match none of them become
//! [`Persona::Unknown`], which still yields a usable (generic) debater so a
//! misconfigured room can start.

use std::fmt;

use crate::config::VoicesConfig;

/// A known persona, or the raw identifier of an unknown one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Persona {
    Socrates,
    Einstein,
    Trump,
    Shakespeare,
    Tesla,
    Churchill,
    Gandhi,
    SteveJobs,
    Unknown(String),
}

impl Persona {
    /// Every known persona, in menu order.
    pub const KNOWN: [Persona; 8] = [
        Persona::Socrates,
        Persona::Einstein,
        Persona::Trump,
        Persona::Shakespeare,
        Persona::Tesla,
        Persona::Churchill,
        Persona::Gandhi,
        Persona::SteveJobs,
    ];

    /// Resolve an identifier: a short key (`socrates`) or a display name
    /// (`AI Socrates`), case-insensitive.
    pub fn from_id(id: &str) -> Persona {
        let needle = id.trim();
        Self::KNOWN
            .into_iter()
            .find(|p| {
                p.key().eq_ignore_ascii_case(needle) || p.display_name().eq_ignore_ascii_case(needle)
            })
            .unwrap_or_else(|| Persona::Unknown(needle.to_string()))
    }

    /// Short lowercase key used by the join form and the voice table.
    pub fn key(&self) -> &str {
        match self {
            Persona::Socrates => "socrates",
            Persona::Einstein => "einstein",
            Persona::Trump => "trump",
            Persona::Shakespeare => "shakespeare",
            Persona::Tesla => "tesla",
            Persona::Churchill => "churchill",
            Persona::Gandhi => "gandhi",
            Persona::SteveJobs => "jobs",
            Persona::Unknown(id) => id,
        }
    }

    /// Name shown to participants. Unknown identifiers pass through unchanged.
    pub fn display_name(&self) -> &str {
        match self {
            Persona::Socrates => "AI Socrates",
            Persona::Einstein => "AI Einstein",
            Persona::Trump => "AI Trump",
            Persona::Shakespeare => "AI Shakespeare",
            Persona::Tesla => "AI Tesla",
            Persona::Churchill => "AI Churchill",
            Persona::Gandhi => "AI Gandhi",
            Persona::SteveJobs => "AI Steve Jobs",
            Persona::Unknown(id) => id,
        }
    }

    /// Character instructions the composed prompt starts from.
    pub fn base_instructions(&self) -> String {
        let text = match self {
            Persona::Socrates => {
                "You are Socrates, the ancient Greek philosopher. Use the Socratic method to question assumptions and draw analogies from ancient Greece. Be wise, thoughtful, and always seek deeper understanding through questioning."
            }
            Persona::Einstein => {
                "You are Albert Einstein, the theoretical physicist. Speak with scientific precision, use analogies from physics and mathematics, and emphasize the importance of imagination and curiosity in discovery."
            }
            Persona::Trump => {
                "You are Donald Trump, former US President. Speak with confidence and directness, use simple language, make bold statements, and focus on practical solutions and American values."
            }
            Persona::Shakespeare => {
                "You are William Shakespeare, the English playwright. Use eloquent language, poetic expressions, and draw from your vast knowledge of human nature and dramatic storytelling."
            }
            Persona::Tesla => {
                "You are Nikola Tesla, the inventor and engineer. Focus on innovation, electricity, wireless technology, and the future of human progress through scientific advancement."
            }
            Persona::Churchill => {
                "You are Winston Churchill, the British Prime Minister. Speak with determination, use powerful rhetoric, emphasize courage and resilience, and draw from historical wisdom."
            }
            Persona::Gandhi => {
                "You are Mahatma Gandhi, the Indian independence leader. Emphasize peace, non-violence, truth, and the power of moral courage and spiritual strength."
            }
            Persona::SteveJobs => {
                "You are Steve Jobs, Apple co-founder. Focus on innovation, design, user experience, and the intersection of technology and the humanities. Be visionary and inspiring."
            }
            Persona::Unknown(id) => return format!("You are {}, an AI debater.", id),
        };
        text.to_string()
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Persona::Unknown(_))
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Everything the orchestrator needs about one persona.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaProfile {
    pub persona: Persona,
    pub display_name: String,
    pub base_instructions: String,
    /// `None` leaves the synthesizer on its default voice.
    pub voice_id: Option<String>,
}

/// Read-only persona lookup, built once per process.
#[derive(Debug, Clone, Default)]
pub struct PersonaRegistry {
    voices: VoicesConfig,
}

impl PersonaRegistry {
    pub fn new(voices: VoicesConfig) -> Self {
        Self { voices }
    }

    /// Look up a persona. Never fails: unknown ids get a generic profile.
    pub fn lookup(&self, persona_id: &str) -> PersonaProfile {
        let persona = Persona::from_id(persona_id);
        let voice_id = if persona.is_known() {
            self.voices.get(persona.key()).map(str::to_string)
        } else {
            None
        };

        PersonaProfile {
            display_name: persona.display_name().to_string(),
            base_instructions: persona.base_instructions(),
            voice_id,
            persona,
        }
    }

    /// Known personas with their keys, for listings.
    pub fn known(&self) -> Vec<PersonaProfile> {
        Persona::KNOWN.iter().map(|p| self.lookup(p.key())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_and_display_name_lookup() {
        assert_eq!(Persona::from_id("socrates"), Persona::Socrates);
        assert_eq!(Persona::from_id("AI Socrates"), Persona::Socrates);
        assert_eq!(Persona::from_id("jobs"), Persona::SteveJobs);
        assert_eq!(Persona::from_id("ai steve jobs"), Persona::SteveJobs);
    }

    #[test]
    fn test_unknown_persona_passes_through() {
        let persona = Persona::from_id("ada");
        assert_eq!(persona, Persona::Unknown("ada".to_string()));
        assert_eq!(persona.display_name(), "ada");
        assert!(!persona.is_known());
    }

    #[test]
    fn test_registry_assigns_voices() {
        let registry = PersonaRegistry::new(VoicesConfig::default());
        let profile = registry.lookup("socrates");
        assert_eq!(profile.display_name, "AI Socrates");
        assert!(profile.base_instructions.contains("Socrates"));
        assert_eq!(
            profile.voice_id.as_deref(),
            Some("a2b37e34-0712-44c4-a2c9-222222222222")
        );
    }

    #[test]
    fn test_registry_fallback_profile() {
        let registry = PersonaRegistry::new(VoicesConfig::default());
        let profile = registry.lookup("Ada Lovelace");
        assert_eq!(profile.display_name, "Ada Lovelace");
        assert_eq!(
            profile.base_instructions,
            "You are Ada Lovelace, an AI debater."
        );
        assert_eq!(profile.voice_id, None);
    }

    #[test]
    fn test_known_listing() {
        let registry = PersonaRegistry::default();
        let known = registry.known();
        assert_eq!(known.len(), 8);
        assert!(known.iter().all(|p| p.persona.is_known()));
    }
}
