//! Prompt composition for the AI persona.

use std::fmt;

use crate::persona::PersonaProfile;
use crate::resolver::DebateConfiguration;

/// Operating instructions handed to the reasoning capability at session start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt(String);

impl ComposedPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ComposedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Combine persona instructions with the debate context. Deterministic.
pub fn compose(persona: &PersonaProfile, config: &DebateConfiguration) -> ComposedPrompt {
    ComposedPrompt(format!(
        "{}\n\n\
         You are participating in a debate about: '{}'.\n\
         Your assigned stance is: {}.\n\
         The human participant will argue {}.\n\
         Stay in character, provide thoughtful arguments for your side, and respond to the human's points.",
        persona.base_instructions,
        config.topic(),
        config.ai_stance().phrase(),
        config.human_stance().phrase(),
    ))
}

/// One-off instructions for the opening utterance.
pub fn introduction_instructions(persona: &PersonaProfile, config: &DebateConfiguration) -> String {
    format!(
        "Introduce yourself as {}, state your assigned stance ({}) on the topic: '{}', and invite the human to begin the debate.",
        persona.display_name,
        config.ai_stance().phrase(),
        config.topic(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::PersonaRegistry;
    use crate::resolver::{RawDebateParameters, resolve};

    fn configuration(persona: &str, stance: &str) -> DebateConfiguration {
        resolve(&RawDebateParameters {
            room: Some("room".to_string()),
            topic: Some("Should AI regulate itself?".to_string()),
            persona: Some(persona.to_string()),
            stance: Some(stance.to_string()),
            turn_duration_min: Some(1),
            total_rounds: Some(2),
        })
        .unwrap()
    }

    #[test]
    fn test_compose_order_and_stances() {
        let config = configuration("socrates", "pro");
        let persona = PersonaRegistry::default().lookup(config.persona_id());
        let prompt = compose(&persona, &config);
        let text = prompt.as_str();

        assert!(text.starts_with(&persona.base_instructions));
        assert!(text.contains("Socrates"));
        assert!(text.contains("'Should AI regulate itself?'"));
        assert!(text.contains("Your assigned stance is: against."));
        assert!(text.contains("The human participant will argue in favor of."));

        let topic_at = text.find("debate about").unwrap();
        let ai_at = text.find("Your assigned stance").unwrap();
        let human_at = text.find("The human participant").unwrap();
        let character_at = text.find("Stay in character").unwrap();
        assert!(topic_at < ai_at && ai_at < human_at && human_at < character_at);
    }

    #[test]
    fn test_compose_is_reproducible() {
        let config = configuration("tesla", "con");
        let persona = PersonaRegistry::default().lookup(config.persona_id());
        assert_eq!(compose(&persona, &config), compose(&persona, &config));
        assert!(compose(&persona, &config).as_str().contains("Your assigned stance is: in favor of."));
    }

    #[test]
    fn test_unknown_persona_prompt() {
        let config = configuration("hypatia", "pro");
        let persona = PersonaRegistry::default().lookup(config.persona_id());
        let prompt = compose(&persona, &config);
        assert!(prompt.as_str().starts_with("You are hypatia, an AI debater."));
    }

    #[test]
    fn test_introduction_instructions() {
        let config = configuration("einstein", "pro");
        let persona = PersonaRegistry::default().lookup(config.persona_id());
        assert_eq!(
            introduction_instructions(&persona, &config),
            "Introduce yourself as AI Einstein, state your assigned stance (against) on the topic: \
             'Should AI regulate itself?', and invite the human to begin the debate."
        );
    }
}
