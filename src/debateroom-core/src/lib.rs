//! DebateRoom Core Library
//!
//! Turn scheduling and session orchestration for a timed debate between one
//! human and one AI persona over a real-time media session.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod participant;
pub mod persona;
pub mod prompt;
pub mod reasoning;
pub mod relay;
pub mod resolver;
pub mod session;
pub mod supervisor;

#[cfg(test)]
mod testing;

pub use config::{Config, default_config};
pub use error::DebateError;
pub use orchestrator::{
    DebateCallback, DebateEvent, DebateOrchestrator, DebateOutcome, SessionState,
};
pub use participant::{Speaker, Stance};
pub use persona::{Persona, PersonaProfile, PersonaRegistry};
pub use prompt::{ComposedPrompt, compose, introduction_instructions};
pub use reasoning::ChatReasoner;
pub use relay::{ChatEvent, ChatPayload, ChatRelay};
pub use resolver::{DebateConfiguration, RawDebateParameters, resolve};
pub use session::{MediaPlatform, MediaSession, SessionRequest};
pub use supervisor::DebateSupervisor;
