//! Debate orchestration logic.
//!
//! Drives one room's debate: acquire the media session, introduce the
//! persona, alternate AI and human turns for the configured number of
//! rounds, then release the session. Turn pacing is time-based: every turn
//! is followed by a fixed wait of one turn window, however long the speaker
//! actually talked.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::DebateError;
use crate::participant::Speaker;
use crate::persona::{PersonaProfile, PersonaRegistry};
use crate::prompt::{ComposedPrompt, compose, introduction_instructions};
use crate::relay::{ChatEvent, ChatRelay};
use crate::resolver::DebateConfiguration;
use crate::session::{MediaPlatform, MediaSession, SessionRequest};

/// Lifecycle of a debate session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Starting,
    Introducing,
    AiTurn,
    HumanTurn,
    Closing,
    Closed,
}

/// Events emitted during a debate.
#[derive(Debug, Clone)]
pub enum DebateEvent {
    /// The session entered `state` while on round `round` (zero-based).
    StateChanged { state: SessionState, round: u32 },
    /// An utterance was relayed; `delivered` is false if the broadcast failed.
    Utterance { event: ChatEvent, delivered: bool },
}

/// Callback for debate events.
pub type DebateCallback = Box<dyn Fn(DebateEvent) + Send + Sync>;

/// How a debate ended once its session was closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebateOutcome {
    pub room: String,
    pub rounds_completed: u32,
    pub utterances_relayed: usize,
    pub relay_failures: usize,
    /// Ended by cancellation rather than by running out of rounds.
    pub cancelled: bool,
}

/// Runtime state of the room's debate.
#[derive(Debug, Clone)]
pub struct DebateSession {
    pub configuration: DebateConfiguration,
    pub round: u32,
    pub state: SessionState,
}

/// Orchestrates one debate between the AI persona and the human.
pub struct DebateOrchestrator {
    session: DebateSession,
    persona: PersonaProfile,
    prompt: ComposedPrompt,
    request: SessionRequest,
    platform: Arc<dyn MediaPlatform>,
    relay: ChatRelay,
    callback: Option<DebateCallback>,
    rounds_completed: u32,
    utterances_relayed: usize,
    relay_failures: usize,
}

impl DebateOrchestrator {
    /// Create an orchestrator for a resolved configuration.
    pub fn new(
        configuration: DebateConfiguration,
        registry: &PersonaRegistry,
        settings: &Config,
        platform: Arc<dyn MediaPlatform>,
    ) -> Self {
        let persona = registry.lookup(configuration.persona_id());
        let prompt = compose(&persona, &configuration);
        let request = SessionRequest::for_debate(settings, &persona, &configuration, prompt.clone());

        Self {
            session: DebateSession {
                configuration,
                round: 0,
                state: SessionState::Created,
            },
            persona,
            prompt,
            request,
            platform,
            relay: ChatRelay::new(settings.relay.topic.clone()),
            callback: None,
            rounds_completed: 0,
            utterances_relayed: 0,
            relay_failures: 0,
        }
    }

    /// Set a callback for debate events.
    pub fn with_callback(mut self, callback: DebateCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    pub fn configuration(&self) -> &DebateConfiguration {
        &self.session.configuration
    }

    pub fn persona(&self) -> &PersonaProfile {
        &self.persona
    }

    pub fn prompt(&self) -> &ComposedPrompt {
        &self.prompt
    }

    /// Run the debate to completion or until `cancel` fires.
    ///
    /// Only configuration and session-acquisition failures are returned as
    /// errors. Once a session has been acquired it is always closed.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<DebateOutcome, DebateError> {
        let config = &self.session.configuration;
        info!(
            room = config.room(),
            topic = config.topic(),
            persona = %self.persona.display_name,
            human_stance = %config.human_stance(),
            ai_stance = %config.ai_stance(),
            turn_secs = config.turn_duration_secs(),
            rounds = config.total_rounds(),
            "Starting debate"
        );

        self.transition(SessionState::Starting);
        let platform = Arc::clone(&self.platform);
        let started = until_cancelled(&cancel, platform.start(self.request.clone())).await;

        let mut session = match started {
            None => {
                info!(room = self.room(), "Debate cancelled before the session started");
                self.transition(SessionState::Closed);
                return Ok(self.outcome(true));
            }
            Some(Err(e)) => {
                error!(room = self.room(), error = %e, "Failed to start media session");
                return Err(DebateError::CapabilityAcquisition(e.to_string()));
            }
            Some(Ok(session)) => session,
        };

        let driven = self.drive(session.as_mut(), &cancel).await;

        self.transition(SessionState::Closing);
        if let Err(e) = session.close().await {
            warn!(room = self.room(), error = %e, "Failed to close media session");
        }
        self.transition(SessionState::Closed);

        let cancelled = driven?;
        if cancelled {
            info!(room = self.room(), rounds = self.rounds_completed, "Debate cancelled");
        } else {
            info!(room = self.room(), "Debate complete");
        }
        Ok(self.outcome(cancelled))
    }

    /// Introduction and round loop. Returns whether the debate was cancelled.
    async fn drive(
        &mut self,
        session: &mut dyn MediaSession,
        cancel: &CancellationToken,
    ) -> Result<bool, DebateError> {
        self.transition(SessionState::Introducing);
        match until_cancelled(cancel, session.connect()).await {
            None => return Ok(true),
            Some(Err(e)) => {
                error!(room = self.room(), error = %e, "Failed to connect media transport");
                return Err(DebateError::CapabilityAcquisition(format!(
                    "Failed to connect to room: {}",
                    e
                )));
            }
            Some(Ok(())) => {}
        }

        let intro = introduction_instructions(&self.persona, &self.session.configuration);
        match until_cancelled(cancel, session.generate_reply(Some(&intro))).await {
            None => return Ok(true),
            Some(reply) => self.relay_reply(session, reply).await,
        }

        let window = self.session.configuration.turn_duration();
        for round in 0..self.session.configuration.total_rounds() {
            self.session.round = round;

            self.transition(SessionState::AiTurn);
            match until_cancelled(cancel, session.generate_reply(None)).await {
                None => return Ok(true),
                Some(reply) => self.relay_reply(session, reply).await,
            }
            if until_cancelled(cancel, tokio::time::sleep(window)).await.is_none() {
                return Ok(true);
            }

            self.transition(SessionState::HumanTurn);
            let heard = tokio::time::timeout(window, session.listen_and_transcribe(window));
            match until_cancelled(cancel, heard).await {
                None => return Ok(true),
                Some(Ok(Ok(Some(text)))) if !text.trim().is_empty() => {
                    self.relay_utterance(session, Speaker::User, text).await;
                }
                Some(Ok(Ok(_))) | Some(Err(_)) => {
                    debug!(room = self.room(), round, "No speech detected this turn");
                }
                Some(Ok(Err(e))) => {
                    warn!(room = self.room(), round, error = %e, "Transcription failed");
                }
            }
            if until_cancelled(cancel, tokio::time::sleep(window)).await.is_none() {
                return Ok(true);
            }

            self.rounds_completed = round + 1;
        }

        Ok(false)
    }

    /// Relay a persona reply, or log why there is nothing to relay.
    async fn relay_reply(
        &mut self,
        session: &mut dyn MediaSession,
        reply: Result<String, DebateError>,
    ) {
        match reply {
            Ok(text) if !text.trim().is_empty() => {
                let sender = Speaker::Persona(self.persona.display_name.clone());
                self.relay_utterance(session, sender, text).await;
            }
            Ok(_) => warn!(room = self.room(), state = ?self.session.state, "Empty reply; nothing to relay"),
            Err(e) => warn!(
                room = self.room(),
                state = ?self.session.state,
                error = %e,
                "Reply generation failed"
            ),
        }
    }

    async fn relay_utterance(&mut self, session: &mut dyn MediaSession, sender: Speaker, text: String) {
        let event = ChatEvent::new(sender, text);
        let delivered = self.relay.relay(session, &event).await;
        if delivered {
            self.utterances_relayed += 1;
        } else {
            self.relay_failures += 1;
        }
        self.emit_event(DebateEvent::Utterance { event, delivered });
    }

    fn transition(&mut self, state: SessionState) {
        self.session.state = state;
        debug!(room = self.room(), ?state, round = self.session.round, "State transition");
        self.emit_event(DebateEvent::StateChanged {
            state,
            round: self.session.round,
        });
    }

    /// Emit an event if a callback is registered.
    fn emit_event(&self, event: DebateEvent) {
        if let Some(ref callback) = self.callback {
            callback(event);
        }
    }

    fn room(&self) -> &str {
        self.session.configuration.room()
    }

    fn outcome(&self, cancelled: bool) -> DebateOutcome {
        DebateOutcome {
            room: self.room().to_string(),
            rounds_completed: self.rounds_completed,
            utterances_relayed: self.utterances_relayed,
            relay_failures: self.relay_failures,
            cancelled,
        }
    }
}

/// Await `fut` unless `cancel` fires first.
async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}
