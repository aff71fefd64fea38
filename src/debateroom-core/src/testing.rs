//! Scripted in-memory media platform for tests.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::default_config;
use crate::error::DebateError;
use crate::persona::PersonaRegistry;
use crate::prompt::compose;
use crate::relay::ChatPayload;
use crate::resolver::{RawDebateParameters, resolve};
use crate::session::{MediaPlatform, MediaSession, SessionRequest};

/// What the scripted session answers. Indices count calls of that kind.
#[derive(Debug, Clone, Default)]
pub(crate) struct Script {
    /// Replies in order; once exhausted, replies are "reply <n>".
    pub replies: Vec<String>,
    /// Transcripts in order; once exhausted, nothing is heard.
    pub transcripts: Vec<Option<String>>,
    pub failing_replies: Vec<usize>,
    pub failing_listens: Vec<usize>,
    pub failing_publishes: Vec<usize>,
    pub fail_start: bool,
    pub fail_connect: bool,
    pub fail_close: bool,
    /// Listening never returns on its own.
    pub listen_hangs: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Start,
    Connect,
    GenerateReply(Option<String>),
    Listen(Duration),
    Publish,
    Close,
}

#[derive(Debug, Clone)]
pub(crate) struct Published {
    pub topic: String,
    pub reliable: bool,
    pub payload: ChatPayload,
}

#[derive(Debug, Default)]
struct RecorderState {
    calls: Vec<Call>,
    published: Vec<Published>,
    requests: Vec<SessionRequest>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Recorder(Arc<Mutex<RecorderState>>);

impl Recorder {
    fn lock(&self) -> MutexGuard<'_, RecorderState> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn published(&self) -> Vec<Published> {
        self.lock().published.clone()
    }

    pub fn requests(&self) -> Vec<SessionRequest> {
        self.lock().requests.clone()
    }

    pub fn count(&self, matcher: impl Fn(&Call) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| matcher(c)).count()
    }

    pub fn closed(&self) -> bool {
        self.count(|c| *c == Call::Close) > 0
    }

    fn record(&self, call: Call) {
        self.lock().calls.push(call);
    }
}

pub(crate) struct ScriptedPlatform {
    script: Script,
    recorder: Recorder,
}

impl ScriptedPlatform {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            recorder: Recorder::default(),
        }
    }

    pub fn recorder(&self) -> Recorder {
        self.recorder.clone()
    }

    /// A request for a default debate, for tests that start sessions directly.
    pub fn request(&self) -> SessionRequest {
        let settings = default_config();
        let config = resolve(&RawDebateParameters {
            room: Some("test-room".to_string()),
            ..Default::default()
        })
        .unwrap_or_else(|e| panic!("default test configuration: {e}"));
        let persona = PersonaRegistry::new(settings.voices.clone()).lookup(config.persona_id());
        SessionRequest::for_debate(&settings, &persona, &config, compose(&persona, &config))
    }
}

#[async_trait]
impl MediaPlatform for ScriptedPlatform {
    async fn start(&self, request: SessionRequest) -> Result<Box<dyn MediaSession>, DebateError> {
        self.recorder.record(Call::Start);
        self.recorder.lock().requests.push(request);
        if self.script.fail_start {
            return Err(DebateError::Capability("platform unavailable".to_string()));
        }
        Ok(Box::new(ScriptedSession {
            script: self.script.clone(),
            recorder: self.recorder.clone(),
            replies: 0,
            listens: 0,
            publishes: 0,
        }))
    }
}

struct ScriptedSession {
    script: Script,
    recorder: Recorder,
    replies: usize,
    listens: usize,
    publishes: usize,
}

#[async_trait]
impl MediaSession for ScriptedSession {
    async fn connect(&mut self) -> Result<(), DebateError> {
        self.recorder.record(Call::Connect);
        if self.script.fail_connect {
            return Err(DebateError::Capability("transport refused".to_string()));
        }
        Ok(())
    }

    async fn generate_reply(&mut self, instructions: Option<&str>) -> Result<String, DebateError> {
        self.recorder
            .record(Call::GenerateReply(instructions.map(str::to_string)));
        let index = self.replies;
        self.replies += 1;
        if self.script.failing_replies.contains(&index) {
            return Err(DebateError::Capability(format!("reply {index} failed")));
        }
        Ok(self
            .script
            .replies
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("reply {index}")))
    }

    async fn listen_and_transcribe(
        &mut self,
        window: Duration,
    ) -> Result<Option<String>, DebateError> {
        self.recorder.record(Call::Listen(window));
        let index = self.listens;
        self.listens += 1;
        if self.script.listen_hangs {
            std::future::pending::<()>().await;
        }
        if self.script.failing_listens.contains(&index) {
            return Err(DebateError::Capability(format!("listen {index} failed")));
        }
        Ok(self.script.transcripts.get(index).cloned().flatten())
    }

    async fn publish(
        &mut self,
        payload: Vec<u8>,
        topic: &str,
        reliable: bool,
    ) -> Result<(), DebateError> {
        self.recorder.record(Call::Publish);
        let index = self.publishes;
        self.publishes += 1;
        if self.script.failing_publishes.contains(&index) {
            return Err(DebateError::Capability("room disconnected".to_string()));
        }
        let payload = ChatPayload::decode(&payload)?;
        self.recorder.lock().published.push(Published {
            topic: topic.to_string(),
            reliable,
            payload,
        });
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DebateError> {
        self.recorder.record(Call::Close);
        if self.script.fail_close {
            return Err(DebateError::Capability("close failed".to_string()));
        }
        Ok(())
    }
}
