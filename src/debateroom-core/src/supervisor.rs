//! Per-room debate workers.
//!
//! Each room's debate runs as its own tokio task with its own cancellation
//! token. Rooms share nothing but the read-only persona registry and
//! settings.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::DebateError;
use crate::orchestrator::{DebateCallback, DebateOrchestrator, DebateOutcome};
use crate::persona::PersonaRegistry;
use crate::resolver::DebateConfiguration;
use crate::session::MediaPlatform;

struct DebateWorker {
    cancel: CancellationToken,
    handle: JoinHandle<Result<DebateOutcome, DebateError>>,
}

/// Launches, cancels and joins room debates.
pub struct DebateSupervisor {
    platform: Arc<dyn MediaPlatform>,
    settings: Arc<Config>,
    registry: Arc<PersonaRegistry>,
    workers: HashMap<String, DebateWorker>,
}

impl DebateSupervisor {
    pub fn new(platform: Arc<dyn MediaPlatform>, settings: Config) -> Self {
        let registry = PersonaRegistry::new(settings.voices.clone());
        Self {
            platform,
            settings: Arc::new(settings),
            registry: Arc::new(registry),
            workers: HashMap::new(),
        }
    }

    /// Start a debate for the configuration's room.
    ///
    /// Fails with [`DebateError::RoomBusy`] while that room's previous
    /// debate is still running.
    pub fn launch(
        &mut self,
        configuration: DebateConfiguration,
        callback: Option<DebateCallback>,
    ) -> Result<CancellationToken, DebateError> {
        let room = configuration.room().to_string();
        if self.is_running(&room) {
            warn!(room = %room, "Debate already running for room");
            return Err(DebateError::RoomBusy(room));
        }

        let mut orchestrator = DebateOrchestrator::new(
            configuration,
            &self.registry,
            &self.settings,
            Arc::clone(&self.platform),
        );
        if let Some(callback) = callback {
            orchestrator = orchestrator.with_callback(callback);
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(orchestrator.run(cancel.clone()));
        info!(room = %room, "Launched debate worker");

        self.workers.insert(
            room,
            DebateWorker {
                cancel: cancel.clone(),
                handle,
            },
        );
        Ok(cancel)
    }

    /// Whether `room` has a debate that has not finished yet.
    pub fn is_running(&self, room: &str) -> bool {
        self.workers
            .get(room)
            .is_some_and(|worker| !worker.handle.is_finished())
    }

    /// Rooms with a live debate, sorted.
    pub fn active_rooms(&self) -> Vec<String> {
        let mut rooms: Vec<String> = self
            .workers
            .iter()
            .filter(|(_, worker)| !worker.handle.is_finished())
            .map(|(room, _)| room.clone())
            .collect();
        rooms.sort();
        rooms
    }

    /// Ask a room's debate to stop. Its session is still closed.
    pub fn cancel(&self, room: &str) -> bool {
        match self.workers.get(room) {
            Some(worker) => {
                info!(room = %room, "Cancelling debate");
                worker.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Wait for a room's debate to finish and forget it.
    pub async fn join(&mut self, room: &str) -> Option<Result<DebateOutcome, DebateError>> {
        let worker = self.workers.remove(room)?;
        Some(join_worker(room, worker).await)
    }

    /// Cancel every debate and wait for all of them.
    pub async fn shutdown(&mut self) -> Vec<(String, Result<DebateOutcome, DebateError>)> {
        for worker in self.workers.values() {
            worker.cancel.cancel();
        }

        let mut results = Vec::with_capacity(self.workers.len());
        for (room, worker) in self.workers.drain() {
            let result = join_worker(&room, worker).await;
            results.push((room, result));
        }
        results.sort_by(|a, b| a.0.cmp(&b.0));
        results
    }
}

async fn join_worker(room: &str, worker: DebateWorker) -> Result<DebateOutcome, DebateError> {
    match worker.handle.await {
        Ok(result) => result,
        Err(e) => Err(DebateError::Worker {
            room: room.to_string(),
            reason: e.to_string(),
        }),
    }
}
