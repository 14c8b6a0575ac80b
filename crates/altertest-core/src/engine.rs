//! Experiment engine: the session boundary used by presentation layers.
//!
//! Wraps the corpus, the inference client, and the session registry behind
//! `start` / `current` / `submit` / `results` / `summary`, all keyed by an
//! opaque session id.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::SessionError;
use crate::inference::InferenceClient;
use crate::model::{Label, TrialResult};
use crate::registry::{SessionRegistry, DEFAULT_SESSION_TTL};
use crate::report::SessionReport;
use crate::scoring::{summarize, Summary};
use crate::session::{Current, SessionStatus, DEFAULT_CONFIDENCE_MAX};
use crate::traits::CorpusProvider;

const MIN_REAP_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for the experiment engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound for participant confidence.
    pub confidence_max: u8,
    /// Idle lifetime of a session.
    pub session_ttl: Duration,
    /// Fixed RNG seed for reproducible sampling.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_max: DEFAULT_CONFIDENCE_MAX,
            session_ttl: DEFAULT_SESSION_TTL,
            seed: None,
        }
    }
}

/// The central experiment engine.
pub struct ExperimentEngine {
    corpus: Arc<dyn CorpusProvider>,
    inference: InferenceClient,
    registry: Arc<SessionRegistry>,
    rng: Mutex<StdRng>,
}

impl ExperimentEngine {
    pub fn new(
        corpus: Arc<dyn CorpusProvider>,
        inference: InferenceClient,
        config: EngineConfig,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            corpus,
            inference,
            registry: Arc::new(SessionRegistry::new(
                config.session_ttl,
                config.confidence_max,
            )),
            rng: Mutex::new(rng),
        }
    }

    /// Mint a fresh opaque session id.
    pub fn new_session_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Sample a new trial sequence for `session_id`, replacing any previous run.
    pub async fn start(
        &self,
        session_id: &str,
        section: Option<&str>,
        trial_count: usize,
    ) -> Result<SessionStatus, SessionError> {
        let slot = self.registry.get_or_create(session_id);
        let mut session = slot.lock().await;
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        session.start(self.corpus.as_ref(), section, trial_count, &mut *rng)
    }

    pub async fn status(&self, session_id: &str) -> SessionStatus {
        match self.registry.get(session_id) {
            Some(slot) => {
                let session = slot.lock().await;
                session.status()
            }
            None => SessionStatus::NotStarted,
        }
    }

    /// The trial to show next, or [`Current::Completed`].
    pub async fn current(&self, session_id: &str) -> Result<Current, SessionError> {
        let slot = self
            .registry
            .get(session_id)
            .ok_or(SessionError::NoActiveTrial)?;
        let session = slot.lock().await;
        session.current()
    }

    /// Submit the participant's answer for the current trial.
    ///
    /// With `invoke_model`, the inference service is asked about the same text
    /// while the session is held, so concurrent submissions on one session
    /// are serialized.
    pub async fn submit(
        &self,
        session_id: &str,
        human_guess: Label,
        confidence: u8,
        invoke_model: bool,
    ) -> Result<TrialResult, SessionError> {
        let slot = self
            .registry
            .get(session_id)
            .ok_or(SessionError::NoActiveTrial)?;
        let mut session = slot.lock().await;
        let inference = invoke_model.then_some(&self.inference);
        let result = session
            .submit(human_guess, confidence, inference)
            .await?
            .clone();
        Ok(result)
    }

    /// Results so far. Empty for an unknown session.
    pub async fn results(&self, session_id: &str) -> Vec<TrialResult> {
        match self.registry.get(session_id) {
            Some(slot) => {
                let session = slot.lock().await;
                session.results().to_vec()
            }
            None => Vec::new(),
        }
    }

    pub async fn summary(&self, session_id: &str) -> Summary {
        summarize(&self.results(session_id).await)
    }

    /// Snapshot the session into a persistable report.
    pub async fn report(&self, session_id: &str) -> SessionReport {
        match self.registry.get(session_id) {
            Some(slot) => {
                let session = slot.lock().await;
                SessionReport::new(
                    session_id,
                    session.section_filter().map(str::to_string),
                    session.results().to_vec(),
                )
            }
            None => SessionReport::new(session_id, None, Vec::new()),
        }
    }

    pub fn evict_expired(&self) -> usize {
        self.registry.evict_expired()
    }

    /// Evict expired sessions in the background, checking once per TTL.
    ///
    /// Must be called inside a tokio runtime; abort the handle to stop.
    pub fn spawn_reaper(&self) -> JoinHandle<()> {
        let every = self.registry.ttl().max(MIN_REAP_INTERVAL);
        Arc::clone(&self.registry).spawn_reaper(every)
    }
}
