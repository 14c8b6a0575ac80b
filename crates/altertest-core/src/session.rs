//! Per-participant session state machine.
//!
//! `NotStarted → InProgress(cursor) → Completed`. The cursor is always the
//! number of recorded results, so `results.len() == cursor` holds by
//! construction.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::inference::InferenceClient;
use crate::model::{Label, TrialItem, TrialResult};
use crate::sampler;
use crate::scoring::{summarize, Summary};
use crate::traits::CorpusProvider;

/// Default upper bound for participant confidence.
pub const DEFAULT_CONFIDENCE_MAX: u8 = 100;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    InProgress { cursor: usize, total: usize },
    Completed { total: usize },
}

/// The trial a participant should see next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Current {
    Trial {
        /// Zero-based position.
        index: usize,
        total: usize,
        item: TrialItem,
    },
    /// Every trial has been submitted; show results.
    Completed,
}

/// One participant's run through a fixed sequence of trials.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    section_filter: Option<String>,
    trials: Vec<TrialItem>,
    results: Vec<TrialResult>,
    started: bool,
    confidence_max: u8,
}

impl Session {
    pub fn new(id: impl Into<String>, confidence_max: u8) -> Self {
        Self {
            id: id.into(),
            section_filter: None,
            trials: Vec::new(),
            results: Vec::new(),
            started: false,
            confidence_max,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn section_filter(&self) -> Option<&str> {
        self.section_filter.as_deref()
    }

    pub fn trials(&self) -> &[TrialItem] {
        &self.trials
    }

    /// Number of submitted trials.
    pub fn cursor(&self) -> usize {
        self.results.len()
    }

    /// Sample a fresh trial sequence and reset progress.
    ///
    /// On failure the session is left exactly as it was. A `count` of zero
    /// starts a session that is immediately completed.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        corpus: &dyn CorpusProvider,
        section: Option<&str>,
        count: usize,
        rng: &mut R,
    ) -> Result<SessionStatus, SessionError> {
        let trials = sampler::sample(corpus, section, count, rng)?;

        self.trials = trials;
        self.results.clear();
        self.section_filter = section.map(str::to_string);
        self.started = true;

        tracing::info!(
            session = %self.id,
            section = section.unwrap_or("*"),
            trials = count,
            "session started"
        );
        Ok(self.status())
    }

    pub fn status(&self) -> SessionStatus {
        if !self.started {
            return SessionStatus::NotStarted;
        }
        let total = self.trials.len();
        let cursor = self.cursor();
        if cursor < total {
            SessionStatus::InProgress { cursor, total }
        } else {
            SessionStatus::Completed { total }
        }
    }

    /// The trial at the cursor, or [`Current::Completed`] once all are submitted.
    pub fn current(&self) -> Result<Current, SessionError> {
        if !self.started {
            return Err(SessionError::NoActiveTrial);
        }
        let index = self.cursor();
        Ok(match self.trials.get(index) {
            Some(item) => Current::Trial {
                index,
                total: self.trials.len(),
                item: item.clone(),
            },
            None => Current::Completed,
        })
    }

    /// Record the participant's answer for the current trial.
    ///
    /// When `inference` is given, the shown text is classified first and the
    /// verdict is attached. Fails without touching the session when there is
    /// no current trial or the confidence is out of range.
    pub async fn submit(
        &mut self,
        human_guess: Label,
        confidence: u8,
        inference: Option<&InferenceClient>,
    ) -> Result<&TrialResult, SessionError> {
        let index = self.cursor();
        if !self.started || index >= self.trials.len() {
            return Err(SessionError::NoActiveTrial);
        }
        if confidence > self.confidence_max {
            return Err(SessionError::InvalidConfidence {
                value: confidence,
                max: self.confidence_max,
            });
        }

        let trial = &self.trials[index];
        let model_verdict = match inference {
            Some(client) => Some(
                client
                    .classify(&trial.shown_text)
                    .await
                    .scored(trial.ground_truth),
            ),
            None => None,
        };

        let result = TrialResult {
            trial_index: index,
            item_id: trial.id.clone(),
            section: trial.section.clone(),
            human_guess,
            confidence,
            ground_truth: trial.ground_truth,
            human_correct: human_guess == trial.ground_truth,
            model_verdict,
            submitted_at: Utc::now(),
        };

        tracing::debug!(
            session = %self.id,
            trial = index,
            human_correct = result.human_correct,
            model_guess = ?result.model_verdict.as_ref().map(|v| v.guess),
            "trial submitted"
        );

        self.results.push(result);
        if self.cursor() == self.trials.len() {
            tracing::info!(session = %self.id, trials = self.trials.len(), "session completed");
        }

        Ok(&self.results[index])
    }

    /// Results recorded so far, in trial order. Valid at any point.
    pub fn results(&self) -> &[TrialResult] {
        &self.results
    }

    pub fn summary(&self) -> Summary {
        summarize(&self.results)
    }
}
