//! Inference client: asks an external service whether an abstract was modified.
//!
//! [`InferenceClient::classify`] never fails. Transport errors, timeouts, and
//! malformed responses all come back as a [`ModelVerdict`] with
//! [`ModelGuess::Unknown`] and a diagnostic in `raw_output`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::instrument;

use crate::model::{ModelGuess, ModelVerdict};
use crate::traits::{render_prompt, InferenceService, DEFAULT_PROMPT_TEMPLATE};

/// Upper bound on a single inference attempt.
pub const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_secs(45);

/// Parse free-text service output into a guess.
///
/// The output is lowercased and checked for the substring "yes" first, then
/// "no". "yes" wins when both occur. This is plain substring containment, so
/// "I don't know" reads as `Original`.
pub fn parse_verdict(raw: &str) -> ModelGuess {
    let lowered = raw.to_lowercase();
    if lowered.contains("yes") {
        ModelGuess::Altered
    } else if lowered.contains("no") {
        ModelGuess::Original
    } else {
        ModelGuess::Unknown
    }
}

/// Classifies abstracts through an [`InferenceService`], one attempt per call.
#[derive(Clone)]
pub struct InferenceClient {
    service: Arc<dyn InferenceService>,
    template: String,
    timeout: Duration,
}

impl InferenceClient {
    pub fn new(service: Arc<dyn InferenceService>) -> Self {
        Self {
            service,
            template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            timeout: DEFAULT_INFERENCE_TIMEOUT,
        }
    }

    /// Override the instruction template (must contain `{text}`).
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Ask the service about `text`. Never returns an error.
    #[instrument(skip(self, text), fields(service = %self.service.name(), text_len = text.len()))]
    pub async fn classify(&self, text: &str) -> ModelVerdict {
        let start = Instant::now();
        let prompt = render_prompt(&self.template, text);

        let outcome = tokio::time::timeout(self.timeout, self.service.infer(&prompt)).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(raw_output)) => {
                let guess = parse_verdict(&raw_output);
                tracing::debug!(%guess, latency_ms, "inference succeeded");
                ModelVerdict {
                    raw_output,
                    guess,
                    model_correct: None,
                    latency_ms,
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %format!("{e:#}"), "inference unavailable, recording unknown verdict");
                unavailable(format!("inference unavailable: {e:#}"), latency_ms)
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.timeout.as_secs(),
                    "inference timed out, recording unknown verdict"
                );
                unavailable(
                    format!(
                        "inference unavailable: timed out after {}s",
                        self.timeout.as_secs()
                    ),
                    latency_ms,
                )
            }
        }
    }
}

fn unavailable(diagnostic: String, latency_ms: u64) -> ModelVerdict {
    ModelVerdict {
        raw_output: diagnostic,
        guess: ModelGuess::Unknown,
        model_correct: None,
        latency_ms,
    }
}
