//! Session and corpus error types.
//!
//! These are the caller-visible failures of the experiment core. Inference
//! failures are deliberately absent: the inference client absorbs them into
//! an `unknown` verdict instead of surfacing them.

use thiserror::Error;

/// Errors from sampling and sequencing a session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The (filtered) corpus pool is smaller than the requested sample.
    #[error(
        "insufficient corpus: requested {requested} trials but only {available} items match{}",
        section.as_ref().map(|s| format!(" section '{s}'")).unwrap_or_default()
    )]
    InsufficientCorpus {
        section: Option<String>,
        requested: usize,
        available: usize,
    },

    /// The session has not been started, or all trials were already submitted.
    #[error("no active trial: session is not started or already completed")]
    NoActiveTrial,

    /// Confidence outside the configured range.
    #[error("confidence {value} out of range 0..={max}")]
    InvalidConfidence { value: u8, max: u8 },
}

/// Errors from building a corpus.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CorpusError {
    /// An item violates the corpus invariants.
    #[error("invalid corpus item '{id}': {reason}")]
    InvalidItem { id: String, reason: String },

    /// Two items share the same id.
    #[error("duplicate corpus item id: {0}")]
    DuplicateId(String),
}
