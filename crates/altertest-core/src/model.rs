//! Core data model types for altertest.
//!
//! These are the value types that flow through the experiment: corpus
//! entries, sampled trials, per-trial results, and model verdicts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single labeled abstract from the corpus, in both variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusItem {
    /// Unique identifier within the corpus.
    pub id: String,
    /// Research section / category (e.g. "cognitive").
    pub section: String,
    /// The unmodified abstract.
    pub original_text: String,
    /// The AI-modified abstract.
    pub altered_text: String,
}

/// Which variant of an abstract was shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Original,
    Altered,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Original => write!(f, "original"),
            Label::Altered => write!(f, "altered"),
        }
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "original" | "o" | "no" => Ok(Label::Original),
            "altered" | "a" | "modified" | "yes" => Ok(Label::Altered),
            other => Err(format!("unknown label: {other}")),
        }
    }
}

/// One trial as presented to the participant. Never mutated after sampling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialItem {
    /// Identifier of the corpus item this trial was drawn from.
    pub id: String,
    /// Section of the source corpus item.
    pub section: String,
    /// The text actually shown.
    pub shown_text: String,
    /// Which variant `shown_text` is.
    pub ground_truth: Label,
}

impl TrialItem {
    /// Build a trial from a corpus item, showing the requested variant.
    pub fn from_corpus(item: &CorpusItem, shown: Label) -> Self {
        let shown_text = match shown {
            Label::Original => item.original_text.clone(),
            Label::Altered => item.altered_text.clone(),
        };
        Self {
            id: item.id.clone(),
            section: item.section.clone(),
            shown_text,
            ground_truth: shown,
        }
    }
}

/// The model's categorical guess, derived from free-text output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelGuess {
    Altered,
    Original,
    Unknown,
}

impl ModelGuess {
    /// The label this guess commits to, or `None` for `Unknown`.
    pub fn label(self) -> Option<Label> {
        match self {
            ModelGuess::Altered => Some(Label::Altered),
            ModelGuess::Original => Some(Label::Original),
            ModelGuess::Unknown => None,
        }
    }
}

impl fmt::Display for ModelGuess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelGuess::Altered => write!(f, "altered"),
            ModelGuess::Original => write!(f, "original"),
            ModelGuess::Unknown => write!(f, "unknown"),
        }
    }
}

/// Outcome of one inference attempt on a trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVerdict {
    /// Raw service output, or a diagnostic string when the call failed.
    pub raw_output: String,
    /// Parsed guess.
    pub guess: ModelGuess,
    /// Whether the guess matched ground truth. Absent for `Unknown`.
    #[serde(default)]
    pub model_correct: Option<bool>,
    /// Wall-clock time spent on the attempt.
    #[serde(default)]
    pub latency_ms: u64,
}

impl ModelVerdict {
    /// Set `model_correct` against the trial's ground truth.
    pub fn scored(mut self, ground_truth: Label) -> Self {
        self.model_correct = self.guess.label().map(|g| g == ground_truth);
        self
    }
}

/// Recorded outcome of a single submitted trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Zero-based position in the session's trial sequence.
    pub trial_index: usize,
    /// Corpus item id.
    pub item_id: String,
    /// Corpus section.
    pub section: String,
    pub human_guess: Label,
    /// Participant confidence, passed through opaquely.
    pub confidence: u8,
    pub ground_truth: Label,
    pub human_correct: bool,
    /// Present only when model comparison ran for this trial.
    #[serde(default)]
    pub model_verdict: Option<ModelVerdict>,
    pub submitted_at: DateTime<Utc>,
}

impl TrialResult {
    /// The model's guess if it produced a usable one.
    pub fn known_model_guess(&self) -> Option<Label> {
        self.model_verdict.as_ref().and_then(|v| v.guess.label())
    }
}
