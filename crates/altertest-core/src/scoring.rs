//! Aggregate scoring of trial results.
//!
//! Model aggregates only count verdicts with a known guess. An `unknown`
//! verdict is excluded from the model denominator rather than counted wrong.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::corpus::section_key;
use crate::model::TrialResult;

/// Aggregate correctness over a set of trial results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of submitted trials.
    pub total: usize,
    pub human_correct_count: usize,
    /// `human_correct_count / total`, 0 when there are no trials.
    pub human_accuracy: f64,
    /// Trials with a model verdict whose guess is not `unknown`.
    pub model_evaluated: usize,
    /// Trials where the model was asked but produced `unknown`.
    pub model_unknown_count: usize,
    /// Absent when no trial has a usable model guess.
    pub model_correct_count: Option<usize>,
    pub model_accuracy: Option<f64>,
    /// Fraction of model-evaluated trials where human and model guessed the same.
    pub agreement: Option<f64>,
    pub mean_confidence: Option<f64>,
    /// Mean confidence on trials the participant got right.
    pub mean_confidence_correct: Option<f64>,
    /// Mean confidence on trials the participant got wrong.
    pub mean_confidence_incorrect: Option<f64>,
    /// Breakdown by corpus section.
    pub per_section: BTreeMap<String, SectionStats>,
}

/// Correctness within one corpus section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionStats {
    pub total: usize,
    pub human_correct_count: usize,
    pub model_evaluated: usize,
    pub model_correct_count: usize,
}

impl SectionStats {
    pub fn human_accuracy(&self) -> f64 {
        ratio(self.human_correct_count, self.total)
    }

    pub fn model_accuracy(&self) -> Option<f64> {
        (self.model_evaluated > 0).then(|| ratio(self.model_correct_count, self.model_evaluated))
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn mean(values: impl Iterator<Item = u8>) -> Option<f64> {
    let (sum, n) = values.fold((0u64, 0usize), |(s, n), v| (s + v as u64, n + 1));
    (n > 0).then(|| sum as f64 / n as f64)
}

/// Compute the aggregate summary for a session's results.
pub fn summarize(results: &[TrialResult]) -> Summary {
    let total = results.len();
    let human_correct_count = results.iter().filter(|r| r.human_correct).count();

    let mut model_evaluated = 0usize;
    let mut model_unknown_count = 0usize;
    let mut model_correct = 0usize;
    let mut agree = 0usize;
    let mut per_section: BTreeMap<String, SectionStats> = BTreeMap::new();

    for r in results {
        let section = per_section.entry(section_key(&r.section)).or_default();
        section.total += 1;
        if r.human_correct {
            section.human_correct_count += 1;
        }

        let Some(verdict) = &r.model_verdict else {
            continue;
        };
        match verdict.guess.label() {
            Some(guess) => {
                model_evaluated += 1;
                section.model_evaluated += 1;
                if guess == r.ground_truth {
                    model_correct += 1;
                    section.model_correct_count += 1;
                }
                if guess == r.human_guess {
                    agree += 1;
                }
            }
            None => model_unknown_count += 1,
        }
    }

    let has_model = model_evaluated > 0;

    Summary {
        total,
        human_correct_count,
        human_accuracy: ratio(human_correct_count, total),
        model_evaluated,
        model_unknown_count,
        model_correct_count: has_model.then_some(model_correct),
        model_accuracy: has_model.then(|| ratio(model_correct, model_evaluated)),
        agreement: has_model.then(|| ratio(agree, model_evaluated)),
        mean_confidence: mean(results.iter().map(|r| r.confidence)),
        mean_confidence_correct: mean(
            results
                .iter()
                .filter(|r| r.human_correct)
                .map(|r| r.confidence),
        ),
        mean_confidence_incorrect: mean(
            results
                .iter()
                .filter(|r| !r.human_correct)
                .map(|r| r.confidence),
        ),
        per_section,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::model::{Label, ModelGuess, ModelVerdict};

    fn result(
        index: usize,
        section: &str,
        human: Label,
        truth: Label,
        confidence: u8,
        model: Option<ModelGuess>,
    ) -> TrialResult {
        TrialResult {
            trial_index: index,
            item_id: format!("item-{index}"),
            section: section.into(),
            human_guess: human,
            confidence,
            ground_truth: truth,
            human_correct: human == truth,
            model_verdict: model.map(|guess| {
                ModelVerdict {
                    raw_output: guess.to_string(),
                    guess,
                    model_correct: None,
                    latency_ms: 0,
                }
                .scored(truth)
            }),
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn empty_results_have_zero_accuracy() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.human_accuracy, 0.0);
        assert_eq!(summary.model_accuracy, None);
        assert_eq!(summary.mean_confidence, None);
        assert!(summary.per_section.is_empty());
    }

    #[test]
    fn human_accuracy() {
        use Label::*;
        let results = vec![
            result(0, "cog", Original, Altered, 80, None),
            result(1, "cog", Altered, Altered, 60, None),
            result(2, "cog", Original, Original, 40, None),
            result(3, "cog", Altered, Original, 20, None),
        ];
        let summary = summarize(&results);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.human_correct_count, 2);
        assert_eq!(summary.human_accuracy, 0.5);
        assert_eq!(summary.mean_confidence, Some(50.0));
        assert_eq!(summary.mean_confidence_correct, Some(50.0));
        assert_eq!(summary.mean_confidence_incorrect, Some(50.0));
        assert_eq!(summary.model_correct_count, None);
    }

    #[test]
    fn unknown_verdicts_are_excluded_not_wrong() {
        use Label::*;
        let results = vec![
            result(0, "cog", Altered, Altered, 90, Some(ModelGuess::Altered)),
            result(1, "cog", Altered, Original, 70, Some(ModelGuess::Unknown)),
            result(2, "cog", Original, Original, 50, Some(ModelGuess::Unknown)),
            result(3, "cog", Original, Altered, 30, Some(ModelGuess::Original)),
            result(4, "cog", Original, Original, 10, None),
        ];
        let summary = summarize(&results);
        assert_eq!(summary.model_evaluated, 2);
        assert_eq!(summary.model_unknown_count, 2);
        assert_eq!(summary.model_correct_count, Some(1));
        assert_eq!(summary.model_accuracy, Some(0.5));
        assert_eq!(summary.agreement, Some(1.0));
    }

    #[test]
    fn all_unknown_leaves_model_accuracy_absent() {
        use Label::*;
        let results = vec![
            result(0, "cog", Altered, Altered, 90, Some(ModelGuess::Unknown)),
            result(1, "cog", Altered, Original, 70, Some(ModelGuess::Unknown)),
        ];
        let summary = summarize(&results);
        assert_eq!(summary.model_accuracy, None);
        assert_eq!(summary.model_correct_count, None);
        assert_eq!(summary.model_unknown_count, 2);
        assert_eq!(summary.agreement, None);
    }

    #[test]
    fn per_section_breakdown() {
        use Label::*;
        let results = vec![
            result(0, "cog", Altered, Altered, 90, Some(ModelGuess::Original)),
            result(1, "social", Altered, Original, 70, Some(ModelGuess::Original)),
            result(2, "social", Original, Original, 50, None),
        ];
        let summary = summarize(&results);
        let cog = &summary.per_section["cog"];
        assert_eq!(cog.total, 1);
        assert_eq!(cog.human_accuracy(), 1.0);
        assert_eq!(cog.model_accuracy(), Some(0.0));

        let social = &summary.per_section["social"];
        assert_eq!(social.total, 2);
        assert_eq!(social.human_correct_count, 1);
        assert_eq!(social.model_accuracy(), Some(1.0));
    }

    #[test]
    fn per_section_groups_by_section_key() {
        use Label::*;
        let results = vec![
            result(0, "Cognitive", Altered, Altered, 90, None),
            result(1, "cognitive", Altered, Original, 40, None),
        ];
        let summary = summarize(&results);
        assert_eq!(summary.per_section.len(), 1);
        assert_eq!(summary.per_section["cognitive"].total, 2);
    }

    #[test]
    fn calibration_buckets() {
        use Label::*;
        let results = vec![
            result(0, "cog", Altered, Altered, 100, None),
            result(1, "cog", Altered, Altered, 80, None),
            result(2, "cog", Altered, Original, 20, None),
        ];
        let summary = summarize(&results);
        assert_eq!(summary.mean_confidence_correct, Some(90.0));
        assert_eq!(summary.mean_confidence_incorrect, Some(20.0));
    }
}
