//! Core trait definitions for the corpus and the inference service.
//!
//! The corpus is implemented here by [`crate::corpus::InMemoryCorpus`]; inference
//! backends live in the `altertest-inference` crate.

use async_trait::async_trait;

use crate::model::CorpusItem;

// ---------------------------------------------------------------------------
// Corpus Provider trait
// ---------------------------------------------------------------------------

/// Read-only, queryable collection of labeled abstracts.
pub trait CorpusProvider: Send + Sync {
    /// Items whose section matches `section` (all items when `None`).
    fn candidates(&self, section: Option<&str>) -> Vec<&CorpusItem>;

    /// Distinct section names, sorted.
    fn sections(&self) -> Vec<String>;

    /// Total number of items.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Inference Service trait
// ---------------------------------------------------------------------------

/// Trait for external text-in/text-out inference backends.
///
/// Implementations report every failure as an error; the
/// [`crate::inference::InferenceClient`] turns those into `unknown` verdicts.
#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Human-readable backend name (e.g. "http").
    fn name(&self) -> &str;

    /// Send `input` and return the service's raw `output` text.
    async fn infer(&self, input: &str) -> anyhow::Result<String>;
}

// ---------------------------------------------------------------------------
// Default prompt template
// ---------------------------------------------------------------------------

/// Placeholder replaced by the abstract text in a prompt template.
pub const TEXT_PLACEHOLDER: &str = "{text}";

/// Instruction sent with every abstract.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "The following is the abstract of a research paper. \
It may be the original text, or it may have been subtly modified by an AI system. \
Has this abstract been modified? Answer yes or no.\n\nAbstract:\n{text}";

/// Render a template by substituting the abstract for [`TEXT_PLACEHOLDER`].
pub fn render_prompt(template: &str, text: &str) -> String {
    template.replace(TEXT_PLACEHOLDER, text)
}
