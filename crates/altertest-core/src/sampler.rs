//! Trial sampling.
//!
//! Draws distinct corpus items and flips an independent fair coin per item to
//! decide which variant is shown. The random source is the only nondeterminism.

use rand::seq::index;
use rand::Rng;

use crate::error::SessionError;
use crate::model::{Label, TrialItem};
use crate::traits::CorpusProvider;

/// Sample `count` trials without replacement from the (optionally filtered) corpus.
///
/// The returned order is the presentation order. Fails with
/// [`SessionError::InsufficientCorpus`] when fewer than `count` items match.
pub fn sample<R: Rng + ?Sized>(
    corpus: &dyn CorpusProvider,
    section: Option<&str>,
    count: usize,
    rng: &mut R,
) -> Result<Vec<TrialItem>, SessionError> {
    let pool = corpus.candidates(section);
    if pool.len() < count {
        return Err(SessionError::InsufficientCorpus {
            section: section.map(str::to_string),
            requested: count,
            available: pool.len(),
        });
    }

    let trials = index::sample(rng, pool.len(), count)
        .into_iter()
        .map(|i| {
            let shown = if rng.random_bool(0.5) {
                Label::Original
            } else {
                Label::Altered
            };
            TrialItem::from_corpus(pool[i], shown)
        })
        .collect();

    Ok(trials)
}
