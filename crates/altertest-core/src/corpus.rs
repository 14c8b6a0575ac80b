//! In-memory corpus provider.

use std::collections::{BTreeSet, HashSet};

use crate::error::CorpusError;
use crate::model::CorpusItem;
use crate::traits::CorpusProvider;

/// A validated, immutable set of corpus items held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpus {
    name: String,
    items: Vec<CorpusItem>,
}

impl InMemoryCorpus {
    /// Build a corpus, rejecting items that break the corpus invariants.
    ///
    /// Both variants must be non-empty after trimming and must differ;
    /// ids must be unique.
    pub fn new(name: impl Into<String>, items: Vec<CorpusItem>) -> Result<Self, CorpusError> {
        let mut seen = HashSet::new();
        for item in &items {
            check_item(item)?;
            if !seen.insert(item.id.as_str()) {
                return Err(CorpusError::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self {
            name: name.into(),
            items,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn items(&self) -> &[CorpusItem] {
        &self.items
    }

    /// Merge another corpus into this one, keeping id uniqueness.
    pub fn extend(&mut self, other: InMemoryCorpus) -> Result<(), CorpusError> {
        for item in other.items {
            if self.items.iter().any(|i| i.id == item.id) {
                return Err(CorpusError::DuplicateId(item.id));
            }
            self.items.push(item);
        }
        Ok(())
    }
}

fn check_item(item: &CorpusItem) -> Result<(), CorpusError> {
    let invalid = |reason: &str| CorpusError::InvalidItem {
        id: item.id.clone(),
        reason: reason.to_string(),
    };
    if item.id.trim().is_empty() {
        return Err(invalid("id is empty"));
    }
    if item.original_text.trim().is_empty() {
        return Err(invalid("original text is empty"));
    }
    if item.altered_text.trim().is_empty() {
        return Err(invalid("altered text is empty"));
    }
    if item.original_text == item.altered_text {
        return Err(invalid("original and altered text are identical"));
    }
    Ok(())
}

/// Section comparison used by every provider: trimmed, ASCII case-insensitive.
pub fn section_matches(item_section: &str, filter: &str) -> bool {
    item_section.trim().eq_ignore_ascii_case(filter.trim())
}

/// Canonical form of a section name for grouping and counting.
///
/// Two names share a key exactly when [`section_matches`] treats them as equal.
pub fn section_key(section: &str) -> String {
    section.trim().to_ascii_lowercase()
}

impl CorpusProvider for InMemoryCorpus {
    fn candidates(&self, section: Option<&str>) -> Vec<&CorpusItem> {
        match section {
            Some(filter) => self
                .items
                .iter()
                .filter(|i| section_matches(&i.section, filter))
                .collect(),
            None => self.items.iter().collect(),
        }
    }

    fn sections(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|i| section_key(&i.section))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
