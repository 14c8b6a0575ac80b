//! TOML corpus parser.
//!
//! Loads abstract corpora from TOML files and directories, and validates them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::corpus::{section_key, InMemoryCorpus};
use crate::model::CorpusItem;
use crate::traits::CorpusProvider;

/// Sections smaller than this draw a validation warning.
pub const MIN_SECTION_SIZE: usize = 3;

/// Abstracts with fewer words than this draw a validation warning.
pub const MIN_ABSTRACT_WORDS: usize = 20;

/// Intermediate TOML structure for parsing corpus files.
#[derive(Debug, Deserialize)]
struct TomlCorpusFile {
    #[serde(default)]
    corpus: Option<TomlCorpusHeader>,
    #[serde(default)]
    items: Vec<TomlCorpusItem>,
}

#[derive(Debug, Deserialize)]
struct TomlCorpusHeader {
    name: String,
    #[serde(default)]
    #[allow(dead_code)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlCorpusItem {
    id: String,
    section: String,
    original: String,
    altered: String,
}

/// Parse a single TOML file into a corpus.
pub fn parse_corpus(path: &Path) -> Result<InMemoryCorpus> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read corpus file: {}", path.display()))?;

    parse_corpus_str(&content, path)
}

/// Parse a TOML string into a corpus (useful for testing).
pub fn parse_corpus_str(content: &str, source_path: &Path) -> Result<InMemoryCorpus> {
    let parsed: TomlCorpusFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let name = parsed.corpus.map(|c| c.name).unwrap_or_else(|| {
        source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "corpus".to_string())
    });

    let items = parsed
        .items
        .into_iter()
        .map(|i| CorpusItem {
            id: i.id.trim().to_string(),
            section: i.section.trim().to_string(),
            original_text: i.original.trim().to_string(),
            altered_text: i.altered.trim().to_string(),
        })
        .collect();

    InMemoryCorpus::new(name, items)
        .with_context(|| format!("invalid corpus: {}", source_path.display()))
}

/// A corpus file that was found in a directory but could not be loaded.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// A corpus together with the files dropped while loading it.
#[derive(Debug, Clone)]
pub struct LoadedCorpus {
    pub corpus: InMemoryCorpus,
    pub skipped: Vec<SkippedFile>,
}

/// Recursively load all `.toml` corpus files from a directory into one corpus.
///
/// Malformed files are skipped with a warning; use [`load_corpus_checked`]
/// to find out which.
pub fn load_corpus_directory(dir: &Path) -> Result<InMemoryCorpus> {
    load_directory_checked(dir).map(|loaded| loaded.corpus)
}

fn load_directory_checked(dir: &Path) -> Result<LoadedCorpus> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let name = dir
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "corpus".to_string());
    let mut merged = InMemoryCorpus::new(name, Vec::new())?;
    let mut skipped = Vec::new();

    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        let corpus = if path.is_dir() {
            let nested = load_directory_checked(&path)?;
            skipped.extend(nested.skipped);
            nested.corpus
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_corpus(&path) {
                Ok(corpus) => corpus,
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                    skipped.push(SkippedFile {
                        path,
                        reason: format!("{e:#}"),
                    });
                    continue;
                }
            }
        } else {
            continue;
        };

        merged
            .extend(corpus)
            .with_context(|| format!("while merging {}", path.display()))?;
    }

    Ok(LoadedCorpus {
        corpus: merged,
        skipped,
    })
}

/// Load a corpus from a file or a directory of files.
pub fn load_corpus(path: &Path) -> Result<InMemoryCorpus> {
    load_corpus_checked(path).map(|loaded| loaded.corpus)
}

/// Like [`load_corpus`], but also report directory entries that were skipped.
///
/// A single file never skips: a malformed file is an error.
pub fn load_corpus_checked(path: &Path) -> Result<LoadedCorpus> {
    if path.is_dir() {
        load_directory_checked(path)
    } else {
        Ok(LoadedCorpus {
            corpus: parse_corpus(path)?,
            skipped: Vec::new(),
        })
    }
}

/// A warning from corpus validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The item ID (if applicable).
    pub item_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Item counts per section.
pub fn section_counts(corpus: &InMemoryCorpus) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for item in corpus.items() {
        *counts.entry(section_key(&item.section)).or_insert(0) += 1;
    }
    counts
}

/// Validate a corpus for issues that do not make it unusable.
pub fn validate_corpus(corpus: &InMemoryCorpus) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if corpus.is_empty() {
        warnings.push(ValidationWarning {
            item_id: None,
            message: "corpus has no items".into(),
        });
    }

    for (section, count) in section_counts(corpus) {
        if count < MIN_SECTION_SIZE {
            warnings.push(ValidationWarning {
                item_id: None,
                message: format!(
                    "section '{section}' has only {count} item(s); sessions with more trials will fail"
                ),
            });
        }
    }

    for item in corpus.items() {
        if normalized(&item.original_text) == normalized(&item.altered_text) {
            warnings.push(ValidationWarning {
                item_id: Some(item.id.clone()),
                message: "variants differ only in case or whitespace".into(),
            });
        }

        let words = item
            .original_text
            .split_whitespace()
            .count()
            .min(item.altered_text.split_whitespace().count());
        if words < MIN_ABSTRACT_WORDS {
            warnings.push(ValidationWarning {
                item_id: Some(item.id.clone()),
                message: format!("abstract is very short ({words} words)"),
            });
        }
    }

    warnings
}

fn normalized(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_TOML: &str = r#"
[corpus]
name = "Test Corpus"
description = "A test corpus"

[[items]]
id = "cog-1"
section = "cognitive"
original = """
We examined how working memory capacity constrains the retention of verbal
material across a delay in a sample of adult participants recruited online.
"""
altered = """
We examined how working memory capacity dramatically constrains the retention
of verbal material across a delay in a large sample of adults recruited online.
"""

[[items]]
id = "soc-1"
section = "social"
original = "Short original."
altered = "Short altered."
"#;

    #[test]
    fn parse_valid_toml() {
        let corpus = parse_corpus_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(corpus.name(), "Test Corpus");
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.items()[0].id, "cog-1");
        assert!(corpus.items()[0].original_text.starts_with("We examined"));
        assert!(!corpus.items()[0].original_text.ends_with('\n'));
        assert_eq!(corpus.sections(), vec!["cognitive", "social"]);
    }

    #[test]
    fn name_defaults_to_file_stem() {
        let toml = r#"
[[items]]
id = "a"
section = "s"
original = "one"
altered = "two"
"#;
        let corpus = parse_corpus_str(toml, &PathBuf::from("dir/neuro.toml")).unwrap();
        assert_eq!(corpus.name(), "neuro");
    }

    #[test]
    fn parse_rejects_identical_variants() {
        let toml = r#"
[[items]]
id = "a"
section = "s"
original = "same"
altered = "same"
"#;
        let err = parse_corpus_str(toml, &PathBuf::from("bad.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("identical"));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_corpus_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn validate_small_sections_and_short_text() {
        let corpus = parse_corpus_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_corpus(&corpus);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("section 'social' has only 1")));
        assert!(warnings
            .iter()
            .any(|w| w.item_id.as_deref() == Some("soc-1") && w.message.contains("short")));
        assert!(!warnings
            .iter()
            .any(|w| w.item_id.as_deref() == Some("cog-1")));
    }

    #[test]
    fn section_counts_ignore_case() {
        let items = ["Cognitive", "cognitive", " COGNITIVE"]
            .iter()
            .enumerate()
            .map(|(i, section)| CorpusItem {
                id: format!("c{i}"),
                section: section.to_string(),
                original_text: format!("original {i}"),
                altered_text: format!("altered {i}"),
            })
            .collect();
        let corpus = InMemoryCorpus::new("mixed", items).unwrap();

        let counts = section_counts(&corpus);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["cognitive"], 3);
        assert!(!validate_corpus(&corpus)
            .iter()
            .any(|w| w.message.contains("sessions with more trials will fail")));
    }

    #[test]
    fn validate_whitespace_only_difference() {
        let toml = r#"
[[items]]
id = "ws"
section = "s"
original = "The  Results were clear."
altered = "the results were clear."
"#;
        let corpus = parse_corpus_str(toml, &PathBuf::from("ws.toml")).unwrap();
        let warnings = validate_corpus(&corpus);
        assert!(warnings.iter().any(|w| w.message.contains("case or whitespace")));
    }

    #[test]
    fn load_directory_merges_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.toml"), VALID_TOML).unwrap();
        std::fs::write(
            dir.path().join("b.toml"),
            r#"
[[items]]
id = "extra-1"
section = "cognitive"
original = "first"
altered = "second"
"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let corpus = load_corpus(dir.path()).unwrap();
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.candidates(Some("cognitive")).len(), 2);
    }

    #[test]
    fn load_directory_reports_skipped_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.toml"), VALID_TOML).unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/broken.toml"), "not [valid toml").unwrap();

        let loaded = load_corpus_checked(dir.path()).unwrap();
        assert_eq!(loaded.corpus.len(), 2);
        assert_eq!(loaded.skipped.len(), 1);
        assert!(loaded.skipped[0].path.ends_with("nested/broken.toml"));
        assert!(loaded.skipped[0].reason.contains("failed to parse TOML"));

        assert_eq!(load_corpus_directory(dir.path()).unwrap().len(), 2);
    }

    #[test]
    fn load_directory_rejects_cross_file_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("b.toml"), VALID_TOML).unwrap();
        assert!(load_corpus_directory(dir.path()).is_err());
    }
}
