//! The `altertest validate` command.

use std::path::PathBuf;

use anyhow::Result;

use altertest_core::parser;

pub fn execute(corpus_path: PathBuf) -> Result<()> {
    let loaded = parser::load_corpus_checked(&corpus_path)?;
    let corpus = &loaded.corpus;

    println!("Corpus: {} ({} items)", corpus.name(), corpus.items().len());
    for (section, count) in parser::section_counts(corpus) {
        println!("  {section}: {count}");
    }

    for skipped in &loaded.skipped {
        println!("  SKIPPED {}: {}", skipped.path.display(), skipped.reason);
    }

    let warnings = parser::validate_corpus(corpus);
    for w in &warnings {
        let prefix = w
            .item_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() && loaded.skipped.is_empty() {
        println!("All corpus items valid.");
    } else {
        println!();
        if !loaded.skipped.is_empty() {
            println!("{} file(s) skipped.", loaded.skipped.len());
        }
        if !warnings.is_empty() {
            println!("{} warning(s) found.", warnings.len());
        }
    }

    Ok(())
}
