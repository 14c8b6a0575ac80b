//! The `altertest classify` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use altertest_inference::config::load_config_from;
use altertest_inference::{create_client, create_service};

/// Ask the configured inference service about one abstract.
///
/// An unreachable or misbehaving service is reported as an `unknown` guess,
/// not as a command failure.
pub async fn execute(
    text: Option<String>,
    file: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let text = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read abstract: {}", path.display()))?,
        (None, None) => anyhow::bail!("pass the abstract with --text or --file"),
    };
    anyhow::ensure!(!text.trim().is_empty(), "abstract text is empty");

    let config = load_config_from(config_path.as_deref())?;
    let service = create_service(&config.inference)?;
    let client = create_client(&config.inference, service);

    eprintln!("Asking {} ...", config.inference.endpoint);
    let verdict = client.classify(text.trim()).await;

    println!("Guess: {}", verdict.guess);
    println!("Latency: {}ms", verdict.latency_ms);
    println!("Raw output: {}", verdict.raw_output);
    Ok(())
}
