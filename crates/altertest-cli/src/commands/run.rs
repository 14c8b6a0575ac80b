//! The `altertest run` command.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use altertest_core::engine::ExperimentEngine;
use altertest_core::model::Label;
use altertest_core::parser;
use altertest_core::session::Current;
use altertest_inference::config::load_config_from;
use altertest_inference::{create_client, create_service};

use super::report::print_report;

pub struct RunArgs {
    pub corpus: Option<PathBuf>,
    pub section: Option<String>,
    pub trials: Option<usize>,
    pub no_model: bool,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;

    let corpus_path = args
        .corpus
        .or_else(|| config.corpus.clone())
        .context("no corpus given; pass --corpus or set `corpus` in altertest.toml")?;
    let corpus = parser::load_corpus(&corpus_path)?;
    tracing::info!(corpus = corpus.name(), items = corpus.items().len(), "corpus loaded");

    let trial_count = args.trials.unwrap_or(config.session.trial_count);
    let invoke_model = config.session.compare_model && !args.no_model;
    let confidence_max = config.session.confidence_max;

    let service = create_service(&config.inference)?;
    let client = create_client(&config.inference, service);
    let engine = ExperimentEngine::new(Arc::new(corpus), client, config.engine_config(args.seed));

    let reaper = engine.spawn_reaper();

    let session_id = ExperimentEngine::new_session_id();
    engine
        .start(&session_id, args.section.as_deref(), trial_count)
        .await?;

    eprintln!(
        "altertest v{} — {} trial(s){}",
        env!("CARGO_PKG_VERSION"),
        trial_count,
        args.section
            .as_deref()
            .map(|s| format!(" from section '{s}'"))
            .unwrap_or_default()
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut input = stdin.lock();
    let mut out = stdout.lock();
    drive_session(
        &engine,
        &session_id,
        invoke_model,
        confidence_max,
        &mut input,
        &mut out,
    )
    .await?;
    drop(out);
    reaper.abort();

    let report = engine.report(&session_id).await;
    print_report(&report);

    let dir = args.output.unwrap_or(config.output_dir);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output dir: {}", dir.display()))?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
    let path = dir.join(format!("session-{timestamp}.json"));
    report.save_json(&path)?;
    eprintln!("Results saved to: {}", path.display());

    Ok(())
}

/// Present every trial of `session_id` and collect answers until completion.
async fn drive_session<R: BufRead, W: Write>(
    engine: &ExperimentEngine,
    session_id: &str,
    invoke_model: bool,
    confidence_max: u8,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    loop {
        let (index, total, item) = match engine.current(session_id).await? {
            Current::Trial { index, total, item } => (index, total, item),
            Current::Completed => break,
        };

        writeln!(out, "\nTrial {}/{} [{}]\n", index + 1, total, item.section)?;
        writeln!(out, "{}\n", item.shown_text)?;

        let guess = prompt_label(input, out)?;
        let confidence = prompt_confidence(input, out, confidence_max)?;
        if invoke_model {
            writeln!(out, "Asking the model...")?;
        }

        let result = engine
            .submit(session_id, guess, confidence, invoke_model)
            .await?;
        let verdict = if result.human_correct {
            "Correct"
        } else {
            "Wrong"
        };
        writeln!(
            out,
            "{verdict}: this abstract is {}.",
            result.ground_truth
        )?;
    }
    Ok(())
}

fn read_answer<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    let n = input.read_line(&mut line)?;
    anyhow::ensure!(n > 0, "input ended before the session completed");
    Ok(line.trim().to_string())
}

fn prompt_label<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Label> {
    loop {
        write!(out, "Original or altered? [o/a]: ")?;
        out.flush()?;
        match read_answer(input)?.parse::<Label>() {
            Ok(label) => return Ok(label),
            Err(e) => writeln!(out, "  {e}; answer 'original' or 'altered'")?,
        }
    }
}

fn prompt_confidence<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    max: u8,
) -> Result<u8> {
    loop {
        write!(out, "Confidence (0-{max}): ")?;
        out.flush()?;
        let answer = read_answer(input)?;
        match answer.parse::<u8>() {
            Ok(value) if value <= max => return Ok(value),
            _ => writeln!(out, "  expected a whole number from 0 to {max}")?,
        }
    }
}
