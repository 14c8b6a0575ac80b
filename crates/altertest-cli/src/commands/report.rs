//! The `altertest report` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use altertest_core::report::SessionReport;

pub fn execute(input: PathBuf, format: String) -> Result<()> {
    let report = SessionReport::load_json(&input)?;
    match format.as_str() {
        "text" => print_report(&report),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }
    Ok(())
}

fn pct(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// Print the per-trial table and the session summary.
pub fn print_report(report: &SessionReport) {
    let mut table = Table::new();
    table.set_header(vec![
        "#",
        "Section",
        "Truth",
        "You",
        "Confidence",
        "Correct",
        "Model",
        "Model correct",
    ]);

    for r in &report.results {
        let (model, model_correct) = match &r.model_verdict {
            Some(v) => (
                v.guess.to_string(),
                match v.model_correct {
                    Some(true) => "yes",
                    Some(false) => "no",
                    None => "-",
                },
            ),
            None => ("-".to_string(), "-"),
        };
        table.add_row(vec![
            Cell::new(r.trial_index + 1),
            Cell::new(&r.section),
            Cell::new(r.ground_truth),
            Cell::new(r.human_guess),
            Cell::new(r.confidence),
            Cell::new(if r.human_correct { "yes" } else { "no" }),
            Cell::new(model),
            Cell::new(model_correct),
        ]);
    }

    println!("\n{table}");

    let s = &report.summary;
    println!("\nTrials: {}", s.total);
    println!(
        "Human accuracy: {}/{} ({})",
        s.human_correct_count,
        s.total,
        pct(s.human_accuracy)
    );

    match (s.model_correct_count, s.model_accuracy) {
        (Some(correct), Some(accuracy)) => {
            let unknown = if s.model_unknown_count > 0 {
                format!(", {} unknown", s.model_unknown_count)
            } else {
                String::new()
            };
            println!(
                "Model accuracy: {}/{} ({}{unknown})",
                correct,
                s.model_evaluated,
                pct(accuracy)
            );
        }
        _ if s.model_unknown_count > 0 => println!(
            "Model accuracy: unavailable ({} unknown)",
            s.model_unknown_count
        ),
        _ => println!("Model accuracy: not evaluated"),
    }

    if let Some(agreement) = s.agreement {
        println!("Human/model agreement: {}", pct(agreement));
    }
    if let Some(mean) = s.mean_confidence {
        println!("Mean confidence: {mean:.1}");
    }

    if s.per_section.len() > 1 {
        let mut sections = Table::new();
        sections.set_header(vec!["Section", "Trials", "Human", "Model"]);
        for (name, stats) in &s.per_section {
            sections.add_row(vec![
                Cell::new(name),
                Cell::new(stats.total),
                Cell::new(pct(stats.human_accuracy())),
                Cell::new(stats.model_accuracy().map(pct).unwrap_or_else(|| "-".into())),
            ]);
        }
        println!("\n{sections}");
    }
}
