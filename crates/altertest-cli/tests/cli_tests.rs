//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SAMPLE_CORPUS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../corpora/sample.toml");

/// A command isolated from any user-level config or environment overrides.
fn altertest(home: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("altertest").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env_remove("ALTERTEST_ENDPOINT")
        .env_remove("ALTERTEST_API_KEY");
    cmd
}

fn unreachable_config(dir: &Path) -> PathBuf {
    let path = dir.join("unreachable.toml");
    std::fs::write(
        &path,
        "[inference]\nendpoint = \"http://127.0.0.1:9/infer\"\ntimeout_secs = 5\n",
    )
    .unwrap();
    path
}

#[test]
fn validate_sample_corpus() {
    let dir = TempDir::new().unwrap();
    altertest(dir.path())
        .arg("validate")
        .arg("--corpus")
        .arg(SAMPLE_CORPUS)
        .assert()
        .success()
        .stdout(predicate::str::contains("9 items"))
        .stdout(predicate::str::contains("cognitive: 5"))
        .stdout(predicate::str::contains("section 'rare' has only 1 item(s)"));
}

#[test]
fn validate_nonexistent_file() {
    let dir = TempDir::new().unwrap();
    altertest(dir.path())
        .arg("validate")
        .arg("--corpus")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    altertest(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created altertest.toml"))
        .stdout(predicate::str::contains("Created corpora/example.toml"));

    assert!(dir.path().join("altertest.toml").exists());

    altertest(dir.path())
        .arg("validate")
        .arg("--corpus")
        .arg("corpora/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("All corpus items valid"));

    altertest(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists, skipping"));
}

#[test]
fn run_without_model_reprompts_and_summarizes() {
    let dir = TempDir::new().unwrap();

    altertest(dir.path())
        .args(["run", "--corpus", SAMPLE_CORPUS])
        .args(["--section", "cognitive", "--trials", "3", "--no-model", "--seed", "7"])
        .write_stdin("altered\n80\nmaybe\noriginal\n200\n50\na\n60\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Trial 1/3 [cognitive]"))
        .stdout(predicate::str::contains("Trial 3/3 [cognitive]"))
        .stdout(predicate::str::contains("answer 'original' or 'altered'"))
        .stdout(predicate::str::contains("expected a whole number from 0 to 100"))
        .stdout(predicate::str::contains("Trials: 3"))
        .stdout(predicate::str::contains("Model accuracy: not evaluated"))
        .stdout(predicate::str::contains("Asking the model").not());
}

#[test]
fn run_with_unreachable_model_still_completes() {
    let dir = TempDir::new().unwrap();
    let config = unreachable_config(dir.path());

    altertest(dir.path())
        .args(["run", "--corpus", SAMPLE_CORPUS, "--section", "cognitive"])
        .arg("--config")
        .arg(&config)
        .write_stdin("o\n10\no\n20\no\n30\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Trials: 3"))
        .stdout(predicate::str::contains("Model accuracy: unavailable (3 unknown)"));
}

#[test]
fn run_with_too_small_section_fails() {
    let dir = TempDir::new().unwrap();

    altertest(dir.path())
        .args(["run", "--corpus", SAMPLE_CORPUS])
        .args(["--section", "rare", "--trials", "2", "--no-model"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("insufficient corpus"));
}

#[test]
fn run_fails_when_input_ends_early() {
    let dir = TempDir::new().unwrap();

    altertest(dir.path())
        .args(["run", "--corpus", SAMPLE_CORPUS, "--trials", "2", "--no-model"])
        .write_stdin("original\n40\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("input ended"));
}

#[test]
fn run_without_corpus_fails() {
    let dir = TempDir::new().unwrap();

    altertest(dir.path())
        .args(["run", "--no-model"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no corpus given"));
}

#[test]
fn saved_report_can_be_printed() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("results");

    altertest(dir.path())
        .args(["run", "--corpus", SAMPLE_CORPUS, "--section", "social"])
        .args(["--no-model", "--seed", "3", "--output"])
        .arg(&out)
        .write_stdin("a\n70\no\n30\na\n90\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Results saved to"));

    let report = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().path())
        .find(|p| p.extension().is_some_and(|ext| ext == "json"))
        .expect("report file written");

    altertest(dir.path())
        .arg("report")
        .arg("--input")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Trials: 3"))
        .stdout(predicate::str::contains("Human accuracy"));

    altertest(dir.path())
        .arg("report")
        .arg("--input")
        .arg(&report)
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"session_id\""))
        .stdout(predicate::str::contains("\"section_filter\": \"social\""));
}

#[test]
fn run_saves_report_to_configured_output_dir() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("c.toml");
    std::fs::write(&config, "output_dir = \"from-config\"\n").unwrap();

    altertest(dir.path())
        .args(["run", "--corpus", SAMPLE_CORPUS, "--section", "social", "--no-model"])
        .arg("--config")
        .arg(&config)
        .write_stdin("a\n70\no\n30\na\n90\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("from-config"));

    let saved: Vec<_> = std::fs::read_dir(dir.path().join("from-config"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    assert_eq!(saved.len(), 1);
}

#[test]
fn run_rejects_zero_session_ttl() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("c.toml");
    std::fs::write(&config, "[session]\nttl_secs = 0\n").unwrap();

    altertest(dir.path())
        .args(["run", "--corpus", SAMPLE_CORPUS, "--no-model"])
        .arg("--config")
        .arg(&config)
        .write_stdin("o\n10\no\n20\no\n30\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ttl_secs must be at least 1"));
}

#[test]
fn validate_directory_counts_skipped_files() {
    let dir = TempDir::new().unwrap();
    let corpora = dir.path().join("corpora");
    std::fs::create_dir(&corpora).unwrap();
    std::fs::copy(SAMPLE_CORPUS, corpora.join("sample.toml")).unwrap();
    std::fs::write(corpora.join("broken.toml"), "[[items]\nid = ").unwrap();

    altertest(dir.path())
        .args(["validate", "--corpus", "corpora"])
        .assert()
        .success()
        .stdout(predicate::str::contains("9 items"))
        .stdout(predicate::str::contains("SKIPPED"))
        .stdout(predicate::str::contains("1 file(s) skipped."))
        .stdout(predicate::str::contains("All corpus items valid").not());
}

#[test]
fn classify_reports_unknown_when_service_is_down() {
    let dir = TempDir::new().unwrap();
    let config = unreachable_config(dir.path());

    altertest(dir.path())
        .args(["classify", "--text", "An abstract about memory."])
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Guess: unknown"))
        .stdout(predicate::str::contains("inference unavailable"));
}

#[test]
fn classify_requires_input() {
    let dir = TempDir::new().unwrap();

    altertest(dir.path())
        .arg("classify")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--text or --file"));
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    altertest(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("altered"));
}
