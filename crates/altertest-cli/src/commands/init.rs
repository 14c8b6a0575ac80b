//! The `altertest init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create altertest.toml
    if std::path::Path::new("altertest.toml").exists() {
        println!("altertest.toml already exists, skipping.");
    } else {
        std::fs::write("altertest.toml", SAMPLE_CONFIG)?;
        println!("Created altertest.toml");
    }

    // Create example corpus
    std::fs::create_dir_all("corpora")?;
    let example_path = std::path::Path::new("corpora/example.toml");
    if example_path.exists() {
        println!("corpora/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_CORPUS)?;
        println!("Created corpora/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Point inference.endpoint in altertest.toml at your classifier");
    println!("  2. Run: altertest validate --corpus corpora/example.toml");
    println!("  3. Run: altertest run --corpus corpora/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# altertest configuration

corpus = "corpora/example.toml"
output_dir = "./altertest-results"

[inference]
endpoint = "http://localhost:8080/infer"
timeout_secs = 45
api_key = "${ALTERTEST_API_KEY}"

[session]
trial_count = 3
confidence_max = 100
ttl_secs = 3600
compare_model = true
"#;

const EXAMPLE_CORPUS: &str = r#"[corpus]
name = "Example corpus"
description = "A small corpus to get started"

[[items]]
id = "memory-span"
section = "cognitive"
original = """
Working memory capacity predicts performance on a wide range of reasoning tasks. \
Across three experiments, capacity estimates from complex span tasks accounted for \
unique variance in fluid intelligence after controlling for processing speed.
"""
altered = """
Working memory capacity predicts performance on a wide range of reasoning tasks. \
Across three experiments, capacity estimates from complex span tasks accounted for \
no unique variance in fluid intelligence after controlling for processing speed.
"""

[[items]]
id = "sleep-recall"
section = "cognitive"
original = """
Sleep after learning improves retention of declarative material. Participants who \
napped for ninety minutes recalled more word pairs a week later than those who \
stayed awake, and the benefit tracked slow wave sleep duration.
"""
altered = """
Sleep after learning improves retention of declarative material. Participants who \
napped for ninety minutes recalled more word pairs a week later than those who \
stayed awake, and the benefit tracked REM sleep duration.
"""

[[items]]
id = "number-line"
section = "cognitive"
original = """
Children's estimates on a number line shift from logarithmic to linear patterns \
between second and fourth grade, and linearity predicted later arithmetic \
achievement independently of verbal ability.
"""
altered = """
Children's estimates on a number line shift from linear to logarithmic patterns \
between second and fourth grade, and linearity predicted later arithmetic \
achievement independently of verbal ability.
"""
"#;
