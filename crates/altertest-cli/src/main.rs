//! altertest CLI — console front end for the altered-abstract experiment.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "altertest",
    version,
    about = "Can you tell an original research abstract from an AI-altered one?"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive session
    Run {
        /// Corpus .toml file or directory (defaults to `corpus` in config)
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Only draw abstracts from this section
        #[arg(long)]
        section: Option<String>,

        /// Number of trials (defaults to session.trial_count in config)
        #[arg(long)]
        trials: Option<usize>,

        /// Skip the model comparison
        #[arg(long)]
        no_model: bool,

        /// RNG seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Directory for the JSON session report (defaults to output_dir in config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Ask the inference service about a single abstract
    Classify {
        /// Abstract text
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// File containing the abstract
        #[arg(long)]
        file: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate corpus TOML files
    Validate {
        /// Path to corpus file or directory
        #[arg(long)]
        corpus: PathBuf,
    },

    /// Print a saved session report
    Report {
        /// Report JSON written by `run --output`
        #[arg(long)]
        input: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create starter config and example corpus
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "altertest=info,altertest_core=info,altertest_inference=info",
        )
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            corpus,
            section,
            trials,
            no_model,
            seed,
            output,
            config,
        } => {
            commands::run::execute(commands::run::RunArgs {
                corpus,
                section,
                trials,
                no_model,
                seed,
                output,
                config,
            })
            .await
        }
        Commands::Classify { text, file, config } => {
            commands::classify::execute(text, file, config).await
        }
        Commands::Validate { corpus } => commands::validate::execute(corpus),
        Commands::Report { input, format } => commands::report::execute(input, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
