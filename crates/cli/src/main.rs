//! receval - recommender configuration sweep
//!
//! This binary provides the command-line interface for evaluating
//! recommendation algorithms against held-out interactions.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use receval::{build_grid, resolve_selection, run_sweep};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use receval_core::config::Config;
use receval_storage::create_interaction_store;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "receval")]
#[command(about = "Sweep recommender configurations and report precision/recall")]
#[command(author, version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every combination of the selected algorithms, sizes and counts
    Run {
        /// Algorithm selectors (1-4) or names; prompted for when omitted
        #[arg(short, long, value_delimiter = ',', num_args = 1..)]
        algorithms: Vec<String>,
        /// Neighbourhood sizes; prompted for when omitted
        #[arg(short, long, value_delimiter = ',', num_args = 1..)]
        neighbourhood_sizes: Vec<usize>,
        /// Recommendation counts; prompted for when omitted
        #[arg(short, long, value_delimiter = ',', num_args = 1..)]
        recommendation_counts: Vec<usize>,
    },
    /// Print the effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;

    match cli.command {
        Some(Commands::Run {
            algorithms,
            neighbourhood_sizes,
            recommendation_counts,
        }) => {
            run(
                cli.config.as_deref(),
                algorithms,
                neighbourhood_sizes,
                recommendation_counts,
            )
            .await
        }
        Some(Commands::ShowConfig) => show_config(cli.config.as_deref()),
        None => {
            println!("Run 'receval run' to start an evaluation sweep, or --help for more options");
            Ok(())
        }
    }
}

/// Initialize logging system
///
/// `RUST_LOG` takes precedence over the verbosity flag.
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        let directives = ["receval", "receval_evaluation", "receval_models", "receval_storage"]
            .map(|target| format!("{target}={level}"))
            .join(",");
        EnvFilter::try_new(directives)
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load(config_path).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn run(
    config_path: Option<&Path>,
    algorithms: Vec<String>,
    neighbourhood_sizes: Vec<usize>,
    recommendation_counts: Vec<usize>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let selection = resolve_selection(algorithms, neighbourhood_sizes, recommendation_counts)?;
    let grid = build_grid(&selection)?;

    let store = create_interaction_store(&config.storage)
        .await
        .context("Failed to connect to the interaction store")?;

    let report = run_sweep(&config, &grid, store).await?;
    report.print_summary();
    info!("Reports written to {}", config.evaluation.output_dir);
    Ok(())
}

fn show_config(config_path: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if !config.storage.postgres_password.is_empty() {
        config.storage.postgres_password = "********".to_string();
    }
    print!("{}", config.to_toml_string()?);
    Ok(())
}
