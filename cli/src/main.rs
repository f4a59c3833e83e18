//! Freshwatch CLI
//!
//! Command-line interface for checking freshness targets without running the exporter.
//!
//! # Usage
//!
//! ```bash
//! freshwatch --help
//! freshwatch validate --config config.yaml
//! freshwatch check --config config.yaml --json
//! ```

#![deny(unsafe_code)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use shared::config::TargetsConfig;
use shared::models::{ProbeOutcome, Target};
use shared::probes;
use shared::storage::{ObjectStore, S3ObjectStore};
use std::path::PathBuf;

/// Freshwatch CLI - data freshness probes from the command line
#[derive(Parser)]
#[command(name = "freshwatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Targets file
    #[arg(
        short,
        long,
        global = true,
        env = "FRESHWATCH_CONFIG",
        default_value = "config.yaml"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe every target once and print the results
    Check {
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Parse the targets file and print how many targets each section holds
    Validate,
}

/// One probed target, as printed by `check`.
#[derive(Debug, Serialize)]
struct CheckRow {
    kind: String,
    labels: Vec<String>,
    value: f64,
    #[serde(flatten)]
    outcome: ProbeOutcome,
}

impl CheckRow {
    fn new(target: &Target, outcome: ProbeOutcome) -> Self {
        Self {
            kind: target.kind().to_string(),
            labels: target
                .label_values()
                .into_iter()
                .map(str::to_string)
                .collect(),
            value: outcome.gauge_value(),
            outcome,
        }
    }
}

async fn check(config: &TargetsConfig, store: &dyn ObjectStore) -> anyhow::Result<Vec<CheckRow>> {
    let mut rows = Vec::with_capacity(config.target_count());
    for target in config.targets() {
        let outcome = probes::probe(store, &target)
            .await
            .with_context(|| format!("Probe failed for {target}"))?;
        tracing::debug!(name = %target, %outcome, "Probed target");
        rows.push(CheckRow::new(&target, outcome));
    }
    Ok(rows)
}

fn section_counts(config: &TargetsConfig) -> [(&'static str, usize); 4] {
    [
        ("folders", config.folders.as_ref().map_or(0, Vec::len)),
        ("regex_folders", config.regex_folders.as_ref().map_or(0, Vec::len)),
        ("files", config.files.as_ref().map_or(0, Vec::len)),
        ("s3_buckets", config.s3_buckets.as_ref().map_or(0, Vec::len)),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Check { json }) => {
            let config = TargetsConfig::load(&cli.config)?;
            let store = S3ObjectStore::from_env().await;
            let rows = check(&config, &store).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in &rows {
                    println!("{:<13} {:>10.2}  {}", row.kind, row.value, row.labels.join(" "));
                }
            }
        }
        Some(Commands::Validate) => {
            let config = TargetsConfig::load(&cli.config)?;
            println!("{}: {} targets", cli.config.display(), config.target_count());
            for (section, count) in section_counts(&config) {
                println!("  {section:<14} {count}");
            }
        }
        None => {
            println!("Freshwatch CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
