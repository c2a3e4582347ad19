//! Certvault - Main entry point
//!
//! Runs one certificate issuance/renewal pass and prints the structured
//! result. The process exit code mirrors the result class so schedulers
//! that only look at exit status still observe failures.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use certvault_renewer::handle;

/// Certvault - ACME certificate renewal into AWS Secrets Manager
#[derive(Parser, Debug)]
#[command(name = "certvault")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Optional trigger payload file (content is ignored, activation only)
    #[arg(short = 'e', long = "event-file")]
    event_file: Option<std::path::PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(long = "verbose")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbose flag
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let event = match &cli.event_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read event file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("event file {} is not valid JSON", path.display()))?
        }
        None => serde_json::Value::Null,
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let response = runtime.block_on(handle(event));

    info!(status = response.status_code, "Run finished");
    println!("{}", serde_json::to_string(&response)?);

    if response.status_code != 200 {
        std::process::exit(1);
    }
    Ok(())
}
