//! Batchrun CLI
//!
//! Command-line interface for dispatching a batch of input files to a remote
//! compute pool and collecting the results.

mod commands;

use anyhow::{Context, Result};
use batchrun_dispatcher::{Config, Credentials};
use clap::Parser;
use commands::{Commands, handle_command};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log filter used when RUST_LOG is unset
const DEFAULT_LOG_FILTER: &str = "batchrun=info,batchrun_dispatcher=info,batchrun_client=info";

#[derive(Parser)]
#[command(name = "batchrun")]
#[command(about = "Run a batch of files on a remote compute pool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; real environment variables still apply
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays clean for results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let credentials =
        Credentials::from_env().context("Account credentials are not fully configured")?;
    let config = Config::from_env().context("Invalid run configuration")?;

    handle_command(cli.command, config, &credentials).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_filter_covers_every_crate() {
        let filter = tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).unwrap();
        let rendered = filter.to_string().to_lowercase();
        for target in ["batchrun", "batchrun_dispatcher", "batchrun_client"] {
            assert!(rendered.contains(&format!("{}=info", target)));
        }
    }
}
