//! Canvas API CLI
//!
//! Command-line interface for the Canvas LMS REST API

use canvas_api::cli::{Cli, Runner};
use canvas_api::Error;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        if let Some(api_error) = e.downcast_ref::<Error>().and_then(Error::api_error) {
            if let Ok(json) = serde_json::to_string_pretty(api_error) {
                eprintln!("{json}");
            }
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    Runner::new(cli).run().await?;
    Ok(())
}
