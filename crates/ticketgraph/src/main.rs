//! Ticketgraph CLI binary.

use anyhow::Result;
use ticketgraph::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the ticketgraph CLI.
///
/// Uses tokio's `current_thread` runtime; commands are sequential and the
/// `SQLite` work runs on the blocking pool.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=ticketgraph=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ticketgraph=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting ticketgraph CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Ticketgraph CLI completed successfully");
    Ok(())
}
