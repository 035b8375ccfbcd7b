use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sectorpulse::cli::{self, Cli};
use sectorpulse::config::Config;
use sectorpulse::db;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::load()?;

    // Initialize tracing with structured JSON logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "sectorpulse starting up");

    // Initialize database
    let db = db::Database::new(&config.database).await?;
    db.run_migrations().await?;
    db.health_check().await?;

    info!("Database initialized");

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    cli::run(cli, db.pool).await?;

    info!("sectorpulse completed");
    Ok(())
}
