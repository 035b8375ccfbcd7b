use anyhow::Result;
use clap::{Parser, Subcommand};
use sqlx::PgPool;
use tracing::info;

use crate::sectors::Sector;

pub mod commands;
pub mod migrate;

#[derive(Parser)]
#[command(
    name = "sectorpulse",
    about = "Sector-level news sentiment and risk analytics",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Full sector report: sentiment, risk metrics, and performance
    Report {
        /// Sector to analyze (name or ETF ticker, e.g. "energy" or "XLE")
        #[arg(short, long)]
        sector: Sector,
    },

    /// News sentiment summary for a sector
    Sentiment {
        /// Sector to analyze
        #[arg(short, long)]
        sector: Sector,
    },

    /// Risk metrics and assessment for a sector ETF
    Metrics {
        /// Sector to analyze
        #[arg(short, long)]
        sector: Sector,
    },

    /// Historical performance statistics for a sector ETF
    History {
        /// Sector to analyze
        #[arg(short, long)]
        sector: Sector,

        /// Lookback window in days (defaults to HISTORY_DAYS)
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Cross-sector return correlation matrix
    Correlate {
        /// Lookback window in days (defaults to HISTORY_DAYS)
        #[arg(short, long)]
        days: Option<u32>,

        /// Comma-separated sectors (defaults to all eleven)
        #[arg(long, value_delimiter = ',')]
        sectors: Option<Vec<Sector>>,
    },

    /// List sectors and their ETF tickers
    Sectors,

    /// Fetch and persist raw daily bars for a ticker
    Fetch {
        /// Ticker to fetch (e.g. SPY, XLK, ^VIX)
        #[arg(short, long)]
        ticker: String,

        /// Number of days to fetch
        #[arg(short, long, default_value = "30")]
        days: u32,
    },

    /// Recent persisted sentiment snapshots for a sector
    Snapshots {
        /// Sector to inspect
        #[arg(short, long)]
        sector: Sector,

        /// Maximum rows to show
        #[arg(short, long, default_value = "10")]
        limit: i64,
    },

    /// Run database migrations
    Migrate,
}

/// Execute the parsed CLI command
pub async fn run(cli: Cli, pool: PgPool) -> Result<()> {
    match cli.command {
        Commands::Report { sector } => {
            info!("Building full report for {}", sector);
            commands::report(pool, sector).await?;
        }
        Commands::Sentiment { sector } => {
            info!("Analyzing news sentiment for {}", sector);
            commands::sentiment(pool, sector).await?;
        }
        Commands::Metrics { sector } => {
            info!("Computing risk metrics for {}", sector);
            commands::metrics(pool, sector).await?;
        }
        Commands::History { sector, days } => {
            info!("Computing historical performance for {}", sector);
            commands::history(pool, sector, days).await?;
        }
        Commands::Correlate { days, sectors } => {
            info!("Computing cross-sector correlation");
            commands::correlate(pool, days, sectors).await?;
        }
        Commands::Sectors => {
            commands::sectors()?;
        }
        Commands::Fetch { ticker, days } => {
            info!("Fetching {} days of bars for {}", days, ticker);
            commands::fetch(pool, ticker, days).await?;
        }
        Commands::Snapshots { sector, limit } => {
            info!("Loading sentiment snapshots for {}", sector);
            commands::snapshots(pool, sector, limit).await?;
        }
        Commands::Migrate => {
            migrate::execute(pool).await?;
        }
    }
    Ok(())
}
