use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub apis: ApiConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub news_api_key: Option<String>,
    pub polygon_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// News lookback window in days
    pub news_window_days: i64,
    /// Max articles fetched per sector query
    pub news_page_size: u32,
    /// Benchmark ticker for beta computation
    pub benchmark_ticker: String,
    /// Annual risk-free rate used in the Sharpe ratio
    pub risk_free_rate: f64,
    /// Price history window in days for risk metrics
    pub history_days: u32,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env first so it can provide anything missing from the shell env
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .context("DATABASE_URL environment variable is required but not set")?;

        let config = Config {
            database: DatabaseConfig {
                url: database_url,
                max_connections: env::var("DB_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .context("Invalid DB_MAX_CONNECTIONS value")?,
                min_connections: env::var("DB_MIN_CONNECTIONS")
                    .unwrap_or_else(|_| "1".to_string())
                    .parse()
                    .context("Invalid DB_MIN_CONNECTIONS value")?,
            },
            apis: ApiConfig {
                news_api_key: env::var("NEWS_API_KEY").ok(),
                polygon_api_key: env::var("POLYGON_API_KEY").ok(),
            },
            analysis: AnalysisConfig {
                news_window_days: env::var("NEWS_WINDOW_DAYS")
                    .unwrap_or_else(|_| "7".to_string())
                    .parse()
                    .context("Invalid NEWS_WINDOW_DAYS value")?,
                news_page_size: env::var("NEWS_PAGE_SIZE")
                    .unwrap_or_else(|_| "50".to_string())
                    .parse()
                    .context("Invalid NEWS_PAGE_SIZE value")?,
                benchmark_ticker: env::var("BENCHMARK_TICKER")
                    .unwrap_or_else(|_| "SPY".to_string()),
                risk_free_rate: env::var("RISK_FREE_RATE")
                    .unwrap_or_else(|_| "0.0".to_string())
                    .parse()
                    .context("Invalid RISK_FREE_RATE value")?,
                history_days: env::var("HISTORY_DAYS")
                    .unwrap_or_else(|_| "365".to_string())
                    .parse()
                    .context("Invalid HISTORY_DAYS value")?,
            },
        };

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/sectorpulse".to_string(),
                max_connections: 5,
                min_connections: 1,
            },
            apis: ApiConfig {
                news_api_key: None,
                polygon_api_key: None,
            },
            analysis: AnalysisConfig {
                news_window_days: 7,
                news_page_size: 50,
                benchmark_ticker: "SPY".to_string(),
                risk_free_rate: 0.0,
                history_days: 365,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_analysis_settings() {
        let config = Config::default();
        assert_eq!(config.analysis.benchmark_ticker, "SPY");
        assert_eq!(config.analysis.news_window_days, 7);
        assert_eq!(config.analysis.history_days, 365);
    }
}
