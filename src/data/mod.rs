//! Data pipeline: news ingestion, market data, and shared types
//! Provides the error taxonomy and validation used across fetch paths

pub mod errors;
pub mod market;
pub mod news;
pub mod retry;

// Re-export commonly used types
pub use errors::{DataError, DataResult};
pub use market::{MarketDataClient, Ohlcv};
pub use news::NewsClient;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A news article, optionally carrying its sentiment score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub sentiment: Option<f64>, // -1.0 to 1.0
}

/// A persisted point-in-time sentiment reading for a sector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSnapshot {
    pub id: Uuid,
    pub captured_at: DateTime<Utc>,
    pub sector: String,
    pub score: f64,
    pub article_count: i32,
    pub meta: serde_json::Value,
}

/// Validation helpers
pub mod validation {
    use super::*;

    /// Validate a ticker symbol (US listings, incl. index symbols like ^VIX)
    pub fn validate_ticker(ticker: &str) -> DataResult<()> {
        if ticker.is_empty() {
            return Err(DataError::validation_error("ticker", "Ticker cannot be empty"));
        }

        if ticker.len() > 10 {
            return Err(DataError::validation_error(
                "ticker",
                "Ticker too long (max 10 chars)",
            ));
        }

        let mut chars = ticker.chars();
        let rest = if ticker.starts_with('^') {
            chars.next();
            chars.as_str()
        } else {
            ticker
        };

        if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DataError::validation_error(
                "ticker",
                "Ticker must contain only letters",
            ));
        }

        Ok(())
    }

    /// Validate a daily OHLCV bar
    pub fn validate_bar(bar: &Ohlcv) -> DataResult<()> {
        validate_ticker(&bar.ticker)?;

        for (field, value) in [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
        ] {
            if value <= 0.0 {
                return Err(DataError::Validation {
                    field: field.to_string(),
                    message: "Price must be positive".to_string(),
                });
            }
        }

        if bar.volume < 0 {
            return Err(DataError::validation_error("volume", "Volume cannot be negative"));
        }

        if bar.high < bar.low {
            return Err(DataError::validation_error(
                "high_low",
                "High price cannot be less than low price",
            ));
        }

        if bar.high < bar.open.max(bar.close) {
            return Err(DataError::validation_error(
                "high",
                "High price should be >= open and close",
            ));
        }

        if bar.low > bar.open.min(bar.close) {
            return Err(DataError::validation_error(
                "low",
                "Low price should be <= open and close",
            ));
        }

        Ok(())
    }

    /// Validate a sentiment score
    pub fn validate_score(score: f64) -> DataResult<()> {
        if !(-1.0..=1.0).contains(&score) {
            return Err(DataError::validation_error(
                "sentiment_score",
                "Sentiment score must be between -1.0 and 1.0",
            ));
        }
        Ok(())
    }
}
