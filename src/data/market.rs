use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::retry::retry_with_backoff;
use super::{DataError, DataResult};

/// A daily OHLCV bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ohlcv {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub source: String,
}

/// Polygon.io aggregates response
#[derive(Debug, Deserialize)]
struct AggregatesResponse {
    status: String,
    results: Option<Vec<Aggregate>>,
}

#[derive(Debug, Deserialize)]
struct Aggregate {
    #[serde(rename = "o")]
    open: f64,
    #[serde(rename = "h")]
    high: f64,
    #[serde(rename = "l")]
    low: f64,
    #[serde(rename = "c")]
    close: f64,
    #[serde(rename = "v")]
    volume: f64, // Polygon sometimes returns volume as float
    #[serde(rename = "t")]
    timestamp_ms: i64,
}

/// Token bucket for API call pacing
struct RateLimiter {
    tokens: f64,
    max_tokens: f64,
    refill_rate: f64, // tokens per second
    last_refill: DateTime<Utc>,
}

impl RateLimiter {
    fn new(max_tokens: f64, refill_rate: f64) -> Self {
        Self {
            tokens: max_tokens,
            max_tokens,
            refill_rate,
            last_refill: Utc::now(),
        }
    }

    fn refill(&mut self) {
        let now = Utc::now();
        let elapsed = (now - self.last_refill).num_milliseconds() as f64 / 1000.0;
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        self.last_refill = now;
    }

    fn try_consume(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Seconds until a token becomes available
    fn time_until_token(&mut self) -> f64 {
        self.refill();
        if self.tokens >= 1.0 {
            0.0
        } else {
            (1.0 - self.tokens) / self.refill_rate
        }
    }
}

pub struct MarketDataClient {
    http_client: reqwest::Client,
    pool: PgPool,
    api_key: Option<String>,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl MarketDataClient {
    pub fn new(pool: PgPool, api_key: Option<String>) -> DataResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(concat!("sectorpulse/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Polygon free tier allows 5 calls/minute; allow the full burst up front
        let rate_limiter = Arc::new(Mutex::new(RateLimiter::new(5.0, 5.0 / 60.0)));

        Ok(Self {
            http_client,
            pool,
            api_key,
            rate_limiter,
        })
    }

    /// Fetch daily bars for a ticker over the last `days` calendar days
    pub async fn fetch_daily(&self, ticker: &str, days: u32) -> DataResult<Vec<Ohlcv>> {
        super::validation::validate_ticker(ticker)?;

        let api_key = self.api_key.as_ref().ok_or_else(|| {
            DataError::Config(
                "POLYGON_API_KEY is not set. Get a free key from https://polygon.io and add it to your .env".to_string(),
            )
        })?;

        let end_date = Utc::now().date_naive();
        let start_date = end_date - chrono::Duration::days(days as i64);

        tracing::info!("Fetching daily bars for {} ({} to {})", ticker, start_date, end_date);

        self.wait_for_slot().await;

        retry_with_backoff(
            || async {
                let url = format!(
                    "https://api.polygon.io/v2/aggs/ticker/{}/range/1/day/{}/{}?adjusted=true&sort=asc&limit=50000&apiKey={}",
                    ticker,
                    start_date.format("%Y-%m-%d"),
                    end_date.format("%Y-%m-%d"),
                    api_key
                );

                tracing::debug!("Polygon request: GET {}", url.replace(api_key.as_str(), "***"));

                let response = self.http_client.get(&url).send().await?;

                if !response.status().is_success() {
                    let status = response.status().as_u16();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    return Err(DataError::api_error(
                        status,
                        format!("Polygon.io: {}. Check your API key and subscription tier.", body),
                    ));
                }

                let parsed: AggregatesResponse = response.json().await?;

                // DELAYED is what the free tier returns; the bars are still valid
                match parsed.status.as_str() {
                    "OK" => {}
                    "DELAYED" => {
                        tracing::warn!("Polygon.io returned delayed data (free/basic tier)");
                    }
                    status => {
                        return Err(DataError::Internal(format!(
                            "Polygon.io returned error status: {}. Check your API key and subscription tier.",
                            status
                        )));
                    }
                }

                let results = parsed.results.unwrap_or_default();
                if results.is_empty() {
                    return Err(DataError::NoData {
                        ticker: ticker.to_string(),
                        start: start_date.to_string(),
                        end: end_date.to_string(),
                    });
                }

                let mut bars = Vec::with_capacity(results.len());
                for agg in results {
                    let datetime =
                        DateTime::from_timestamp_millis(agg.timestamp_ms).ok_or_else(|| {
                            DataError::parse_error(format!(
                                "Invalid timestamp: {}",
                                agg.timestamp_ms
                            ))
                        })?;

                    bars.push(Ohlcv {
                        ticker: ticker.to_string(),
                        date: datetime.date_naive(),
                        open: agg.open,
                        high: agg.high,
                        low: agg.low,
                        close: agg.close,
                        volume: agg.volume as i64,
                        source: "polygon".to_string(),
                    });
                }

                tracing::info!("Fetched {} daily bars for {}", bars.len(), ticker);
                Ok(bars)
            },
            2,
        )
        .await
    }

    /// Block until the rate limiter grants a slot
    async fn wait_for_slot(&self) {
        loop {
            let wait_secs = {
                let mut limiter = self.rate_limiter.lock().await;
                if limiter.try_consume() {
                    return;
                }
                limiter.time_until_token()
            };

            tracing::info!("Rate limit: waiting {:.1}s before next API call", wait_secs);
            tokio::time::sleep(tokio::time::Duration::from_secs_f64(wait_secs.max(0.1))).await;
        }
    }

    /// Upsert daily bars keyed on (ticker, date, source)
    pub async fn persist_daily(&self, bars: &[Ohlcv]) -> DataResult<usize> {
        let mut count = 0;

        for bar in bars {
            let result = sqlx::query(
                r#"
                INSERT INTO ohlcv (ticker, date, open, high, low, close, volume, source)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (ticker, date, source)
                DO UPDATE SET
                    open = EXCLUDED.open,
                    high = EXCLUDED.high,
                    low = EXCLUDED.low,
                    close = EXCLUDED.close,
                    volume = EXCLUDED.volume
                "#,
            )
            .bind(&bar.ticker)
            .bind(bar.date)
            .bind(bar.open)
            .bind(bar.high)
            .bind(bar.low)
            .bind(bar.close)
            .bind(bar.volume)
            .bind(&bar.source)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() > 0 {
                count += 1;
            }
        }

        tracing::info!("Persisted {} OHLCV rows", count);
        Ok(count)
    }

    /// Latest VIX close, for market-level volatility context
    pub async fn fetch_vix(&self) -> DataResult<f64> {
        // A few calendar days of lookback covers weekends and holidays
        let bars = self.fetch_daily("^VIX", 7).await?;

        let latest = bars.last().ok_or_else(|| DataError::NoData {
            ticker: "^VIX".to_string(),
            start: "recent".to_string(),
            end: "recent".to_string(),
        })?;

        tracing::info!("Current VIX: {:.2}", latest.close);
        Ok(latest.close)
    }
}

/// Extract the close series from a run of bars
pub fn closes(bars: &[Ohlcv]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_ohlcv_serialization() {
        let bar = Ohlcv {
            ticker: "XLK".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date"),
            open: 100.0,
            high: 105.0,
            low: 99.0,
            close: 103.0,
            volume: 1_000_000,
            source: "polygon".to_string(),
        };

        let json = serde_json::to_string(&bar).expect("serializes");
        assert!(json.contains("XLK"));
        assert!(json.contains("2024-03-15"));
    }

    #[test]
    fn test_aggregate_response_parsing() {
        let body = r#"{
            "ticker": "XLE",
            "status": "DELAYED",
            "results": [
                {"o": 84.1, "h": 85.0, "l": 83.9, "c": 84.7, "v": 12345678.0, "t": 1710460800000}
            ]
        }"#;

        let parsed: AggregatesResponse = serde_json::from_str(body).expect("parses");
        assert_eq!(parsed.status, "DELAYED");
        let results = parsed.results.expect("has results");
        assert_eq!(results.len(), 1);
        assert!((results[0].close - 84.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rate_limiter_burst_then_empty() {
        let mut limiter = RateLimiter::new(2.0, 1.0 / 60.0);
        assert!(limiter.try_consume());
        assert!(limiter.try_consume());
        assert!(!limiter.try_consume());
        assert!(limiter.time_until_token() > 0.0);
    }
}
