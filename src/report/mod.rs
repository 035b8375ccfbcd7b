//! Sector report assembly
//!
//! Composes the news, sentiment, market, and risk modules into one
//! `SectorReport` per run, and persists a sentiment snapshot so sector
//! tone can be tracked over time.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use sqlx::Row;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::data::{market, MarketDataClient, NewsArticle, NewsClient, SentimentSnapshot};
use crate::risk::{self, RiskConfig, SectorRiskMetrics, VolatilityRegime};
use crate::sectors::Sector;
use crate::sentiment::{SentimentAnalyzer, SentimentSummary};

/// How many headlines a report carries
const HEADLINE_COUNT: usize = 5;

/// Full per-sector analysis output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorReport {
    pub sector: Sector,
    pub generated_at: DateTime<Utc>,
    pub sentiment: SentimentSummary,
    pub headlines: Vec<NewsArticle>,
    pub metrics: SectorRiskMetrics,
    pub vix: Option<f64>,
    pub regime: Option<VolatilityRegime>,
}

pub struct SectorReportBuilder {
    pool: PgPool,
    news: NewsClient,
    market: MarketDataClient,
    analyzer: SentimentAnalyzer,
    risk_config: RiskConfig,
    benchmark_ticker: String,
    history_days: u32,
}

impl SectorReportBuilder {
    pub fn new(pool: PgPool, config: &Config) -> Result<Self> {
        let news = NewsClient::new(pool.clone(), config.apis.news_api_key.clone())
            .context("Failed to build news client")?
            .with_window(config.analysis.news_window_days, config.analysis.news_page_size);

        let market = MarketDataClient::new(pool.clone(), config.apis.polygon_api_key.clone())
            .context("Failed to build market data client")?;

        let risk_config = RiskConfig {
            risk_free_rate: config.analysis.risk_free_rate,
            ..RiskConfig::default()
        };

        Ok(Self {
            pool,
            news,
            market,
            analyzer: SentimentAnalyzer::new(),
            risk_config,
            benchmark_ticker: config.analysis.benchmark_ticker.clone(),
            history_days: config.analysis.history_days,
        })
    }

    pub fn news(&self) -> &NewsClient {
        &self.news
    }

    pub fn market(&self) -> &MarketDataClient {
        &self.market
    }

    pub fn analyzer(&self) -> &SentimentAnalyzer {
        &self.analyzer
    }

    pub fn risk_config(&self) -> &RiskConfig {
        &self.risk_config
    }

    pub fn history_days(&self) -> u32 {
        self.history_days
    }

    /// Fetch news for a sector and score it
    pub async fn sentiment_for(
        &self,
        sector: &Sector,
    ) -> Result<(SentimentSummary, Vec<NewsArticle>)> {
        let mut articles = self.news.fetch_sector_news(sector).await?;
        self.analyzer.score_all(&mut articles);
        let summary = self.analyzer.summarize(&articles);

        if articles.is_empty() {
            warn!(sector = %sector, "No news articles found");
        }

        Ok((summary, articles))
    }

    /// Fetch price history and compute risk metrics for a sector
    pub async fn metrics_for(&self, sector: &Sector) -> Result<SectorRiskMetrics> {
        let bars = self
            .market
            .fetch_daily(sector.etf(), self.history_days)
            .await?;
        self.market.persist_daily(&bars).await?;

        let benchmark = self
            .market
            .fetch_daily(&self.benchmark_ticker, self.history_days)
            .await?;

        let metrics = risk::compute_metrics(&bars, &market::closes(&benchmark), &self.risk_config)?;
        Ok(metrics)
    }

    /// Build the full report for one sector
    pub async fn build(&self, sector: &Sector) -> Result<SectorReport> {
        info!(sector = %sector, etf = sector.etf(), "Building sector report");

        let (sentiment, mut articles) = self.sentiment_for(sector).await?;
        let metrics = self.metrics_for(sector).await?;

        // VIX context is optional; a failed fetch degrades the report
        // instead of aborting it
        let vix = match self.market.fetch_vix().await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("VIX fetch failed, omitting volatility context: {}", e);
                None
            }
        };
        let regime = vix.map(VolatilityRegime::from_vix);

        articles.truncate(HEADLINE_COUNT);

        let report = SectorReport {
            sector: *sector,
            generated_at: Utc::now(),
            sentiment,
            headlines: articles,
            metrics,
            vix,
            regime,
        };

        self.persist_snapshot(&report).await?;
        Ok(report)
    }

    /// Record this run's sentiment reading
    async fn persist_snapshot(&self, report: &SectorReport) -> Result<()> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO sentiment_snapshots (id, captured_at, sector, score, article_count, meta)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(report.generated_at)
        .bind(report.sector.name())
        .bind(report.sentiment.mean_score)
        .bind(report.sentiment.article_count as i32)
        .bind(json!({
            "tone": report.sentiment.tone.as_str(),
            "positive": report.sentiment.positive,
            "negative": report.sentiment.negative,
            "neutral": report.sentiment.neutral,
            "beta": report.metrics.beta,
            "rating": report.metrics.rating.as_str(),
            "vix": report.vix,
        }))
        .execute(&self.pool)
        .await
        .context("Failed to persist sentiment snapshot")?;

        info!(snapshot = %id, sector = %report.sector, "Persisted sentiment snapshot");
        Ok(())
    }

    /// Recent persisted sentiment snapshots for a sector, newest first
    pub async fn recent_snapshots(
        &self,
        sector: &Sector,
        limit: i64,
    ) -> Result<Vec<SentimentSnapshot>> {
        let rows = sqlx::query(
            r#"
            SELECT id, captured_at, sector, score, article_count, meta
            FROM sentiment_snapshots
            WHERE sector = $1
            ORDER BY captured_at DESC
            LIMIT $2
            "#,
        )
        .bind(sector.name())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load sentiment snapshots")?;

        let snapshots = rows
            .into_iter()
            .map(|row| SentimentSnapshot {
                id: row.get("id"),
                captured_at: row.get("captured_at"),
                sector: row.get("sector"),
                score: row.get("score"),
                article_count: row.get("article_count"),
                meta: row.get("meta"),
            })
            .collect();

        Ok(snapshots)
    }
}
