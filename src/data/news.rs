use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use super::retry::retry_with_backoff;
use super::{DataError, DataResult, NewsArticle};
use crate::sectors::Sector;

const NEWSAPI_EVERYTHING_URL: &str = "https://newsapi.org/v2/everything";

/// NewsAPI response envelope
#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    source: RawSource,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    name: Option<String>,
}

pub struct NewsClient {
    pool: PgPool,
    api_key: Option<String>,
    http_client: reqwest::Client,
    window_days: i64,
    page_size: u32,
}

impl NewsClient {
    pub fn new(pool: PgPool, api_key: Option<String>) -> DataResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(concat!("sectorpulse/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            pool,
            api_key,
            http_client,
            window_days: 7,
            page_size: 50,
        })
    }

    pub fn with_window(mut self, window_days: i64, page_size: u32) -> Self {
        self.window_days = window_days;
        self.page_size = page_size;
        self
    }

    /// Fetch recent news for a sector and persist the articles.
    ///
    /// Articles come back unscored (`sentiment: None`); scoring is the
    /// sentiment module's job.
    pub async fn fetch_sector_news(&self, sector: &Sector) -> DataResult<Vec<NewsArticle>> {
        let query = sector.news_query();
        tracing::info!(sector = %sector, "Fetching news: {}", query);

        let articles = self.fetch_everything(&query).await?;
        self.persist_articles(&articles).await?;
        Ok(articles)
    }

    async fn fetch_everything(&self, query: &str) -> DataResult<Vec<NewsArticle>> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            DataError::Config(
                "NEWS_API_KEY is not set. Get a free key from https://newsapi.org and add it to your .env".to_string(),
            )
        })?;

        let from_date = (Utc::now() - Duration::days(self.window_days))
            .format("%Y-%m-%d")
            .to_string();

        retry_with_backoff(
            || async {
                let url = format!(
                    "{}?q={}&language=en&sortBy=publishedAt&from={}&pageSize={}&apiKey={}",
                    NEWSAPI_EVERYTHING_URL,
                    urlencoding::encode(query),
                    from_date,
                    self.page_size,
                    api_key
                );

                tracing::debug!("NewsAPI request: GET {}", url.replace(api_key.as_str(), "***"));

                let response = self.http_client.get(&url).send().await?;

                if !response.status().is_success() {
                    let status = response.status().as_u16();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    return Err(DataError::api_error(status, format!("NewsAPI: {}", body)));
                }

                let parsed: NewsApiResponse = response.json().await?;

                if parsed.status != "ok" {
                    return Err(DataError::Internal(format!(
                        "NewsAPI returned status '{}': {} ({})",
                        parsed.status,
                        parsed.message.unwrap_or_default(),
                        parsed.code.unwrap_or_default()
                    )));
                }

                let articles: Vec<NewsArticle> = parsed
                    .articles
                    .into_iter()
                    .filter_map(|raw| {
                        // Articles without a title or URL are not scoreable or citable
                        let title = raw.title?;
                        let url = raw.url?;
                        Some(NewsArticle {
                            title,
                            description: raw.description,
                            url,
                            source: raw.source.name.unwrap_or_else(|| "Unknown".to_string()),
                            published_at: raw.published_at.unwrap_or_else(Utc::now),
                            sentiment: None,
                        })
                    })
                    .collect();

                tracing::info!("Fetched {} news articles from NewsAPI", articles.len());
                Ok(articles)
            },
            2,
        )
        .await
    }

    /// Persist articles, skipping URLs already stored
    async fn persist_articles(&self, articles: &[NewsArticle]) -> DataResult<()> {
        for article in articles {
            sqlx::query(
                r#"
                INSERT INTO news_articles (url, title, description, source, published_at, fetched_at, meta)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (url) DO NOTHING
                "#,
            )
            .bind(&article.url)
            .bind(&article.title)
            .bind(&article.description)
            .bind(&article.source)
            .bind(article.published_at)
            .bind(Utc::now())
            .bind(json!({ "sentiment": article.sentiment }))
            .execute(&self.pool)
            .await?;
        }

        tracing::info!("Persisted {} news articles", articles.len());
        Ok(())
    }
}
