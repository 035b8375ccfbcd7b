use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;
use crate::data::market;
use crate::report::{SectorReport, SectorReportBuilder};
use crate::risk::{self, CorrelationMatrix};
use crate::sectors::Sector;

/// Full sector report: the sentiment, risk, and performance views in one run
pub async fn report(pool: PgPool, sector: Sector) -> Result<()> {
    let config = Config::load()?;
    let builder = SectorReportBuilder::new(pool, &config)?;

    let report = builder.build(&sector).await?;

    println!("\n📊 {} Sector Report — {}", report.sector, report.generated_at.format("%Y-%m-%d %H:%M UTC"));
    print_sentiment_section(&report);
    print_metrics_section(&report);

    if let (Some(vix), Some(regime)) = (report.vix, report.regime) {
        println!("\n🌡  Market Volatility:");
        println!("   VIX: {:.2} ({})", vix, regime.as_str());
        println!("   {}", regime.interpretation());
    }

    Ok(())
}

/// News sentiment summary for a sector
pub async fn sentiment(pool: PgPool, sector: Sector) -> Result<()> {
    let config = Config::load()?;
    let builder = SectorReportBuilder::new(pool, &config)?;

    let (summary, articles) = builder.sentiment_for(&sector).await?;

    println!("\n📰 News Sentiment — {} Sector", sector);
    println!("   Articles analyzed: {}", summary.article_count);
    println!("   Average score: {:+.3}", summary.mean_score);
    println!(
        "   Breakdown: {} positive / {} negative / {} neutral",
        summary.positive, summary.negative, summary.neutral
    );
    println!("   Overall tone: {}", summary.tone.as_str());

    if articles.is_empty() {
        println!("\n   No news articles found for this sector.");
        return Ok(());
    }

    println!("\n   Recent headlines:");
    for article in articles.iter().take(5) {
        println!(
            "   [{:+.2}] {} ({})",
            article.sentiment.unwrap_or(0.0),
            article.title,
            article.source
        );
    }

    Ok(())
}

/// Risk metrics and assessment for a sector ETF
pub async fn metrics(pool: PgPool, sector: Sector) -> Result<()> {
    let config = Config::load()?;
    let builder = SectorReportBuilder::new(pool, &config)?;

    let metrics = builder.metrics_for(&sector).await?;

    println!("\n⚖️  Risk Metrics — {} ({})", sector, metrics.ticker);
    println!("   Beta (vs {}): {:.2}", config.analysis.benchmark_ticker, metrics.beta);
    println!("   Annualized Return: {:.2}%", metrics.annualized_return * 100.0);
    println!("   Annualized Volatility: {:.2}%", metrics.annualized_volatility * 100.0);
    println!("   Sharpe Ratio: {:.2}", metrics.sharpe_ratio);
    println!("   Max Drawdown: {:.2}%", metrics.max_drawdown * 100.0);
    println!("   52 Week High: ${:.2}", metrics.high_52w);
    println!("   52 Week Low: ${:.2}", metrics.low_52w);
    println!("   Average Volume: {:.0}", metrics.avg_volume);
    println!("\n   {}: {}", metrics.rating.as_str(), metrics.rating.assessment());

    Ok(())
}

/// Historical performance statistics for a sector ETF
pub async fn history(pool: PgPool, sector: Sector, days: Option<u32>) -> Result<()> {
    let config = Config::load()?;
    let builder = SectorReportBuilder::new(pool, &config)?;
    let days = days.unwrap_or(builder.history_days());

    let bars = builder.market().fetch_daily(sector.etf(), days).await?;
    builder.market().persist_daily(&bars).await?;

    let closes = market::closes(&bars);
    let returns = risk::daily_returns(&closes);

    let first = closes.first().copied().unwrap_or(0.0);
    let last = closes.last().copied().unwrap_or(0.0);
    let period_change = if first > 0.0 {
        (last - first) / first * 100.0
    } else {
        0.0
    };

    println!("\n📈 Historical Performance — {} ({}, {} days)", sector, sector.etf(), days);
    println!("   Bars: {}", bars.len());
    println!("   Close: ${:.2} (period change {:+.2}%)", last, period_change);
    println!("   Annualized Return: {:.2}%", risk::annualized_return(&returns) * 100.0);
    println!(
        "   Annualized Volatility: {:.2}%",
        risk::annualized_volatility(&returns) * 100.0
    );
    println!(
        "   Sharpe Ratio: {:.2}",
        risk::sharpe_ratio(&returns, config.analysis.risk_free_rate)
    );
    println!("   Max Drawdown: {:.2}%", risk::max_drawdown(&closes) * 100.0);
    println!("   SMA 20: ${:.2}", risk::sma(&closes, 20));
    println!("   SMA 50: ${:.2}", risk::sma(&closes, 50));

    Ok(())
}

/// Cross-sector return correlation matrix
pub async fn correlate(
    pool: PgPool,
    days: Option<u32>,
    sectors: Option<Vec<Sector>>,
) -> Result<()> {
    let config = Config::load()?;
    let builder = SectorReportBuilder::new(pool, &config)?;
    let days = days.unwrap_or(builder.history_days());
    let sectors = sectors.unwrap_or_else(|| Sector::all().to_vec());

    info!("Fetching daily bars for {} sectors", sectors.len());

    let mut series = Vec::with_capacity(sectors.len());
    for sector in &sectors {
        let bars = builder.market().fetch_daily(sector.etf(), days).await?;
        builder.market().persist_daily(&bars).await?;
        let returns = risk::daily_returns(&market::closes(&bars));
        series.push((sector.etf().to_string(), returns));
    }

    let matrix = CorrelationMatrix::compute(&series);

    println!("\n🔗 Sector Return Correlation ({} days)", days);
    print!("{:>7}", "");
    for label in &matrix.labels {
        print!("{:>7}", label);
    }
    println!();

    for (i, label) in matrix.labels.iter().enumerate() {
        print!("{:>7}", label);
        for j in 0..matrix.labels.len() {
            print!("{:>7.2}", matrix.get(i, j));
        }
        println!();
    }

    if let Some((a, b, value)) = matrix.most_correlated() {
        println!("\n   Most correlated: {} / {} ({:.2})", a, b, value);
    }
    if let Some((a, b, value)) = matrix.least_correlated() {
        println!("   Least correlated: {} / {} ({:.2})", a, b, value);
    }

    Ok(())
}

/// List sectors and their ETF tickers
pub fn sectors() -> Result<()> {
    println!("\n🏷  Tracked sectors:");
    for sector in Sector::all() {
        println!("   {:<24} {}", sector.name(), sector.etf());
    }
    Ok(())
}

/// Fetch and persist raw daily bars for any ticker
pub async fn fetch(pool: PgPool, ticker: String, days: u32) -> Result<()> {
    let config = Config::load()?;
    let builder = SectorReportBuilder::new(pool, &config)?;

    let bars = builder.market().fetch_daily(&ticker, days).await?;
    let persisted = builder.market().persist_daily(&bars).await?;

    println!("\n✅ Fetched {} bars for {} ({} persisted)", bars.len(), ticker, persisted);
    if let Some(latest) = bars.last() {
        println!(
            "   Latest: {} close ${:.2} volume {}",
            latest.date, latest.close, latest.volume
        );
    }

    Ok(())
}

/// Show recent persisted sentiment snapshots for a sector
pub async fn snapshots(pool: PgPool, sector: Sector, limit: i64) -> Result<()> {
    let config = Config::load()?;
    let builder = SectorReportBuilder::new(pool, &config)?;

    let snapshots = builder.recent_snapshots(&sector, limit).await?;

    if snapshots.is_empty() {
        println!("\nNo sentiment snapshots recorded for {} yet.", sector);
        println!("Run `sectorpulse report --sector {}` to create one.", sector.etf().to_lowercase());
        return Ok(());
    }

    println!("\n🕒 Sentiment history — {} Sector", sector);
    for snapshot in snapshots {
        println!(
            "   {}  score {:+.3}  ({} articles)",
            snapshot.captured_at.format("%Y-%m-%d %H:%M"),
            snapshot.score,
            snapshot.article_count
        );
    }

    Ok(())
}

fn print_sentiment_section(report: &SectorReport) {
    println!("\n📰 News Sentiment:");
    println!(
        "   {} articles, average score {:+.3} — {}",
        report.sentiment.article_count,
        report.sentiment.mean_score,
        report.sentiment.tone.as_str()
    );

    if report.headlines.is_empty() {
        println!("   No news articles found for this sector.");
    } else {
        for article in &report.headlines {
            println!(
                "   [{:+.2}] {} ({})",
                article.sentiment.unwrap_or(0.0),
                article.title,
                article.source
            );
        }
    }
}

fn print_metrics_section(report: &SectorReport) {
    let m = &report.metrics;
    println!("\n⚖️  Risk Metrics ({}):", m.ticker);
    println!(
        "   Beta {:.2} | Return {:.2}% | Volatility {:.2}% | Sharpe {:.2}",
        m.beta,
        m.annualized_return * 100.0,
        m.annualized_volatility * 100.0,
        m.sharpe_ratio
    );
    println!(
        "   52w range ${:.2} - ${:.2} | Max drawdown {:.2}% | Avg volume {:.0}",
        m.low_52w,
        m.high_52w,
        m.max_drawdown * 100.0,
        m.avg_volume
    );
    println!("   {}: {}", m.rating.as_str(), m.rating.assessment());
}
