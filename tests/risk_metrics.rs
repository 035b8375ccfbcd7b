//! Integration tests for the risk metrics pipeline
//! Runs the full metric computation over synthetic bar histories

use chrono::NaiveDate;
use sectorpulse::data::market::Ohlcv;
use sectorpulse::risk::{self, RiskConfig, RiskRating};

/// Build a run of daily bars from a close series
fn bars_from_closes(ticker: &str, closes: &[f64]) -> Vec<Ohlcv> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date");
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Ohlcv {
            ticker: ticker.to_string(),
            date: start + chrono::Duration::days(i as i64),
            open: close * 0.995,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1_000_000 + i as i64 * 10_000,
            source: "test".to_string(),
        })
        .collect()
}

/// Gently rising series with day-to-day variation
fn oscillating(start: f64, days: usize) -> Vec<f64> {
    let moves = [0.004, -0.002, 0.003, -0.001];
    let mut closes = Vec::with_capacity(days);
    let mut price = start;
    for i in 0..days {
        closes.push(price);
        price *= 1.0 + moves[i % moves.len()];
    }
    closes
}

#[test]
fn metrics_of_sector_tracking_benchmark_have_beta_one() {
    let closes = oscillating(100.0, 60);
    let bars = bars_from_closes("XLK", &closes);

    let metrics =
        risk::compute_metrics(&bars, &closes, &RiskConfig::default()).expect("metrics compute");

    assert!((metrics.beta - 1.0).abs() < 1e-9);
    assert_eq!(metrics.rating, RiskRating::Moderate);
    assert!(metrics.annualized_return > 0.0);
}

#[test]
fn amplified_sector_is_rated_high_risk() {
    // Benchmark oscillates; the sector moves twice as far each day
    let mut bench = vec![100.0];
    let mut sector = vec![100.0];
    for i in 1..80 {
        let move_pct = if i % 2 == 0 { 0.01 } else { -0.008 };
        let prev_b = *bench.last().expect("nonempty");
        let prev_s = *sector.last().expect("nonempty");
        bench.push(prev_b * (1.0 + move_pct));
        sector.push(prev_s * (1.0 + 2.0 * move_pct));
    }

    let bars = bars_from_closes("XLY", &sector);
    let metrics =
        risk::compute_metrics(&bars, &bench, &RiskConfig::default()).expect("metrics compute");

    assert!(metrics.beta > 1.2, "beta was {}", metrics.beta);
    assert_eq!(metrics.rating, RiskRating::High);
    assert!(metrics.annualized_volatility > 0.0);
}

#[test]
fn defensive_sector_is_rated_low_risk() {
    let mut bench = vec![100.0];
    let mut sector = vec![50.0];
    for i in 1..80 {
        let move_pct = if i % 2 == 0 { 0.01 } else { -0.008 };
        let prev_b = *bench.last().expect("nonempty");
        let prev_s = *sector.last().expect("nonempty");
        bench.push(prev_b * (1.0 + move_pct));
        sector.push(prev_s * (1.0 + 0.3 * move_pct));
    }

    let bars = bars_from_closes("XLU", &sector);
    let metrics =
        risk::compute_metrics(&bars, &bench, &RiskConfig::default()).expect("metrics compute");

    assert!(metrics.beta < 0.8, "beta was {}", metrics.beta);
    assert_eq!(metrics.rating, RiskRating::Low);
}

#[test]
fn range_and_volume_come_from_bars() {
    let closes = vec![100.0, 110.0, 95.0, 105.0];
    let bars = bars_from_closes("XLE", &closes);

    let metrics =
        risk::compute_metrics(&bars, &closes, &RiskConfig::default()).expect("metrics compute");

    // High/low derive from the bar highs/lows, not the closes
    assert!((metrics.high_52w - 110.0 * 1.01).abs() < 1e-9);
    assert!((metrics.low_52w - 95.0 * 0.99).abs() < 1e-9);
    assert!(metrics.avg_volume > 1_000_000.0);
    assert!(metrics.max_drawdown > 0.0);
}

#[test]
fn risk_free_rate_lowers_sharpe() {
    let moves = [0.004, -0.002, 0.003, 0.001, -0.001, 0.005];
    let returns: Vec<f64> = moves.iter().cycle().take(120).copied().collect();

    let without_rf = risk::sharpe_ratio(&returns, 0.0);
    let with_rf = risk::sharpe_ratio(&returns, 0.05);
    assert!(without_rf > 0.0);
    assert!(with_rf < without_rf);
}

#[test]
fn short_history_is_rejected() {
    let bars = bars_from_closes("XLF", &[100.0]);
    assert!(risk::compute_metrics(&bars, &[100.0], &RiskConfig::default()).is_err());
}
