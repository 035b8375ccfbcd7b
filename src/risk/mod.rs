//! Risk metrics for sector ETFs
//!
//! Daily close series in, annualized statistics out. Beta is computed
//! against a benchmark return series (SPY by default) rather than taken
//! from a vendor field, so every number here is reproducible from the
//! stored bars.

pub mod correlation;

pub use correlation::CorrelationMatrix;

use serde::{Deserialize, Serialize};

use crate::data::market::Ohlcv;
use crate::data::{DataError, DataResult};

/// Trading days per year, used for annualization
pub const TRADING_DAYS: f64 = 252.0;

/// Thresholds and rates for risk assessment
#[derive(Debug, Clone)]
pub struct RiskConfig {
    /// Beta above which a sector is rated high risk
    pub high_beta_threshold: f64,

    /// Beta below which a sector is rated low risk
    pub low_beta_threshold: f64,

    /// Annual risk-free rate used in the Sharpe ratio
    pub risk_free_rate: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            high_beta_threshold: 1.2,
            low_beta_threshold: 0.8,
            risk_free_rate: 0.0,
        }
    }
}

/// Beta-based risk rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskRating {
    High,
    Moderate,
    Low,
}

impl RiskRating {
    pub fn from_beta(beta: f64, config: &RiskConfig) -> Self {
        if beta > config.high_beta_threshold {
            RiskRating::High
        } else if beta < config.low_beta_threshold {
            RiskRating::Low
        } else {
            RiskRating::Moderate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskRating::High => "High Risk",
            RiskRating::Moderate => "Moderate Risk",
            RiskRating::Low => "Low Risk",
        }
    }

    pub fn assessment(&self) -> &'static str {
        match self {
            RiskRating::High => "This sector shows high volatility compared to the market.",
            RiskRating::Moderate => "This sector's volatility is in line with the market.",
            RiskRating::Low => "This sector shows lower volatility compared to the market.",
        }
    }
}

/// VIX-based market volatility regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityRegime {
    Low,
    Normal,
    Elevated,
    High,
}

impl VolatilityRegime {
    pub fn from_vix(vix: f64) -> Self {
        if vix < 15.0 {
            VolatilityRegime::Low
        } else if vix < 25.0 {
            VolatilityRegime::Normal
        } else if vix < 35.0 {
            VolatilityRegime::Elevated
        } else {
            VolatilityRegime::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VolatilityRegime::Low => "low",
            VolatilityRegime::Normal => "normal",
            VolatilityRegime::Elevated => "elevated",
            VolatilityRegime::High => "high",
        }
    }

    pub fn interpretation(&self) -> &'static str {
        match self {
            VolatilityRegime::Low => "Low volatility - markets relatively calm",
            VolatilityRegime::Normal => "Normal volatility - typical market conditions",
            VolatilityRegime::Elevated => "Elevated volatility - increased uncertainty",
            VolatilityRegime::High => "High volatility - significant market stress",
        }
    }
}

/// Full metric set for one sector ETF
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorRiskMetrics {
    pub ticker: String,
    pub beta: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub high_52w: f64,
    pub low_52w: f64,
    pub avg_volume: f64,
    pub rating: RiskRating,
}

/// Daily simple returns from a close series
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator)
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Mean daily return scaled to a trading year
pub fn annualized_return(returns: &[f64]) -> f64 {
    mean(returns) * TRADING_DAYS
}

/// Sample volatility of daily returns scaled to a trading year
pub fn annualized_volatility(returns: &[f64]) -> f64 {
    std_dev(returns) * TRADING_DAYS.sqrt()
}

/// Annualized Sharpe ratio; 0.0 when volatility is degenerate
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    let sd = std_dev(returns);
    if sd == 0.0 {
        return 0.0;
    }
    let excess = mean(returns) - risk_free_rate / TRADING_DAYS;
    excess / sd * TRADING_DAYS.sqrt()
}

/// Beta of an asset versus a benchmark, from paired daily returns.
///
/// Series are aligned on their common tail. A zero-variance benchmark is
/// an error rather than a NaN.
pub fn beta(asset_returns: &[f64], benchmark_returns: &[f64]) -> DataResult<f64> {
    let n = asset_returns.len().min(benchmark_returns.len());
    if n < 2 {
        return Err(DataError::validation_error(
            "returns",
            "Need at least 2 paired returns to compute beta",
        ));
    }

    let asset = &asset_returns[asset_returns.len() - n..];
    let bench = &benchmark_returns[benchmark_returns.len() - n..];

    let asset_mean = mean(asset);
    let bench_mean = mean(bench);

    let mut covariance = 0.0;
    let mut bench_variance = 0.0;
    for i in 0..n {
        covariance += (asset[i] - asset_mean) * (bench[i] - bench_mean);
        bench_variance += (bench[i] - bench_mean).powi(2);
    }

    if bench_variance == 0.0 {
        return Err(DataError::validation_error(
            "benchmark",
            "Benchmark returns have zero variance",
        ));
    }

    Ok(covariance / bench_variance)
}

/// Maximum peak-to-trough drawdown over a close series, as a fraction
pub fn max_drawdown(closes: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0f64;

    for &close in closes {
        if close > peak {
            peak = close;
        } else if peak > 0.0 {
            let drawdown = (peak - close) / peak;
            worst = worst.max(drawdown);
        }
    }

    worst
}

/// Simple moving average over the trailing `period` values
pub fn sma(values: &[f64], period: usize) -> f64 {
    if values.is_empty() || period == 0 {
        return 0.0;
    }
    if values.len() < period {
        return mean(values);
    }
    mean(&values[values.len() - period..])
}

/// Exponential moving average seeded with the SMA of the first `period`
pub fn ema(values: &[f64], period: usize) -> f64 {
    if values.is_empty() || period == 0 {
        return 0.0;
    }
    if values.len() < period {
        return mean(values);
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut ema = mean(&values[..period]);
    for &value in &values[period..] {
        ema = (value - ema) * multiplier + ema;
    }
    ema
}

/// Compute the full metric set for a sector ETF against a benchmark
pub fn compute_metrics(
    bars: &[Ohlcv],
    benchmark_closes: &[f64],
    config: &RiskConfig,
) -> DataResult<SectorRiskMetrics> {
    if bars.len() < 2 {
        return Err(DataError::NoData {
            ticker: bars.first().map(|b| b.ticker.clone()).unwrap_or_default(),
            start: "history".to_string(),
            end: "history".to_string(),
        });
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let returns = daily_returns(&closes);
    let benchmark_returns = daily_returns(benchmark_closes);

    let beta = beta(&returns, &benchmark_returns)?;

    let high_52w = bars.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let low_52w = bars.iter().map(|b| b.low).fold(f64::MAX, f64::min);
    let avg_volume = bars.iter().map(|b| b.volume as f64).sum::<f64>() / bars.len() as f64;

    Ok(SectorRiskMetrics {
        ticker: bars[0].ticker.clone(),
        beta,
        annualized_return: annualized_return(&returns),
        annualized_volatility: annualized_volatility(&returns),
        sharpe_ratio: sharpe_ratio(&returns, config.risk_free_rate),
        max_drawdown: max_drawdown(&closes),
        high_52w,
        low_52w,
        avg_volume,
        rating: RiskRating::from_beta(beta, config),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_returns() {
        let returns = daily_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.10).abs() < 1e-9);
        assert!((returns[1] + 0.10).abs() < 1e-9);
    }

    #[test]
    fn test_volatility_is_nonnegative_and_zero_for_constant() {
        let flat = daily_returns(&[100.0, 100.0, 100.0, 100.0]);
        assert_eq!(annualized_volatility(&flat), 0.0);

        let moving = daily_returns(&[100.0, 103.0, 98.0, 105.0]);
        assert!(annualized_volatility(&moving) > 0.0);
    }

    #[test]
    fn test_sharpe_sign_follows_mean_return() {
        let up = daily_returns(&[100.0, 101.0, 102.5, 103.0]);
        assert!(sharpe_ratio(&up, 0.0) > 0.0);

        let down = daily_returns(&[103.0, 102.5, 101.0, 100.0]);
        assert!(sharpe_ratio(&down, 0.0) < 0.0);
    }

    #[test]
    fn test_sharpe_degenerate_volatility() {
        let flat = daily_returns(&[100.0, 100.0, 100.0]);
        assert_eq!(sharpe_ratio(&flat, 0.05), 0.0);
    }

    #[test]
    fn test_beta_against_self_is_one() {
        let returns = daily_returns(&[100.0, 102.0, 99.0, 104.0, 101.0]);
        let b = beta(&returns, &returns).expect("beta");
        assert!((b - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_beta_scales_with_amplification() {
        // Asset moves exactly twice the benchmark every day
        let bench = vec![0.01, -0.02, 0.015, 0.005, -0.01];
        let asset: Vec<f64> = bench.iter().map(|r| r * 2.0).collect();
        let b = beta(&asset, &bench).expect("beta");
        assert!((b - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_beta_zero_variance_benchmark_is_error() {
        let asset = vec![0.01, -0.02, 0.015];
        let bench = vec![0.0, 0.0, 0.0];
        assert!(beta(&asset, &bench).is_err());
    }

    #[test]
    fn test_beta_aligns_on_common_tail() {
        let bench = vec![0.5, 0.01, -0.02, 0.015];
        let asset = vec![0.01, -0.02, 0.015];
        // The benchmark's extra leading value must be ignored
        let b = beta(&asset, &bench[1..].to_vec()).expect("beta short");
        let b_full = beta(&asset, &bench).expect("beta full");
        assert!((b - b_full).abs() < 1e-9);
    }

    #[test]
    fn test_max_drawdown() {
        // Peak 120 -> trough 90 is a 25% drawdown
        let closes = vec![100.0, 120.0, 110.0, 90.0, 115.0];
        assert!((max_drawdown(&closes) - 0.25).abs() < 1e-9);

        let rising = vec![100.0, 101.0, 102.0];
        assert_eq!(max_drawdown(&rising), 0.0);
    }

    #[test]
    fn test_sma() {
        let values = vec![10.0, 11.0, 12.0, 13.0, 14.0];
        assert!((sma(&values, 3) - 13.0).abs() < 1e-9);
        // Shorter than period falls back to full mean
        assert!((sma(&values[..2], 3) - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_ema_tracks_recent_values() {
        let values = vec![10.0, 10.0, 10.0, 20.0, 20.0, 20.0];
        let e = ema(&values, 3);
        assert!(e > sma(&values, 6));
        assert!(e <= 20.0);
    }

    #[test]
    fn test_rating_thresholds() {
        let config = RiskConfig::default();
        assert_eq!(RiskRating::from_beta(1.3, &config), RiskRating::High);
        assert_eq!(RiskRating::from_beta(1.0, &config), RiskRating::Moderate);
        assert_eq!(RiskRating::from_beta(0.7, &config), RiskRating::Low);
        // Boundary values are moderate
        assert_eq!(RiskRating::from_beta(1.2, &config), RiskRating::Moderate);
        assert_eq!(RiskRating::from_beta(0.8, &config), RiskRating::Moderate);
    }

    #[test]
    fn test_volatility_regime_bands() {
        assert_eq!(VolatilityRegime::from_vix(12.0), VolatilityRegime::Low);
        assert_eq!(VolatilityRegime::from_vix(18.0), VolatilityRegime::Normal);
        assert_eq!(VolatilityRegime::from_vix(30.0), VolatilityRegime::Elevated);
        assert_eq!(VolatilityRegime::from_vix(50.0), VolatilityRegime::High);
    }

    #[test]
    fn test_compute_metrics_rejects_short_history() {
        let config = RiskConfig::default();
        assert!(compute_metrics(&[], &[], &config).is_err());
    }
}
