//! Cross-sector return correlation

use serde::{Deserialize, Serialize};

/// Pearson correlation of two paired series, aligned on their common tail.
///
/// Degenerate (zero-variance) series correlate as 0.0 rather than NaN.
pub fn correlation(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }

    let a = &a[a.len() - n..];
    let b = &b[b.len() - n..];

    let mean_a = a.iter().sum::<f64>() / n as f64;
    let mean_b = b.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..n {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return 0.0;
    }

    (cov / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0)
}

/// Labeled symmetric correlation matrix over a set of return series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Build the matrix from `(label, returns)` pairs
    pub fn compute(series: &[(String, Vec<f64>)]) -> Self {
        let n = series.len();
        let mut values = vec![vec![0.0; n]; n];

        for i in 0..n {
            values[i][i] = 1.0;
            for j in (i + 1)..n {
                let c = correlation(&series[i].1, &series[j].1);
                values[i][j] = c;
                values[j][i] = c;
            }
        }

        Self {
            labels: series.iter().map(|(label, _)| label.clone()).collect(),
            values,
        }
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    /// Off-diagonal pair with the highest correlation
    pub fn most_correlated(&self) -> Option<(&str, &str, f64)> {
        self.extreme_pair(|best, candidate| candidate > best)
    }

    /// Off-diagonal pair with the lowest correlation
    pub fn least_correlated(&self) -> Option<(&str, &str, f64)> {
        self.extreme_pair(|best, candidate| candidate < best)
    }

    fn extreme_pair(&self, better: impl Fn(f64, f64) -> bool) -> Option<(&str, &str, f64)> {
        let n = self.labels.len();
        let mut result: Option<(usize, usize, f64)> = None;

        for i in 0..n {
            for j in (i + 1)..n {
                let value = self.values[i][j];
                match result {
                    Some((_, _, best)) if !better(best, value) => {}
                    _ => result = Some((i, j, value)),
                }
            }
        }

        result.map(|(i, j, value)| (self.labels[i].as_str(), self.labels[j].as_str(), value))
    }
}
