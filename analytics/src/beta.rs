//! Market beta estimation
//!
//! Beta = Cov(asset, benchmark) / Var(benchmark), using (n-1) sample
//! statistics over the same aligned observations.

use crate::error::{AnalyticsError, Result};
use crate::returns::ReturnMatrix;
use crate::stats::{sample_covariance, sample_variance};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Beta of one asset against the benchmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetaEntry {
    pub symbol: String,
    pub beta: f64,
}

/// Betas for a basket, ordered by descending beta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetaRanking {
    /// Benchmark symbol the betas are measured against
    pub benchmark: String,

    /// Entries sorted from highest to lowest beta
    pub entries: Vec<BetaEntry>,
}

impl BetaRanking {
    /// Asset with the highest beta
    ///
    /// Ties keep the order in which symbols were requested.
    pub fn highest(&self) -> Option<&BetaEntry> {
        self.entries.first()
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.symbol == symbol)
            .map(|e| e.beta)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compute the beta of `stock_returns` against `market_returns`
///
/// Degenerate inputs saturate to 0.0 instead of failing: fewer than two
/// aligned observations, or a benchmark with exactly zero variance.
///
/// # Example
///
/// ```
/// use ag_analytics::beta;
///
/// let market = [0.01, -0.02, 0.015, 0.005];
/// let levered: Vec<f64> = market.iter().map(|r| 2.0 * r).collect();
///
/// assert!((beta(&levered, &market) - 2.0).abs() < 1e-12);
/// assert_eq!(beta(&market, &market), 1.0);
/// assert_eq!(beta(&[0.01], &[0.02]), 0.0);
/// ```
pub fn beta(stock_returns: &[f64], market_returns: &[f64]) -> f64 {
    if stock_returns.len().min(market_returns.len()) < 2 {
        return 0.0;
    }

    let variance = sample_variance(market_returns);
    if variance == 0.0 {
        return 0.0;
    }

    sample_covariance(stock_returns, market_returns) / variance
}

/// Batch beta estimator over a shared benchmark
#[derive(Debug, Clone)]
pub struct BetaEstimator {
    benchmark: String,
}

impl BetaEstimator {
    pub fn new(benchmark: impl Into<String>) -> Self {
        Self {
            benchmark: benchmark.into(),
        }
    }

    pub fn benchmark(&self) -> &str {
        &self.benchmark
    }

    /// Rank the requested symbols by beta against the benchmark
    ///
    /// The benchmark itself is never ranked, and symbols that are missing
    /// from the matrix are skipped with a warning. Fails only if the
    /// benchmark column is absent.
    pub fn rank<S: AsRef<str>>(&self, returns: &ReturnMatrix, symbols: &[S]) -> Result<BetaRanking> {
        let market = returns
            .series(&self.benchmark)
            .map_err(|_| AnalyticsError::UnknownSymbol(self.benchmark.clone()))?;

        let mut entries = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let symbol = symbol.as_ref();
            if symbol == self.benchmark {
                continue;
            }

            let Ok(stock) = returns.series(symbol) else {
                warn!(symbol, "No aligned returns for symbol, skipping beta");
                continue;
            };

            let value = beta(stock, market);
            debug!(symbol, beta = value, benchmark = %self.benchmark, "Computed beta");
            entries.push(BetaEntry {
                symbol: symbol.to_string(),
                beta: value,
            });
        }

        // Stable sort: equal betas stay in request order
        entries.sort_by(|a, b| b.beta.partial_cmp(&a.beta).unwrap_or(Ordering::Equal));

        Ok(BetaRanking {
            benchmark: self.benchmark.clone(),
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn matrix(columns: Vec<(&str, Vec<f64>)>) -> ReturnMatrix {
        let len = columns[0].1.len();
        let dates = (0..len)
            .map(|i| NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64))
            .collect();
        ReturnMatrix::from_columns(
            dates,
            columns.into_iter().map(|(s, c)| (s.to_string(), c)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_beta_against_itself_is_one() {
        let market = [0.012, -0.007, 0.003, 0.021, -0.015, 0.008];
        assert_eq!(beta(&market, &market), 1.0);
    }

    #[test]
    fn test_beta_flat_benchmark_is_zero() {
        let stock = [0.01, 0.02, -0.03];
        let flat = [0.001, 0.001, 0.001];
        assert_eq!(beta(&stock, &flat), 0.0);
    }

    #[test]
    fn test_beta_too_few_observations() {
        assert_eq!(beta(&[], &[]), 0.0);
        assert_eq!(beta(&[0.05], &[0.01]), 0.0);
    }

    #[test]
    fn test_beta_inverse_asset() {
        let market = [0.01, -0.02, 0.015, 0.005];
        let hedge: Vec<f64> = market.iter().map(|r| -0.5 * r).collect();
        assert!((beta(&hedge, &market) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_rank_orders_descending_and_skips_benchmark() {
        let market = vec![0.01, -0.02, 0.015, 0.005];
        let returns = matrix(vec![
            ("SPY", market.clone()),
            ("LOW", market.iter().map(|r| 0.5 * r).collect()),
            ("HIGH", market.iter().map(|r| 2.0 * r).collect()),
        ]);

        let ranking = BetaEstimator::new("SPY")
            .rank(&returns, &["LOW", "SPY", "HIGH", "MISSING"])
            .unwrap();

        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking.highest().unwrap().symbol, "HIGH");
        assert!((ranking.get("LOW").unwrap() - 0.5).abs() < 1e-12);
        assert!(ranking.get("SPY").is_none());
    }

    #[test]
    fn test_rank_ties_keep_request_order() {
        let market = vec![0.01, -0.02, 0.015, 0.005];
        let returns = matrix(vec![
            ("SPY", market.clone()),
            ("A", market.clone()),
            ("B", market.clone()),
        ]);

        let ranking = BetaEstimator::new("SPY").rank(&returns, &["B", "A"]).unwrap();
        assert_eq!(ranking.entries[0].symbol, "B");
        assert_eq!(ranking.entries[1].symbol, "A");
    }

    #[test]
    fn test_rank_requires_benchmark() {
        let returns = matrix(vec![("A", vec![0.01, 0.02])]);
        let err = BetaEstimator::new("SPY").rank(&returns, &["A"]).unwrap_err();
        assert!(matches!(err, AnalyticsError::UnknownSymbol(s) if s == "SPY"));
    }

    #[test]
    fn test_estimator_is_debuggable() {
        let estimator = BetaEstimator::new("SPY");
        assert!(format!("{estimator:?}").contains("SPY"));
        assert_eq!(estimator.clone().benchmark(), "SPY");
    }
}
