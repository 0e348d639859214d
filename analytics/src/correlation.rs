//! Correlation analysis
//!
//! Provides:
//! - Pearson correlation matrix over a caller-chosen basket
//! - Average pairwise (off-diagonal) correlation
//! - Three-tier concentration risk classification

use crate::error::{AnalyticsError, Result};
use crate::returns::ReturnMatrix;
use crate::stats::pearson;
use nalgebra::DMatrix;
use serde::{Serialize, Serializer};
use tracing::debug;

/// Average correlation above which a basket is considered concentrated
pub const HIGH_CORRELATION_THRESHOLD: f64 = 0.6;

/// Average correlation above which a basket carries moderate risk
pub const MODERATE_CORRELATION_THRESHOLD: f64 = 0.3;

/// Co-movement risk classification of a basket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    /// Holdings move together; diversification is largely illusory
    Concentrated,

    /// Noticeable co-movement
    Moderate,

    /// Holdings move largely independently
    Diversified,
}

impl RiskTier {
    /// Classify an average pairwise correlation
    ///
    /// `avg > 0.6` is concentrated, `0.3 < avg <= 0.6` moderate, anything
    /// else diversified.
    pub fn classify(average_correlation: f64) -> Self {
        if average_correlation > HIGH_CORRELATION_THRESHOLD {
            RiskTier::Concentrated
        } else if average_correlation > MODERATE_CORRELATION_THRESHOLD {
            RiskTier::Moderate
        } else {
            RiskTier::Diversified
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Concentrated => "high risk",
            RiskTier::Moderate => "moderate risk",
            RiskTier::Diversified => "healthy",
        }
    }
}

/// Symmetric correlation matrix indexed by symbol
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    symbols: Vec<String>,

    #[serde(serialize_with = "serialize_rows")]
    values: DMatrix<f64>,
}

impl CorrelationMatrix {
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Correlation between two symbols, if both are in the matrix
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        Some(self.values[(i, j)])
    }

    /// Mean of the off-diagonal entries
    ///
    /// `(sum(M) - N) / (N * (N - 1))`; a single asset (or none) is reported
    /// as 1.0.
    pub fn average_pairwise(&self) -> f64 {
        let n = self.len();
        if n <= 1 {
            return 1.0;
        }

        (self.values.sum() - n as f64) / (n * (n - 1)) as f64
    }
}

/// Result of a correlation analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationReport {
    pub matrix: CorrelationMatrix,
    pub average_correlation: f64,
    pub tier: RiskTier,
}

/// Correlation analyzer over a restricted basket
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationAnalyzer;

impl CorrelationAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Correlation matrix of exactly the requested symbols
    ///
    /// Columns of `returns` that were not requested (e.g. a benchmark fetched
    /// only for beta) do not participate.
    pub fn correlation_matrix<S: AsRef<str>>(
        &self,
        returns: &ReturnMatrix,
        symbols: &[S],
    ) -> Result<CorrelationMatrix> {
        if symbols.is_empty() {
            return Err(AnalyticsError::InsufficientData(
                "No symbols requested for correlation".to_string(),
            ));
        }

        let basket = returns.select(symbols)?;
        let columns = basket.columns();
        let n = columns.len();

        let mut values = DMatrix::identity(n, n);
        for i in 0..n {
            for j in (i + 1)..n {
                let rho = pearson(&columns[i], &columns[j]);
                values[(i, j)] = rho;
                values[(j, i)] = rho;
            }
        }

        Ok(CorrelationMatrix {
            symbols: basket.symbols().to_vec(),
            values,
        })
    }

    /// Correlation matrix plus average co-movement and its risk tier
    pub fn correlate<S: AsRef<str>>(
        &self,
        returns: &ReturnMatrix,
        symbols: &[S],
    ) -> Result<CorrelationReport> {
        let matrix = self.correlation_matrix(returns, symbols)?;
        let average_correlation = matrix.average_pairwise();
        let tier = RiskTier::classify(average_correlation);

        debug!(
            assets = matrix.len(),
            average_correlation,
            tier = tier.label(),
            "Computed correlation matrix"
        );

        Ok(CorrelationReport {
            matrix,
            average_correlation,
            tier,
        })
    }
}

fn serialize_rows<S: Serializer>(values: &DMatrix<f64>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let rows: Vec<Vec<f64>> = values
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect();
    rows.serialize(serializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn matrix(columns: Vec<(&str, Vec<f64>)>) -> ReturnMatrix {
        let len = columns[0].1.len();
        let dates = (0..len)
            .map(|i| NaiveDate::from_ymd_opt(2024, 2, 1).unwrap() + chrono::Days::new(i as u64))
            .collect();
        ReturnMatrix::from_columns(
            dates,
            columns.into_iter().map(|(s, c)| (s.to_string(), c)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(RiskTier::classify(0.61), RiskTier::Concentrated);
        assert_eq!(RiskTier::classify(0.6), RiskTier::Moderate);
        assert_eq!(RiskTier::classify(0.31), RiskTier::Moderate);
        assert_eq!(RiskTier::classify(0.3), RiskTier::Diversified);
        assert_eq!(RiskTier::classify(-0.4), RiskTier::Diversified);
    }

    #[test]
    fn test_single_asset_average_is_one() {
        let returns = matrix(vec![("A", vec![0.01, 0.02, -0.01])]);
        let report = CorrelationAnalyzer::new().correlate(&returns, &["A"]).unwrap();

        assert_eq!(report.matrix.len(), 1);
        assert_eq!(report.average_correlation, 1.0);
        assert_eq!(report.tier, RiskTier::Concentrated);
    }

    #[test]
    fn test_identical_assets_are_concentrated() {
        let a = vec![0.01, 0.02, -0.01, 0.03, -0.02];
        let returns = matrix(vec![("A", a.clone()), ("B", a)]);

        let report = CorrelationAnalyzer::new().correlate(&returns, &["A", "B"]).unwrap();

        assert!((report.matrix.get("A", "B").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(report.tier, RiskTier::Concentrated);
    }

    #[test]
    fn test_inverse_asset_lowers_average() {
        let a = vec![0.01, 0.02, -0.01, 0.03, -0.02];
        let c: Vec<f64> = a.iter().map(|r| -r).collect();
        let returns = matrix(vec![("A", a.clone()), ("B", a), ("C", c)]);

        let report = CorrelationAnalyzer::new()
            .correlate(&returns, &["A", "B", "C"])
            .unwrap();

        assert!((report.matrix.get("A", "B").unwrap() - 1.0).abs() < 1e-12);
        assert!((report.matrix.get("A", "C").unwrap() + 1.0).abs() < 1e-12);
        // (1 - 1 - 1) * 2 / 6
        assert!((report.average_correlation + 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(report.tier, RiskTier::Diversified);
    }

    #[test]
    fn test_benchmark_excluded_unless_requested() {
        let a = vec![0.01, 0.02, -0.01, 0.03];
        let b = vec![0.02, 0.01, -0.02, 0.02];
        let spy = vec![0.015, 0.012, -0.011, 0.02];
        let returns = matrix(vec![("A", a), ("B", b), ("SPY", spy)]);

        let report = CorrelationAnalyzer::new().correlate(&returns, &["A", "B"]).unwrap();

        assert_eq!(report.matrix.symbols(), &["A".to_string(), "B".to_string()]);
        assert!(report.matrix.get("SPY", "A").is_none());
    }

    #[test]
    fn test_matrix_symmetric_with_unit_diagonal() {
        let returns = matrix(vec![
            ("A", vec![0.01, 0.02, -0.01, 0.03, -0.02]),
            ("B", vec![0.02, 0.01, -0.02, 0.02, -0.01]),
            ("C", vec![-0.01, 0.00, 0.02, -0.01, 0.01]),
        ]);

        let matrix = CorrelationAnalyzer::new()
            .correlation_matrix(&returns, &["A", "B", "C"])
            .unwrap();
        let values = matrix.values();

        for i in 0..3 {
            assert_eq!(values[(i, i)], 1.0);
            for j in 0..3 {
                assert_eq!(values[(i, j)], values[(j, i)]);
                assert!(values[(i, j)] >= -1.0 && values[(i, j)] <= 1.0);
            }
        }
    }

    #[test]
    fn test_unknown_symbol_fails() {
        let returns = matrix(vec![("A", vec![0.01, 0.02])]);
        assert!(CorrelationAnalyzer::new().correlate(&returns, &["A", "Z"]).is_err());
        assert!(CorrelationAnalyzer::new().correlate::<&str>(&returns, &[]).is_err());
    }
}
