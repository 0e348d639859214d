//! Health-check engine
//!
//! Runs the full analysis for one configuration over an in-memory price
//! table: lookback window, aligned returns, beta ranking, correlation
//! diagnosis and the Monte Carlo allocation search.

use crate::beta::{BetaEstimator, BetaRanking};
use crate::config::AnalysisConfig;
use crate::correlation::{CorrelationAnalyzer, CorrelationReport};
use crate::error::{AnalyticsError, Result};
use crate::frontier::{PortfolioSimulator, SimulationResult};
use crate::prices::PriceTable;
use crate::returns::ReturnMatrix;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

/// Output of one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub as_of: NaiveDate,
    pub window_start: NaiveDate,

    /// Aligned return observations used by every stage
    pub observations: usize,

    /// Requested symbols that had price history
    pub symbols: Vec<String>,

    /// Requested symbols with no price history, only non-empty when
    /// `allow_unresolved` is set
    pub unresolved: Vec<String>,

    /// Beta ranking, absent when the benchmark has no prices
    pub betas: Option<BetaRanking>,

    pub correlation: CorrelationReport,

    /// Best-Sharpe allocation, absent when fewer than two symbols resolve
    pub optimization: Option<SimulationResult>,
}

/// Portfolio health-check engine
#[derive(Debug)]
pub struct HealthCheckEngine {
    config: AnalysisConfig,
}

impl HealthCheckEngine {
    /// Create an engine from a validated configuration
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Load the configuration from YAML
    ///
    /// # Example
    ///
    /// ```
    /// use ag_analytics::HealthCheckEngine;
    ///
    /// let engine = HealthCheckEngine::from_yaml("symbols: [AAPL, MSFT]").unwrap();
    /// assert_eq!(engine.config().benchmark, "SPY");
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::new(AnalysisConfig::from_yaml(yaml)?)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze the lookback window ending at `as_of`
    ///
    /// Fails with [`AnalyticsError::InsufficientData`] when a requested
    /// symbol has no prices (unless `allow_unresolved` is set), when none
    /// resolve, or when the window yields no aligned return rows. A window
    /// with a single return row still produces a report: its covariance is
    /// zero, so every simulated sample scores a Sharpe ratio of -inf.
    pub fn run(&self, prices: &PriceTable, as_of: NaiveDate) -> Result<HealthReport> {
        let benchmark = self.config.normalized_benchmark();
        let window_start = self.config.window_start(as_of);

        let (symbols, unresolved): (Vec<String>, Vec<String>) = self
            .config
            .normalized_symbols()
            .into_iter()
            .partition(|s| prices.contains(s));

        if !unresolved.is_empty() && !self.config.allow_unresolved {
            return Err(AnalyticsError::InsufficientData(format!(
                "No price history for requested symbols: {}",
                unresolved.join(", ")
            )));
        }

        for symbol in &unresolved {
            warn!(symbol = %symbol, "No price history for symbol, excluding it");
        }

        if symbols.is_empty() {
            return Err(AnalyticsError::InsufficientData(format!(
                "None of the requested symbols have price history: {}",
                unresolved.join(", ")
            )));
        }

        let has_benchmark = prices.contains(&benchmark);
        let mut fetch = symbols.clone();
        if has_benchmark && !fetch.contains(&benchmark) {
            fetch.push(benchmark.clone());
        }

        let window = prices.select(&fetch)?.since(window_start);
        let returns = ReturnMatrix::from_prices(&window)?;

        info!(
            symbols = symbols.len(),
            observations = returns.len(),
            %window_start,
            %as_of,
            "Aligned returns for analysis window"
        );

        let betas = if has_benchmark {
            let ranking = BetaEstimator::new(benchmark.as_str()).rank(&returns, &symbols)?;
            if let Some(top) = ranking.highest() {
                info!(symbol = %top.symbol, beta = top.beta, "Highest beta asset");
            }
            Some(ranking)
        } else {
            warn!(benchmark = %benchmark, "Benchmark has no price history, skipping beta analysis");
            None
        };

        let correlation = CorrelationAnalyzer::new().correlate(&returns, &symbols)?;
        info!(
            average_correlation = correlation.average_correlation,
            tier = correlation.tier.label(),
            "Correlation diagnosis"
        );

        let optimization = if symbols.len() >= 2 {
            let universe = returns.select(&symbols)?;
            let result = PortfolioSimulator::new(self.config.simulation.clone()).simulate(&universe)?;
            let best = result.best();
            info!(
                sharpe = best.sharpe_ratio,
                expected_return = best.expected_return,
                volatility = best.volatility,
                "Best simulated allocation"
            );
            Some(result)
        } else {
            warn!("Fewer than two symbols resolved, skipping allocation search");
            None
        };

        Ok(HealthReport {
            as_of,
            window_start,
            observations: returns.len(),
            symbols,
            unresolved,
            betas,
            correlation,
            optimization,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontier::SimulationConfig;
    use crate::prices::PriceSeries;

    fn day(offset: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(offset)
    }

    fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
        PriceSeries::from_pairs(
            symbol,
            closes.iter().enumerate().map(|(i, c)| (day(i as u64), *c)),
        )
        .unwrap()
    }

    fn engine(symbols: &[&str]) -> HealthCheckEngine {
        HealthCheckEngine::new(AnalysisConfig {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            lookback_days: 365,
            simulation: SimulationConfig {
                num_portfolios: 200,
                random_seed: Some(1),
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap()
    }

    fn table() -> PriceTable {
        PriceTable::from_series(vec![
            series("SPY", &[100.0, 101.0, 99.5, 102.0, 103.0, 101.5]),
            series("AAA", &[50.0, 51.0, 49.0, 52.0, 53.5, 52.0]),
            series("BBB", &[20.0, 19.8, 20.3, 19.9, 19.7, 20.1]),
        ])
        .unwrap()
    }

    #[test]
    fn test_full_run() {
        let report = engine(&["aaa", "bbb"]).run(&table(), day(5)).unwrap();

        assert_eq!(report.observations, 5);
        assert_eq!(report.symbols, vec!["AAA", "BBB"]);
        assert!(report.unresolved.is_empty());
        assert_eq!(report.betas.as_ref().unwrap().len(), 2);
        assert_eq!(report.correlation.matrix.len(), 2);
        assert!(report.optimization.is_some());
    }

    #[test]
    fn test_unresolved_symbol_fails_run() {
        let err = engine(&["AAA", "BBB", "TYPO"]).run(&table(), day(5)).unwrap_err();

        match err {
            AnalyticsError::InsufficientData(message) => assert!(message.contains("TYPO")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unresolved_symbols_are_reported_when_allowed() {
        let mut config = engine(&["AAA", "NOPE"]).config().clone();
        config.allow_unresolved = true;
        let report = HealthCheckEngine::new(config).unwrap().run(&table(), day(5)).unwrap();

        assert_eq!(report.unresolved, vec!["NOPE"]);
        assert_eq!(report.symbols, vec!["AAA"]);
        assert_eq!(report.correlation.average_correlation, 1.0);
        assert!(report.optimization.is_none());
    }

    #[test]
    fn test_missing_benchmark_skips_beta() {
        let prices = PriceTable::from_series(vec![
            series("AAA", &[50.0, 51.0, 49.0]),
            series("BBB", &[20.0, 19.8, 20.3]),
        ])
        .unwrap();

        let report = engine(&["AAA", "BBB"]).run(&prices, day(2)).unwrap();
        assert!(report.betas.is_none());
    }

    #[test]
    fn test_nothing_resolved_is_insufficient() {
        let mut config = engine(&["X", "Y"]).config().clone();
        config.allow_unresolved = true;
        let err = HealthCheckEngine::new(config).unwrap().run(&table(), day(5)).unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData(_)));
    }

    #[test]
    fn test_single_return_row_still_reports() {
        let mut config = engine(&["AAA", "BBB"]).config().clone();
        config.lookback_days = 1;
        let engine = HealthCheckEngine::new(config).unwrap();

        // Window keeps the last two price rows: one return
        let report = engine.run(&table(), day(5)).unwrap();

        assert_eq!(report.observations, 1);
        assert!(report.betas.as_ref().unwrap().entries.iter().all(|e| e.beta == 0.0));
        assert_eq!(report.correlation.average_correlation, 0.0);

        let optimization = report.optimization.unwrap();
        assert_eq!(optimization.best_index(), 0);
        assert_eq!(optimization.best().sharpe_ratio, f64::NEG_INFINITY);
    }

    #[test]
    fn test_window_too_short_is_insufficient() {
        let engine = HealthCheckEngine::new(AnalysisConfig {
            symbols: vec!["AAA".to_string()],
            lookback_days: 1,
            ..Default::default()
        })
        .unwrap();

        // Window keeps only the last price row: no returns
        let err = engine.run(&table(), day(6)).unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData(_)));
    }
}
