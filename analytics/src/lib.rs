//! # ag-analytics: Portfolio Health-Check Analytics
//!
//! This library quantifies co-movement risk in a basket of assets from
//! their closing-price histories.
//!
//! ## Core Components
//!
//! - **ReturnMatrix**: Aligned periodic returns built from a [`PriceTable`]
//! - **BetaEstimator**: Sensitivity of each asset to a benchmark
//! - **CorrelationAnalyzer**: Pearson matrix, average co-movement and risk tier
//! - **PortfolioSimulator**: Monte Carlo search for the best-Sharpe allocation
//! - **HealthCheckEngine**: Runs all of the above for one [`AnalysisConfig`]
//!
//! ## Example Usage
//!
//! ```rust
//! use ag_analytics::{CorrelationAnalyzer, PriceSeries, PriceTable, ReturnMatrix, RiskTier};
//! use chrono::NaiveDate;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
//! let closes = [100.0, 102.0, 101.0, 104.0];
//!
//! let a = PriceSeries::from_pairs("A", (1..=4).zip(closes).map(|(d, c)| (day(d), c))).unwrap();
//! let b = PriceSeries::from_pairs("B", (1..=4).zip(closes).map(|(d, c)| (day(d), c * 2.0))).unwrap();
//!
//! let prices = PriceTable::from_series(vec![a, b]).unwrap();
//! let returns = ReturnMatrix::from_prices(&prices).unwrap();
//!
//! let report = CorrelationAnalyzer::new().correlate(&returns, &["A", "B"]).unwrap();
//! assert_eq!(report.tier, RiskTier::Concentrated); // identical returns
//! ```

mod beta;
mod config;
mod correlation;
mod engine;
mod error;
mod frontier;
mod prices;
mod returns;
pub mod stats;

pub use beta::{beta, BetaEntry, BetaEstimator, BetaRanking};
pub use config::{AnalysisConfig, DEFAULT_BENCHMARK, DEFAULT_SYMBOLS};
pub use correlation::{
    CorrelationAnalyzer, CorrelationMatrix, CorrelationReport, RiskTier,
    HIGH_CORRELATION_THRESHOLD, MODERATE_CORRELATION_THRESHOLD,
};
pub use engine::{HealthCheckEngine, HealthReport};
pub use error::{AnalyticsError, Result};
pub use frontier::{
    sharpe_ratio, AllocationEntry, AssetStatistics, FrontierPoint, FrontierSummary,
    PortfolioSimulator, SimulationConfig, SimulationResult, SimulationSample, WeightSampler,
    TRADING_DAYS_PER_YEAR,
};
pub use prices::{normalize_symbol, PriceObservation, PriceSeries, PriceTable};
pub use returns::ReturnMatrix;
