//! Analysis configuration
//!
//! Everything a run needs (symbols, benchmark, lookback window, simulation
//! settings) travels in one [`AnalysisConfig`] value, loaded from YAML or
//! JSON.

use crate::error::{AnalyticsError, Result};
use crate::frontier::SimulationConfig;
use crate::prices::normalize_symbol;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default basket: large-cap tech plus a defense name, treasuries and gold
pub const DEFAULT_SYMBOLS: &[&str] = &[
    "NVDA", "TSLA", "AVGO", "MSFT", "GOOG", "AMZN", "LMT", "TLT", "GLD",
];

/// Default benchmark (S&P 500 proxy)
pub const DEFAULT_BENCHMARK: &str = "SPY";

/// Complete analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// User-selected symbols
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Benchmark for beta, always fetched but only correlated if also selected
    #[serde(default = "default_benchmark")]
    pub benchmark: String,

    /// Lookback window in calendar days
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Drop symbols without price history instead of failing the run
    #[serde(default)]
    pub allow_unresolved: bool,

    /// Monte Carlo settings
    #[serde(default)]
    pub simulation: SimulationConfig,
}

fn default_symbols() -> Vec<String> {
    DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
}

fn default_benchmark() -> String {
    DEFAULT_BENCHMARK.to_string()
}

fn default_lookback_days() -> u32 {
    365
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            benchmark: default_benchmark(),
            lookback_days: default_lookback_days(),
            allow_unresolved: false,
            simulation: SimulationConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a configuration from YAML
    ///
    /// # Example
    ///
    /// ```
    /// use ag_analytics::AnalysisConfig;
    ///
    /// let yaml = r#"
    /// symbols: [nvda, msft, tlt]
    /// lookback_days: 180
    /// simulation:
    ///   num_portfolios: 2000
    ///   random_seed: 42
    /// "#;
    ///
    /// let config = AnalysisConfig::from_yaml(yaml).unwrap();
    /// assert_eq!(config.benchmark, "SPY");
    /// assert_eq!(config.normalized_symbols(), vec!["NVDA", "MSFT", "TLT"]);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, choosing the parser by extension
    ///
    /// `.json` files are parsed as JSON, everything else as YAML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&contents),
            _ => Self::from_yaml(&contents),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.normalized_symbols().is_empty() {
            return Err(AnalyticsError::InvalidParameter(
                "At least one symbol is required".to_string(),
            ));
        }

        if normalize_symbol(&self.benchmark).is_empty() {
            return Err(AnalyticsError::InvalidParameter(
                "Benchmark symbol must not be empty".to_string(),
            ));
        }

        if self.lookback_days == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "Lookback window must be at least one day".to_string(),
            ));
        }

        if self.simulation.num_portfolios == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "Number of portfolios must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Upper-cased symbols with blanks and duplicates removed, in input order
    pub fn normalized_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = Vec::with_capacity(self.symbols.len());
        for symbol in self.symbols.iter().map(|s| normalize_symbol(s)) {
            if !symbol.is_empty() && !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }
        symbols
    }

    pub fn normalized_benchmark(&self) -> String {
        normalize_symbol(&self.benchmark)
    }

    /// Symbols that must be fetched: the selection plus the benchmark
    pub fn fetch_symbols(&self) -> Vec<String> {
        let mut symbols = self.normalized_symbols();
        let benchmark = self.normalized_benchmark();
        if !symbols.contains(&benchmark) {
            symbols.push(benchmark);
        }
        symbols
    }

    /// First date of the lookback window ending at `as_of`
    pub fn window_start(&self, as_of: NaiveDate) -> NaiveDate {
        as_of
            .checked_sub_days(Days::new(self.lookback_days as u64))
            .unwrap_or(NaiveDate::MIN)
    }
}
