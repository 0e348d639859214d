//! Monte Carlo efficient-frontier search
//!
//! Draws random long-only weight vectors over a fixed asset universe, scores
//! each by annualized return, volatility and Sharpe ratio (zero risk-free
//! rate), and keeps the arg-max-Sharpe sample as the recommended allocation.
//!
//! Samples are stored arena-style: one flat weight buffer plus parallel
//! return / volatility / Sharpe vectors, so no trial allocates.

use crate::error::{AnalyticsError, Result};
use crate::returns::ReturnMatrix;
use crate::stats::{covariance_matrix, mean};
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp1};
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info};

/// Trading days used to annualize daily statistics
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// How random weight vectors are drawn from the simplex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightSampler {
    /// Independent uniform(0, 1) draws divided by their sum
    ///
    /// Not uniform over the simplex: mass concentrates near equal weights.
    #[default]
    NormalizedUniform,

    /// Symmetric Dirichlet(1, ..., 1) via normalized Exp(1) draws
    ///
    /// Uniform over the simplex.
    FlatDirichlet,
}

impl WeightSampler {
    /// Fill `weights` with one simplex point
    fn fill<R: Rng + ?Sized>(&self, rng: &mut R, weights: &mut [f64]) {
        loop {
            let mut total = 0.0;
            for w in weights.iter_mut() {
                *w = match self {
                    WeightSampler::NormalizedUniform => rng.gen::<f64>(),
                    WeightSampler::FlatDirichlet => Exp1.sample(rng),
                };
                total += *w;
            }

            // All-zero draws cannot be normalized; redraw
            if total > 0.0 {
                for w in weights.iter_mut() {
                    *w /= total;
                }
                return;
            }
        }
    }
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of random portfolios to evaluate
    #[serde(default = "default_num_portfolios")]
    pub num_portfolios: usize,

    /// Random seed for reproducible runs (None = seeded from entropy)
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// Weight sampling scheme
    #[serde(default)]
    pub sampler: WeightSampler,
}

fn default_num_portfolios() -> usize {
    5_000
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_portfolios: default_num_portfolios(),
            random_seed: None,
            sampler: WeightSampler::default(),
        }
    }
}

/// Annualized statistics of a single asset in the universe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetStatistics {
    pub symbol: String,
    pub annual_return: f64,
    pub annual_volatility: f64,
}

/// One evaluated Monte Carlo draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationSample<'a> {
    /// Position in generation order
    pub index: usize,

    /// Simplex weights, ordered like the universe's symbols
    pub weights: &'a [f64],

    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
}

/// Risk/return coordinates of one sample, for scatter plots
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrontierPoint {
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
}

/// Weight of one asset in the recommended allocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationEntry {
    pub symbol: String,

    /// Weight in percent (entries sum to 100)
    pub weight_pct: f64,
}

/// Serializable view of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontierSummary {
    pub allocation: Vec<AllocationEntry>,
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub assets: Vec<AssetStatistics>,
    pub cloud: Vec<FrontierPoint>,
}

/// All samples of one simulation run plus the selected best sample
#[derive(Debug, Clone)]
pub struct SimulationResult {
    symbols: Vec<String>,
    weights: Vec<f64>,
    expected_returns: Vec<f64>,
    volatilities: Vec<f64>,
    sharpe_ratios: Vec<f64>,
    best: usize,
    assets: Vec<AssetStatistics>,
}

impl SimulationResult {
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn num_assets(&self) -> usize {
        self.symbols.len()
    }

    /// Number of samples drawn
    pub fn len(&self) -> usize {
        self.sharpe_ratios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sharpe_ratios.is_empty()
    }

    pub fn sample(&self, index: usize) -> Option<SimulationSample<'_>> {
        if index >= self.len() {
            return None;
        }

        let n = self.num_assets();
        Some(SimulationSample {
            index,
            weights: &self.weights[index * n..(index + 1) * n],
            expected_return: self.expected_returns[index],
            volatility: self.volatilities[index],
            sharpe_ratio: self.sharpe_ratios[index],
        })
    }

    /// Samples in generation order
    pub fn samples(&self) -> impl Iterator<Item = SimulationSample<'_>> + '_ {
        (0..self.len()).filter_map(move |i| self.sample(i))
    }

    pub fn best_index(&self) -> usize {
        self.best
    }

    /// Sample with the maximum Sharpe ratio (first one on ties)
    pub fn best(&self) -> SimulationSample<'_> {
        let n = self.num_assets();
        SimulationSample {
            index: self.best,
            weights: &self.weights[self.best * n..(self.best + 1) * n],
            expected_return: self.expected_returns[self.best],
            volatility: self.volatilities[self.best],
            sharpe_ratio: self.sharpe_ratios[self.best],
        }
    }

    /// Best weights as percentages per symbol
    pub fn best_allocation(&self) -> Vec<AllocationEntry> {
        self.symbols
            .iter()
            .zip(self.best().weights)
            .map(|(symbol, w)| AllocationEntry {
                symbol: symbol.clone(),
                weight_pct: w * 100.0,
            })
            .collect()
    }

    /// (return, volatility, Sharpe) of every sample
    pub fn cloud(&self) -> Vec<FrontierPoint> {
        self.expected_returns
            .iter()
            .zip(&self.volatilities)
            .zip(&self.sharpe_ratios)
            .map(|((&expected_return, &volatility), &sharpe_ratio)| FrontierPoint {
                expected_return,
                volatility,
                sharpe_ratio,
            })
            .collect()
    }

    pub fn asset_statistics(&self) -> &[AssetStatistics] {
        &self.assets
    }

    pub fn summary(&self) -> FrontierSummary {
        let best = self.best();
        FrontierSummary {
            allocation: self.best_allocation(),
            expected_return: best.expected_return,
            volatility: best.volatility,
            sharpe_ratio: best.sharpe_ratio,
            assets: self.assets.clone(),
            cloud: self.cloud(),
        }
    }
}

impl Serialize for SimulationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.summary().serialize(serializer)
    }
}

/// Monte Carlo portfolio simulator
#[derive(Debug, Clone)]
pub struct PortfolioSimulator {
    config: SimulationConfig,
}

impl PortfolioSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run the search with the configured seed
    ///
    /// # Example
    ///
    /// ```
    /// use ag_analytics::{PortfolioSimulator, ReturnMatrix, SimulationConfig};
    /// use chrono::NaiveDate;
    ///
    /// let dates: Vec<NaiveDate> = (1..=4)
    ///     .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
    ///     .collect();
    /// let returns = ReturnMatrix::from_columns(dates, vec![
    ///     ("A".to_string(), vec![0.01, -0.02, 0.015, 0.005]),
    ///     ("B".to_string(), vec![0.002, 0.001, -0.001, 0.003]),
    /// ]).unwrap();
    ///
    /// let simulator = PortfolioSimulator::new(SimulationConfig {
    ///     num_portfolios: 500,
    ///     random_seed: Some(7),
    ///     ..Default::default()
    /// });
    /// let result = simulator.simulate(&returns).unwrap();
    ///
    /// let total: f64 = result.best().weights.iter().sum();
    /// assert!((total - 1.0).abs() < 1e-9);
    /// ```
    pub fn simulate(&self, returns: &ReturnMatrix) -> Result<SimulationResult> {
        let mut rng = match self.config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.simulate_with_rng(returns, &mut rng)
    }

    /// Run the search drawing from a caller-supplied random stream
    pub fn simulate_with_rng<R: Rng + ?Sized>(
        &self,
        returns: &ReturnMatrix,
        rng: &mut R,
    ) -> Result<SimulationResult> {
        let n = returns.num_assets();
        if n < 2 {
            return Err(AnalyticsError::InvalidUniverse { assets: n });
        }

        if self.config.num_portfolios == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "Number of portfolios must be positive".to_string(),
            ));
        }

        // Invariant across samples: computed once. A single observation
        // yields a zero covariance matrix, so every sample is degenerate.
        let mean_returns = DVector::from_iterator(
            n,
            returns
                .columns()
                .iter()
                .map(|c| mean(c) * TRADING_DAYS_PER_YEAR),
        );
        let cov = covariance_matrix(returns) * TRADING_DAYS_PER_YEAR;

        let num_samples = self.config.num_portfolios;
        info!(
            assets = n,
            observations = returns.len(),
            samples = num_samples,
            sampler = ?self.config.sampler,
            "Running Monte Carlo portfolio simulation"
        );

        let mut weights = vec![0.0; num_samples * n];
        let mut expected_returns = Vec::with_capacity(num_samples);
        let mut volatilities = Vec::with_capacity(num_samples);
        let mut sharpe_ratios = Vec::with_capacity(num_samples);
        let mut best = 0;

        for (i, w) in weights.chunks_exact_mut(n).enumerate() {
            self.config.sampler.fill(rng, w);

            let (expected_return, volatility) = evaluate(w, &mean_returns, &cov);
            let sharpe = sharpe_ratio(expected_return, volatility);

            expected_returns.push(expected_return);
            volatilities.push(volatility);
            sharpe_ratios.push(sharpe);

            // Strict comparison keeps the first-seen maximum
            if sharpe > sharpe_ratios[best] {
                best = i;
            }
        }

        let assets = returns
            .symbols()
            .iter()
            .enumerate()
            .map(|(i, symbol)| AssetStatistics {
                symbol: symbol.clone(),
                annual_return: mean_returns[i],
                annual_volatility: cov[(i, i)].max(0.0).sqrt(),
            })
            .collect();

        debug!(
            best_index = best,
            best_sharpe = sharpe_ratios[best],
            best_return = expected_returns[best],
            best_volatility = volatilities[best],
            "Simulation complete"
        );

        Ok(SimulationResult {
            symbols: returns.symbols().to_vec(),
            weights,
            expected_returns,
            volatilities,
            sharpe_ratios,
            best,
            assets,
        })
    }
}

/// Annualized expected return and volatility `sqrt(w' Σ w)` of one weight vector
fn evaluate(weights: &[f64], mean_returns: &DVector<f64>, cov: &DMatrix<f64>) -> (f64, f64) {
    let expected_return: f64 = weights
        .iter()
        .zip(mean_returns.iter())
        .map(|(w, mu)| w * mu)
        .sum();

    let mut variance = 0.0;
    for (i, wi) in weights.iter().enumerate() {
        for (j, wj) in weights.iter().enumerate() {
            variance += wi * wj * cov[(i, j)];
        }
    }

    // Rounding can push a PSD quadratic form a hair below zero
    (expected_return, variance.max(0.0).sqrt())
}

/// Sharpe ratio at a zero risk-free rate
///
/// A zero-volatility portfolio has no defined ratio and scores `-inf`, so it
/// is never preferred over a portfolio with measurable risk.
pub fn sharpe_ratio(expected_return: f64, volatility: f64) -> f64 {
    if volatility == 0.0 {
        f64::NEG_INFINITY
    } else {
        expected_return / volatility
    }
}
