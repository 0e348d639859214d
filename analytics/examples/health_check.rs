//! Portfolio health-check example
//!
//! Builds synthetic price histories for a small basket, then runs beta,
//! correlation and the Monte Carlo allocation search.
//!
//! Run with: cargo run --example health_check

use ag_analytics::{AnalysisConfig, HealthCheckEngine, PriceSeries, PriceTable, SimulationConfig};
use chrono::{Days, NaiveDate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Portfolio Health Check Example ===\n");

    // 1. Synthetic closes for one trading year
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let drivers: [(&str, f64, f64, f64); 4] = [
        // symbol, start price, market loading, drift
        ("SPY", 470.0, 1.0, 0.0004),
        ("NVDA", 480.0, 1.9, 0.0020),
        ("MSFT", 370.0, 1.1, 0.0006),
        ("TLT", 98.0, -0.3, 0.0001),
    ];

    let mut series = Vec::new();
    for (k, (symbol, first, loading, drift)) in drivers.iter().enumerate() {
        let mut price = *first;
        let mut observations = Vec::with_capacity(252);
        for t in 0..252u64 {
            observations.push((start + Days::new(t), price));
            let market = (t as f64 * 0.21).sin() * 0.011;
            let idio = ((t as f64 + k as f64 * 17.0) * 1.7).cos() * 0.004;
            price *= 1.0 + loading * market + idio + drift;
        }
        series.push(PriceSeries::from_pairs(*symbol, observations)?);
    }
    let prices = PriceTable::from_series(series)?;

    // 2. Configure and run
    let config = AnalysisConfig {
        symbols: vec!["NVDA".into(), "MSFT".into(), "TLT".into()],
        simulation: SimulationConfig {
            num_portfolios: 10_000,
            random_seed: Some(42),
            ..Default::default()
        },
        ..Default::default()
    };
    let engine = HealthCheckEngine::new(config)?;
    let as_of = *prices.dates().last().unwrap();
    let report = engine.run(&prices, as_of)?;

    // 3. Beta ranking
    if let Some(betas) = &report.betas {
        println!("Beta vs {}:", betas.benchmark);
        for entry in &betas.entries {
            println!("  {:<6} {:>6.2}", entry.symbol, entry.beta);
        }
        println!();
    }

    // 4. Correlation diagnosis
    let correlation = &report.correlation;
    println!("Average pairwise correlation: {:.2} ({})", correlation.average_correlation, correlation.tier.label());
    println!();

    // 5. Best allocation
    if let Some(optimization) = &report.optimization {
        let best = optimization.best();
        println!("Best of {} simulated portfolios:", optimization.len());
        for entry in optimization.best_allocation() {
            println!("  {:<6} {:>6.1}%", entry.symbol, entry.weight_pct);
        }
        println!(
            "  Return {:.1}%  Volatility {:.1}%  Sharpe {:.2}",
            best.expected_return * 100.0,
            best.volatility * 100.0,
            best.sharpe_ratio
        );
    }

    Ok(())
}
