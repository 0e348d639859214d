//! Stored price file loading
//!
//! The price file is a JSON object mapping each symbol to its closes:
//!
//! ```json
//! { "SPY": [{ "date": "2024-01-02", "close": 472.65 }, ...], ... }
//! ```

use ag_analytics::{PriceObservation, PriceSeries, PriceTable};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub fn load_price_table(path: &Path) -> Result<PriceTable> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read price file {:?}", path))?;
    parse_price_table(&contents)
}

pub fn parse_price_table(json: &str) -> Result<PriceTable> {
    let raw: BTreeMap<String, Vec<PriceObservation>> =
        serde_json::from_str(json).context("Failed to parse price file")?;

    let series = raw
        .into_iter()
        .map(|(symbol, observations)| {
            PriceSeries::new(symbol.as_str(), observations)
                .with_context(|| format!("Invalid price history for {}", symbol))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PriceTable::from_series(series)?)
}
