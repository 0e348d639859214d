//! Closing-price input tables
//!
//! Price histories arrive one series per symbol and are outer-joined on date
//! into a [`PriceTable`]. A missing observation is stored as `None`, never as
//! a zero price.

use crate::error::{AnalyticsError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single closing price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    /// Trading date of the close
    pub date: NaiveDate,

    /// Closing price (positive, finite)
    pub close: f64,
}

/// Ordered price history for one symbol
#[derive(Debug, Clone, Serialize)]
pub struct PriceSeries {
    symbol: String,
    observations: Vec<PriceObservation>,
}

impl PriceSeries {
    /// Create a validated price series
    ///
    /// Dates must be strictly increasing and every close must be a positive
    /// finite number. The symbol is normalized to upper case.
    ///
    /// # Example
    ///
    /// ```
    /// use ag_analytics::{PriceObservation, PriceSeries};
    /// use chrono::NaiveDate;
    ///
    /// let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
    /// let series = PriceSeries::new("spy", vec![
    ///     PriceObservation { date: day(2), close: 470.0 },
    ///     PriceObservation { date: day(3), close: 468.5 },
    /// ]).unwrap();
    ///
    /// assert_eq!(series.symbol(), "SPY");
    /// assert_eq!(series.len(), 2);
    /// ```
    pub fn new(symbol: impl Into<String>, observations: Vec<PriceObservation>) -> Result<Self> {
        let symbol = normalize_symbol(&symbol.into());

        for (i, obs) in observations.iter().enumerate() {
            if !obs.close.is_finite() || obs.close <= 0.0 {
                return Err(AnalyticsError::InvalidPrice {
                    symbol,
                    date: obs.date,
                    price: obs.close,
                });
            }

            if i > 0 && obs.date <= observations[i - 1].date {
                return Err(AnalyticsError::UnorderedTimestamps {
                    symbol,
                    date: obs.date,
                });
            }
        }

        Ok(Self {
            symbol,
            observations,
        })
    }

    /// Create a series from `(date, close)` pairs
    pub fn from_pairs<I>(symbol: impl Into<String>, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let observations = pairs
            .into_iter()
            .map(|(date, close)| PriceObservation { date, close })
            .collect();
        Self::new(symbol, observations)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Normalize a ticker the way user input is normalized (trimmed, upper case)
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Date-indexed table of closing prices, one column per symbol
///
/// Rows are the union of all series' dates in ascending order. A cell is
/// `None` when that symbol has no close on that date.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    columns: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    /// Outer-join price series on date
    pub fn from_series(series: Vec<PriceSeries>) -> Result<Self> {
        let dates: Vec<NaiveDate> = series
            .iter()
            .flat_map(|s| s.observations.iter().map(|obs| obs.date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut symbols: Vec<String> = Vec::with_capacity(series.len());
        let mut columns = Vec::with_capacity(series.len());

        for s in series {
            if symbols.contains(&s.symbol) {
                return Err(AnalyticsError::InvalidParameter(format!(
                    "Duplicate price series for {}",
                    s.symbol
                )));
            }

            let mut column = vec![None; dates.len()];
            for obs in &s.observations {
                if let Ok(row) = dates.binary_search(&obs.date) {
                    column[row] = Some(obs.close);
                }
            }

            symbols.push(s.symbol);
            columns.push(column);
        }

        Ok(Self {
            dates,
            symbols,
            columns,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn num_rows(&self) -> usize {
        self.dates.len()
    }

    pub fn num_symbols(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.position(symbol).is_some()
    }

    /// Price column for a symbol, aligned with [`PriceTable::dates`]
    pub fn column(&self, symbol: &str) -> Option<&[Option<f64>]> {
        self.position(symbol).map(|i| self.columns[i].as_slice())
    }

    pub(crate) fn columns(&self) -> &[Vec<Option<f64>>] {
        &self.columns
    }

    /// Keep only rows dated on or after `start` (lookback window)
    pub fn since(&self, start: NaiveDate) -> PriceTable {
        let first = self.dates.partition_point(|d| *d < start);

        PriceTable {
            dates: self.dates[first..].to_vec(),
            symbols: self.symbols.clone(),
            columns: self
                .columns
                .iter()
                .map(|column| column[first..].to_vec())
                .collect(),
        }
    }

    /// Restrict the table to the given symbols, in the given order
    ///
    /// Fails with [`AnalyticsError::UnknownSymbol`] if any symbol is absent.
    pub fn select<S: AsRef<str>>(&self, symbols: &[S]) -> Result<PriceTable> {
        let mut selected_symbols = Vec::with_capacity(symbols.len());
        let mut selected_columns = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            let symbol = symbol.as_ref();
            let i = self
                .position(symbol)
                .ok_or_else(|| AnalyticsError::UnknownSymbol(symbol.to_string()))?;
            selected_symbols.push(self.symbols[i].clone());
            selected_columns.push(self.columns[i].clone());
        }

        Ok(PriceTable {
            dates: self.dates.clone(),
            symbols: selected_symbols,
            columns: selected_columns,
        })
    }

    fn position(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_series_rejects_non_positive_price() {
        let err = PriceSeries::from_pairs("AAPL", vec![(day(1), 10.0), (day(2), 0.0)]).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidPrice { .. }));

        let err = PriceSeries::from_pairs("AAPL", vec![(day(1), f64::NAN)]).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidPrice { .. }));
    }

    #[test]
    fn test_series_rejects_unordered_dates() {
        let err = PriceSeries::from_pairs("AAPL", vec![(day(2), 10.0), (day(2), 11.0)]).unwrap_err();
        assert!(matches!(err, AnalyticsError::UnorderedTimestamps { .. }));

        let err = PriceSeries::from_pairs("AAPL", vec![(day(3), 10.0), (day(1), 11.0)]).unwrap_err();
        assert!(matches!(err, AnalyticsError::UnorderedTimestamps { .. }));
    }

    #[test]
    fn test_table_outer_join() {
        let a = PriceSeries::from_pairs("a", vec![(day(1), 10.0), (day(2), 11.0)]).unwrap();
        let b = PriceSeries::from_pairs("b", vec![(day(2), 20.0), (day(3), 21.0)]).unwrap();

        let table = PriceTable::from_series(vec![a, b]).unwrap();

        assert_eq!(table.dates(), &[day(1), day(2), day(3)]);
        assert_eq!(table.symbols(), &["A".to_string(), "B".to_string()]);
        assert_eq!(table.column("A").unwrap(), &[Some(10.0), Some(11.0), None]);
        assert_eq!(table.column("B").unwrap(), &[None, Some(20.0), Some(21.0)]);
    }

    #[test]
    fn test_table_rejects_duplicate_symbol() {
        let a = PriceSeries::from_pairs("A", vec![(day(1), 10.0)]).unwrap();
        let dup = PriceSeries::from_pairs("a", vec![(day(2), 10.0)]).unwrap();

        assert!(PriceTable::from_series(vec![a, dup]).is_err());
    }

    #[test]
    fn test_since_and_select() {
        let a = PriceSeries::from_pairs("A", (1..=5).map(|d| (day(d), d as f64))).unwrap();
        let b = PriceSeries::from_pairs("B", (1..=5).map(|d| (day(d), 2.0 * d as f64))).unwrap();
        let table = PriceTable::from_series(vec![a, b]).unwrap();

        let window = table.since(day(3));
        assert_eq!(window.num_rows(), 3);
        assert_eq!(window.column("A").unwrap()[0], Some(3.0));

        let only_b = table.select(&["B"]).unwrap();
        assert_eq!(only_b.num_symbols(), 1);
        assert!(!only_b.contains("A"));

        let err = table.select(&["ZZZ"]).unwrap_err();
        assert!(matches!(err, AnalyticsError::UnknownSymbol(s) if s == "ZZZ"));
    }
}
