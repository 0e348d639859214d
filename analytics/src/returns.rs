//! Periodic return construction
//!
//! Turns a [`PriceTable`] into a [`ReturnMatrix`] of fractional returns
//! `r_t = p_t / p_{t-1} - 1`, keeping only rows where every column is
//! defined. Alignment is row-wise across the whole basket, not per asset.

use crate::error::{AnalyticsError, Result};
use crate::prices::PriceTable;
use chrono::NaiveDate;
use tracing::debug;

/// Aligned return series for a basket of assets
///
/// All columns share the same date index and length.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnMatrix {
    symbols: Vec<String>,
    dates: Vec<NaiveDate>,
    columns: Vec<Vec<f64>>,
}

impl ReturnMatrix {
    /// Build aligned returns from closing prices
    ///
    /// The first row never has a return and is always dropped, as is any row
    /// where some column lacks the current or the previous close. A return
    /// row carries the date of its later price.
    ///
    /// Returns [`AnalyticsError::InsufficientData`] if no row survives.
    pub fn from_prices(prices: &PriceTable) -> Result<Self> {
        if prices.num_symbols() == 0 {
            return Err(AnalyticsError::InsufficientData(
                "No price columns provided".to_string(),
            ));
        }

        let columns_in = prices.columns();
        let mut dates = Vec::new();
        let mut columns = vec![Vec::with_capacity(prices.num_rows()); prices.num_symbols()];

        for t in 1..prices.num_rows() {
            let row: Option<Vec<f64>> = columns_in
                .iter()
                .map(|column| period_return(column[t - 1], column[t]))
                .collect();

            // Any undefined cell drops the whole row
            let Some(row) = row else {
                continue;
            };

            dates.push(prices.dates()[t]);
            for (column, r) in columns.iter_mut().zip(row) {
                column.push(r);
            }
        }

        if dates.is_empty() {
            return Err(AnalyticsError::InsufficientData(format!(
                "No aligned return rows for {} ({} price rows)",
                prices.symbols().join(", "),
                prices.num_rows()
            )));
        }

        debug!(
            symbols = prices.num_symbols(),
            price_rows = prices.num_rows(),
            return_rows = dates.len(),
            "Built aligned return matrix"
        );

        Ok(Self {
            symbols: prices.symbols().to_vec(),
            dates,
            columns,
        })
    }

    /// Build a matrix from returns that are already aligned
    pub fn from_columns(
        dates: Vec<NaiveDate>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self> {
        if dates.is_empty() || columns.is_empty() {
            return Err(AnalyticsError::InsufficientData(
                "Return matrix has no rows or no columns".to_string(),
            ));
        }

        let mut symbols = Vec::with_capacity(columns.len());
        let mut data = Vec::with_capacity(columns.len());

        for (symbol, values) in columns {
            if values.len() != dates.len() {
                return Err(AnalyticsError::InvalidParameter(format!(
                    "Asset {} has {} observations, expected {}",
                    symbol,
                    values.len(),
                    dates.len()
                )));
            }
            if symbols.contains(&symbol) {
                return Err(AnalyticsError::InvalidParameter(format!(
                    "Duplicate return column for {}",
                    symbol
                )));
            }
            symbols.push(symbol);
            data.push(values);
        }

        Ok(Self {
            symbols,
            dates,
            columns: data,
        })
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    /// Number of aligned observations
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn num_assets(&self) -> usize {
        self.symbols.len()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    /// Return series for one symbol
    pub fn series(&self, symbol: &str) -> Result<&[f64]> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| self.columns[i].as_slice())
            .ok_or_else(|| AnalyticsError::UnknownSymbol(symbol.to_string()))
    }

    /// Restrict to a subset of symbols, in the requested order
    ///
    /// Rows are not re-aligned: the subset keeps the full basket's date index.
    pub fn select<S: AsRef<str>>(&self, symbols: &[S]) -> Result<ReturnMatrix> {
        let mut selected = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let symbol = symbol.as_ref();
            selected.push((symbol.to_string(), self.series(symbol)?.to_vec()));
        }

        Ok(ReturnMatrix {
            symbols: selected.iter().map(|(s, _)| s.clone()).collect(),
            dates: self.dates.clone(),
            columns: selected.into_iter().map(|(_, c)| c).collect(),
        })
    }
}

fn period_return(previous: Option<f64>, current: Option<f64>) -> Option<f64> {
    Some(current? / previous? - 1.0)
}
