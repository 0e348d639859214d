//! Error types for the analytics core

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while building or analyzing return data
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Return alignment produced no usable rows
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Optimization requested over fewer than two assets
    #[error("Invalid universe: need at least 2 assets to optimize, got {assets}")]
    InvalidUniverse { assets: usize },

    #[error("Invalid price for {symbol} on {date}: {price} (must be positive and finite)")]
    InvalidPrice {
        symbol: String,
        date: NaiveDate,
        price: f64,
    },

    #[error("Timestamps for {symbol} are not strictly increasing at {date}")]
    UnorderedTimestamps { symbol: String, date: NaiveDate },

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
