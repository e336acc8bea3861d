//! Price provider trait and structured error types.
//!
//! The PriceProvider trait abstracts over price sources so the dashboard and
//! the CLI can share fetching logic and tests can swap in a fixed source.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Daily OHLCV bar for a commodity ticker.
///
/// Only the close is required; Yahoo leaves the other fields null on some
/// thinly traded days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<i64>,
}

/// Structured error types for price operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} for {symbol}")]
    Http { status: u16, symbol: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no ticker mapping for commodity '{commodity}'")]
    NoTicker { commodity: String },

    #[error("price provider '{0}' is unavailable")]
    Unavailable(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Result of a successful fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
}

/// Trait for price providers.
///
/// Providers know nothing about the database; storing bars is the caller's job.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol over an inclusive date range.
    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError>;

    /// Whether the provider can currently serve requests.
    fn is_available(&self) -> bool;
}

/// Progress callback for multi-commodity fetches.
pub trait FetchProgress: Send {
    /// Called when starting to fetch a commodity.
    fn on_start(&self, commodity: &str, index: usize, total: usize);

    /// Called when a commodity fetch completes; `Ok` carries the bar count.
    fn on_complete(&self, commodity: &str, result: Result<usize, &DataError>);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that emits `tracing` events.
pub struct TracingProgress;

impl FetchProgress for TracingProgress {
    fn on_start(&self, commodity: &str, index: usize, total: usize) {
        tracing::info!("[{}/{}] fetching prices for {commodity}", index + 1, total);
    }

    fn on_complete(&self, commodity: &str, result: Result<usize, &DataError>) {
        match result {
            Ok(n) => tracing::info!(commodity, bars = n, "fetched"),
            Err(e) => tracing::warn!(commodity, error = %e, "no price data"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        tracing::info!("price fetch complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}
