//! Commodity-level price fetching on top of a [`PriceProvider`].
//!
//! Resolves a COT commodity name to a ticker, fetches it, and falls back to
//! the ETF ticker when the futures contract yields nothing.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;

use super::provider::{DataError, FetchProgress, PriceBar, PriceProvider};
use crate::tickers::{normalize_commodity_name, ticker_for, tickers_for, TickerType};

/// Bars fetched for one commodity, with the ticker that produced them.
#[derive(Debug, Clone)]
pub struct CommodityPrices {
    pub commodity: String,
    pub ticker: String,
    pub ticker_type: TickerType,
    pub bars: Vec<PriceBar>,
}

/// Summary of closing prices over a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceStats {
    pub latest: f64,
    pub min: f64,
    pub max: f64,
    /// Last close minus first close.
    pub change: f64,
    /// `change` relative to the first close, in percent. `None` when the first close is zero.
    pub change_pct: Option<f64>,
}

impl PriceStats {
    /// Stats over bars in date order. `None` for an empty slice.
    pub fn from_bars(bars: &[PriceBar]) -> Option<Self> {
        let first = bars.first()?.close;
        let latest = bars.last()?.close;
        let (min, max) = bars.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), b| {
            (lo.min(b.close), hi.max(b.close))
        });
        let change = latest - first;
        let change_pct = (first != 0.0).then(|| change / first * 100.0);
        Some(Self {
            latest,
            min,
            max,
            change,
            change_pct,
        })
    }
}

/// Fetch one ticker, treating an empty result as "not found".
pub fn fetch_ticker(
    provider: &dyn PriceProvider,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PriceBar>, DataError> {
    if !provider.is_available() {
        return Err(DataError::Unavailable(provider.name().to_string()));
    }
    let result = provider.fetch(ticker, start, end)?;
    if result.bars.is_empty() {
        return Err(DataError::SymbolNotFound {
            symbol: ticker.to_string(),
        });
    }
    Ok(result.bars)
}

/// Fetch prices for a commodity by name.
///
/// The name is normalized, mapped to a ticker (futures first when
/// `prefer_futures`), and fetched. When that fails or returns nothing and the
/// commodity has a different ETF ticker, the ETF is tried. The error from the
/// preferred ticker is returned if both fail.
pub fn fetch_commodity_prices(
    provider: &dyn PriceProvider,
    commodity: &str,
    start: NaiveDate,
    end: NaiveDate,
    prefer_futures: bool,
) -> Result<CommodityPrices, DataError> {
    let normalized = normalize_commodity_name(commodity);
    let ticker = ticker_for(&normalized, prefer_futures).ok_or_else(|| DataError::NoTicker {
        commodity: commodity.to_string(),
    })?;

    let first_err = match fetch_ticker(provider, ticker, start, end) {
        Ok(bars) => return Ok(commodity_prices(commodity, ticker, bars)),
        Err(e) => e,
    };

    let etf = tickers_for(&normalized)
        .and_then(|pair| pair.etf)
        .filter(|etf| *etf != ticker);
    let Some(etf) = etf else {
        return Err(first_err);
    };

    tracing::info!(commodity, ticker, etf, error = %first_err, "trying ETF ticker as fallback");
    match fetch_ticker(provider, etf, start, end) {
        Ok(bars) => Ok(commodity_prices(commodity, etf, bars)),
        Err(e) => {
            tracing::debug!(commodity, etf, error = %e, "ETF fallback failed");
            Err(first_err)
        }
    }
}

fn commodity_prices(commodity: &str, ticker: &str, bars: Vec<PriceBar>) -> CommodityPrices {
    CommodityPrices {
        commodity: commodity.to_string(),
        ticker: ticker.to_string(),
        ticker_type: TickerType::of(ticker),
        bars,
    }
}

/// Split commodity names into (mapped, unmapped) by ticker availability.
pub fn partition_mappable<S: AsRef<str>>(commodities: &[S]) -> (Vec<String>, Vec<String>) {
    commodities
        .iter()
        .map(|c| c.as_ref().to_string())
        .partition(|c| ticker_for(&normalize_commodity_name(c), true).is_some())
}

/// Fetch several commodities in order, sleeping `delay` after each request.
///
/// Every commodity gets an entry in the result, successful or not.
pub fn fetch_many(
    provider: &dyn PriceProvider,
    commodities: &[String],
    start: NaiveDate,
    end: NaiveDate,
    delay: Duration,
    progress: &dyn FetchProgress,
) -> Vec<(String, Result<CommodityPrices, DataError>)> {
    let total = commodities.len();
    let mut succeeded = 0;
    let mut results = Vec::with_capacity(total);

    for (index, commodity) in commodities.iter().enumerate() {
        progress.on_start(commodity, index, total);
        let result = fetch_commodity_prices(provider, commodity, start, end, true);

        progress.on_complete(commodity, result.as_ref().map(|p| p.bars.len()));
        if result.is_ok() {
            succeeded += 1;
        }
        results.push((commodity.clone(), result));

        if !delay.is_zero() && index + 1 < total {
            std::thread::sleep(delay);
        }
    }

    progress.on_batch_complete(succeeded, total - succeeded, total);
    results
}
