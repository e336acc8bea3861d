//! Commodity price data: provider trait, Yahoo Finance, commodity-level fetching.

pub mod prices;
pub mod provider;
pub mod yahoo;

pub use prices::{
    fetch_commodity_prices, fetch_many, fetch_ticker, partition_mappable, CommodityPrices,
    PriceStats,
};
pub use provider::{DataError, FetchProgress, FetchResult, PriceBar, PriceProvider, TracingProgress};
pub use yahoo::YahooProvider;
