//! COTLab Store — SQLite persistence and everything built on it.
//!
//! This crate builds on `cotlab-core` to provide:
//! - `cotlab.toml` configuration
//! - The `cot_data`, `commodity_price_mapping` and `commodity_prices` tables
//! - The load pipeline (workbooks → normalized rows → `cot_data`)
//! - Sidebar filtering of the commodity list
//! - CSV export and re-import of `cot_data` rows

pub mod config;
pub mod cot;
pub mod db;
pub mod export;
pub mod filter;
pub mod loader;
pub mod price_mapping;
pub mod prices;

pub use config::{ConfigError, CotlabConfig, DEFAULT_CONFIG_FILE};
pub use cot::{cot_columns, CommodityStats};
pub use db::{CotStore, DateRange, StoreError};
pub use export::{export_file_name, records_from_csv, records_to_csv};
pub use filter::{CommodityFilter, CommodityListing, PriceAvailability};
pub use loader::{ingest_workbooks, run_load, LoadError, LoadSummary, LoadedFile, SkippedFile};
pub use price_mapping::PriceMapping;
