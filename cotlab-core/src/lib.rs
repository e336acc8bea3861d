//! COTLab Core — domain types and pure logic for CFTC Commitments of Traders data.
//!
//! This crate contains everything that does not touch the database or serve HTTP:
//! - Column catalog (technical names, short names, descriptions)
//! - Commodity type classification
//! - Workbook discovery, reading, and normalization into [`CotRecord`]s
//! - Derived-series formula language
//! - Commodity → Yahoo ticker catalog and the price provider

pub mod classify;
pub mod columns;
pub mod data;
pub mod formula;
pub mod ingest;
pub mod record;
pub mod tickers;

pub use classify::{classify, CommodityType};
pub use columns::{ColumnInfo, Metric};
pub use formula::{Formula, FormulaError};
pub use record::CotRecord;
