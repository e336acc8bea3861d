//! COTLab Dashboard — browser UI for exploring COT positions.
//!
//! An axum server exposing a small JSON API over the store and an embedded
//! single-page frontend that charts the series with Plotly.

pub mod api;
pub mod frontend;
pub mod series;
pub mod server;
pub mod state;

pub use server::{router, serve};
pub use state::{yahoo_source, AppState, PriceSource};
