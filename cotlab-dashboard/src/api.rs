//! JSON API handlers.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use cotlab_core::columns::{ColumnInfo, Metric, COLUMN_REFERENCE};
use cotlab_core::data::{fetch_ticker, PriceBar, PriceStats};
use cotlab_store::{
    export_file_name, records_to_csv, CommodityFilter, CommodityListing, CommodityStats,
    CotStore, DateRange, PriceAvailability, PriceMapping, StoreError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::series::{build_series, parse_columns, AxisSelection, ChartSeries};
use crate::state::AppState;

// ── Errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, self.to_string()).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ── Shared helpers ───────────────────────────────────────────────────

async fn require_commodity(store: &CotStore, commodity: &str) -> ApiResult<CommodityStats> {
    store
        .commodity_stats(commodity)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No data available for {commodity}")))
}

/// Fill a partial date range from the commodity's own bounds.
///
/// With neither end given the full bounds are used; `None` means the
/// commodity has no dated rows at all.
async fn resolve_range(
    store: &CotStore,
    commodity: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> ApiResult<Option<DateRange>> {
    let bounds = store.date_bounds(commodity).await?;
    let start = start.or(bounds.map(|b| b.start)).or(end);
    let end = end.or(bounds.map(|b| b.end)).or(start);
    match (start, end) {
        (Some(s), Some(e)) => DateRange::new(s, e)
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest(format!("start date {s} is after end date {e}"))),
        _ => Ok(None),
    }
}

// ── /api/types ───────────────────────────────────────────────────────

pub async fn types(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.store.commodity_types().await?))
}

// ── /api/commodities ─────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CommoditiesQuery {
    /// Comma-separated type labels.
    pub types: Option<String>,
    pub price: Option<String>,
    pub oi_min: Option<f64>,
    pub oi_max: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CommoditiesResponse {
    pub commodities: Vec<CommodityListing>,
    /// Largest max open interest over all commodities, before filtering.
    pub max_oi: Option<f64>,
}

pub async fn commodities(
    State(state): State<AppState>,
    Query(q): Query<CommoditiesQuery>,
) -> ApiResult<Json<CommoditiesResponse>> {
    let price = match q.price.as_deref() {
        Some(p) => p.parse::<PriceAvailability>().map_err(ApiError::BadRequest)?,
        None => PriceAvailability::All,
    };
    let filter = CommodityFilter {
        types: q
            .types
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        price,
        oi_min: q.oi_min,
        oi_max: q.oi_max,
    };

    let stats = state.store.commodities_with_stats().await?;
    let max_oi = stats.iter().filter_map(|s| s.max_oi).reduce(f64::max);
    let mapped = state.store.mapped_names().await?;
    Ok(Json(CommoditiesResponse {
        commodities: filter.apply(stats, &mapped),
        max_oi,
    }))
}

// ── /api/columns ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct MetricColumn {
    pub name: &'static str,
    pub short_name: &'static str,
    pub percentage: bool,
}

#[derive(Debug, Serialize)]
pub struct ColumnsResponse {
    pub reference: &'static [ColumnInfo],
    /// Chartable columns, in catalog order.
    pub metrics: Vec<MetricColumn>,
}

pub async fn columns() -> Json<ColumnsResponse> {
    Json(ColumnsResponse {
        reference: COLUMN_REFERENCE,
        metrics: Metric::ALL
            .iter()
            .map(|m| MetricColumn {
                name: m.column(),
                short_name: m.short_name(),
                percentage: m.is_percentage(),
            })
            .collect(),
    })
}

// ── /api/series ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    pub commodity: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Comma-separated columns; absent means the default selection.
    pub left: Option<String>,
    pub right: Option<String>,
    pub left_formula: Option<String>,
    pub right_formula: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    pub commodity: CommodityStats,
    /// Full as-of date span of the commodity.
    pub bounds: Option<DateRange>,
    /// Span actually plotted.
    pub range: Option<DateRange>,
    #[serde(flatten)]
    pub series: ChartSeries,
}

fn axis_selection(
    columns: Option<&str>,
    formula: Option<String>,
    default: AxisSelection,
) -> ApiResult<AxisSelection> {
    let columns = match columns {
        Some(list) => parse_columns(list)
            .map_err(|name| ApiError::BadRequest(format!("unknown column '{name}'")))?,
        None => default.columns,
    };
    Ok(AxisSelection { columns, formula })
}

pub async fn series(
    State(state): State<AppState>,
    Query(q): Query<SeriesQuery>,
) -> ApiResult<Json<SeriesResponse>> {
    let left = axis_selection(q.left.as_deref(), q.left_formula, AxisSelection::left_default())?;
    let right = axis_selection(q.right.as_deref(), q.right_formula, AxisSelection::right_default())?;

    let commodity = require_commodity(&state.store, &q.commodity).await?;
    let bounds = state.store.date_bounds(&q.commodity).await?;
    let range = resolve_range(&state.store, &q.commodity, q.start, q.end).await?;
    let records = state.store.load_commodity_data(&q.commodity, range).await?;

    Ok(Json(SeriesResponse {
        commodity,
        bounds,
        range,
        series: build_series(&records, &left, &right),
    }))
}

// ── /api/prices ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub commodity: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct PricesResponse {
    pub commodity: String,
    pub mapping: Option<PriceMapping>,
    pub bars: Vec<PriceBar>,
    pub stats: Option<PriceStats>,
    /// Bars fetched from the provider during this request.
    pub fetched: usize,
    pub message: Option<String>,
}

/// Stored bars for the commodity's mapped ticker. When nothing is stored yet
/// the ticker is fetched over the COT date range and saved first.
pub async fn prices(
    State(state): State<AppState>,
    Query(q): Query<RangeQuery>,
) -> ApiResult<Json<PricesResponse>> {
    require_commodity(&state.store, &q.commodity).await?;
    let mut response = PricesResponse {
        commodity: q.commodity.clone(),
        mapping: state.store.price_mapping(&q.commodity).await?,
        bars: Vec::new(),
        stats: None,
        fetched: 0,
        message: None,
    };

    let Some(ticker) = response.mapping.as_ref().and_then(|m| m.ticker_symbol.clone()) else {
        response.message = Some(
            "No price mapping found for this commodity. Price mappings are managed in the backend."
                .into(),
        );
        return Ok(Json(response));
    };

    let range = resolve_range(&state.store, &q.commodity, q.start, q.end).await?;

    if !state.store.has_prices(&q.commodity).await? {
        if let Some(r) = range {
            let source = state.prices.clone();
            let symbol = ticker.clone();
            let fetched = tokio::task::spawn_blocking(move || {
                let provider = source()?;
                fetch_ticker(provider.as_ref(), &symbol, r.start, r.end)
            })
            .await
            .map_err(|e| ApiError::Internal(format!("price fetch task failed: {e}")))?;

            match fetched {
                Ok(bars) => {
                    response.fetched = state.store.save_prices(&q.commodity, &bars).await?;
                    tracing::info!(commodity = %q.commodity, %ticker, bars = response.fetched, "fetched prices");
                }
                Err(e) => {
                    tracing::warn!(commodity = %q.commodity, %ticker, error = %e, "price fetch failed");
                    response.message =
                        Some(format!("Could not fetch price data for ticker {ticker}: {e}"));
                }
            }
        }
    }

    response.bars = state.store.prices_for(&q.commodity, range).await?;
    response.stats = PriceStats::from_bars(&response.bars);
    if response.bars.is_empty() && response.message.is_none() {
        response.message = Some(if state.store.has_prices(&q.commodity).await? {
            "Price data available but no data for selected date range".into()
        } else {
            "No price data available. The ticker may not be valid or Yahoo Finance may be unavailable."
                .into()
        });
    }
    Ok(Json(response))
}

// ── /api/export ──────────────────────────────────────────────────────

pub async fn export(
    State(state): State<AppState>,
    Query(q): Query<RangeQuery>,
) -> ApiResult<Response> {
    require_commodity(&state.store, &q.commodity).await?;
    let range = resolve_range(&state.store, &q.commodity, q.start, q.end).await?;
    let records = state.store.load_commodity_data(&q.commodity, range).await?;
    let csv = records_to_csv(&records).map_err(|e| ApiError::Internal(format!("{e:#}")))?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(&q.commodity).replace('"', "")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}
