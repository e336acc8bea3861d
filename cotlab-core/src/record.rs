//! CotRecord — one row of the `cot_data` table.

use chrono::NaiveDate;

use crate::classify::CommodityType;
use crate::columns::Metric;

/// One published CFTC report line for a single commodity on a single date.
#[derive(Debug, Clone, PartialEq)]
pub struct CotRecord {
    pub commodity_name: String,
    /// Empty when the market name carried no exchange part.
    pub exchange_name: String,
    pub commodity_type: CommodityType,
    /// `None` when the source value could not be parsed as `YYMMDD`.
    pub as_of_date: Option<NaiveDate>,
    pub report_date: Option<NaiveDate>,
    pub contract_market_code: Option<String>,
    pub commodity_code: Option<String>,
    pub contract_units: Option<String>,
    /// Indexed by [`Metric::index`].
    pub metrics: [Option<f64>; Metric::COUNT],
}

impl CotRecord {
    /// A record with identification set and every metric empty.
    pub fn new(commodity_name: impl Into<String>, exchange_name: impl Into<String>) -> Self {
        let commodity_name = commodity_name.into();
        let commodity_type = crate::classify::classify(&commodity_name);
        Self {
            commodity_name,
            exchange_name: exchange_name.into(),
            commodity_type,
            as_of_date: None,
            report_date: None,
            contract_market_code: None,
            commodity_code: None,
            contract_units: None,
            metrics: [None; Metric::COUNT],
        }
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics[metric.index()]
    }

    pub fn set_metric(&mut self, metric: Metric, value: Option<f64>) {
        self.metrics[metric.index()] = value;
    }

    /// Builder-style setter, handy for fixtures.
    pub fn with_metric(mut self, metric: Metric, value: f64) -> Self {
        self.set_metric(metric, Some(value));
        self
    }

    pub fn with_as_of_date(mut self, date: NaiveDate) -> Self {
        self.as_of_date = Some(date);
        self
    }
}

/// Split a CFTC `Market_and_Exchange_Names` value into (commodity, exchange).
///
/// The split happens on the first `" - "`; both halves are trimmed.
pub fn split_market_name(market_and_exchange: &str) -> (String, String) {
    match market_and_exchange.split_once(" - ") {
        Some((commodity, exchange)) => (commodity.trim().to_string(), exchange.trim().to_string()),
        None => (market_and_exchange.trim().to_string(), String::new()),
    }
}
