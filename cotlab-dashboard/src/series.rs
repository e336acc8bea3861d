//! Chart series: selected columns and formulas evaluated over a commodity's rows.

use chrono::NaiveDate;
use cotlab_core::columns::Metric;
use cotlab_core::{CotRecord, Formula};
use serde::Serialize;

/// Which y-axis a trace is drawn against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    /// Legend label: the column's short name, or `Formula: <source>`.
    pub name: String,
    pub axis: Axis,
    /// Technical column name; `None` for formula traces.
    pub column: Option<&'static str>,
    pub values: Vec<Option<f64>>,
}

/// Columns and an optional formula for one axis.
#[derive(Debug, Clone, Default)]
pub struct AxisSelection {
    pub columns: Vec<Metric>,
    pub formula: Option<String>,
}

impl AxisSelection {
    pub fn left_default() -> Self {
        Self {
            columns: vec![Metric::OpenInterest],
            formula: None,
        }
    }

    pub fn right_default() -> Self {
        Self {
            columns: vec![Metric::PctOiManagedMoneyLong, Metric::PctOiManagedMoneyShort],
            formula: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormulaErrors {
    pub left: Option<String>,
    pub right: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub dates: Vec<NaiveDate>,
    pub traces: Vec<Trace>,
    pub formula_errors: FormulaErrors,
}

/// Formula trace first, then one trace per column. A formula that fails to
/// parse yields its error message instead of a trace.
fn axis_traces(
    records: &[CotRecord],
    selection: &AxisSelection,
    axis: Axis,
    traces: &mut Vec<Trace>,
) -> Option<String> {
    let mut error = None;
    if let Some(src) = selection.formula.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        match Formula::parse(src) {
            Ok(formula) => traces.push(Trace {
                name: format!("Formula: {}", formula.source()),
                axis,
                column: None,
                values: formula.evaluate_series(records),
            }),
            Err(e) => error = Some(e.to_string()),
        }
    }
    for &metric in &selection.columns {
        traces.push(Trace {
            name: metric.short_name().to_string(),
            axis,
            column: Some(metric.column()),
            values: records.iter().map(|r| r.metric(metric)).collect(),
        });
    }
    error
}

/// Build chart series over dated records. Undated rows cannot be placed on
/// the time axis and are left out.
pub fn build_series(records: &[CotRecord], left: &AxisSelection, right: &AxisSelection) -> ChartSeries {
    let dated: Vec<CotRecord> = records
        .iter()
        .filter(|r| r.as_of_date.is_some())
        .cloned()
        .collect();
    let dates = dated.iter().filter_map(|r| r.as_of_date).collect();

    let mut traces = Vec::new();
    let formula_errors = FormulaErrors {
        left: axis_traces(&dated, left, Axis::Left, &mut traces),
        right: axis_traces(&dated, right, Axis::Right, &mut traces),
    };
    ChartSeries {
        dates,
        traces,
        formula_errors,
    }
}

/// Parse a comma-separated column list of short or technical names.
///
/// Returns the offending name on failure.
pub fn parse_columns(list: &str) -> Result<Vec<Metric>, String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| Metric::lookup(name).ok_or_else(|| name.to_string()))
        .collect()
}
