//! Turn raw worksheets into typed, classified, date-sorted [`CotRecord`]s.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::workbook::{excel_serial_to_date, Cell, RawSheet};
use super::IngestError;
use crate::columns::{
    Metric, AS_OF_DATE, COMMODITY_CODE, CONTRACT_MARKET_CODE, CONTRACT_UNITS, ESSENTIAL_COLUMNS,
    MARKET_AND_EXCHANGE_NAMES, REPORT_DATE,
};
use crate::record::{split_market_name, CotRecord};

/// What normalization kept and dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeReport {
    pub rows_in: usize,
    pub rows_kept: usize,
    /// Rows with a blank `Market_and_Exchange_Names`.
    pub rows_without_name: usize,
    /// Kept rows whose as-of date could not be parsed.
    pub unparsed_dates: usize,
    /// Essential columns found in at least one sheet, in catalog order.
    pub columns_present: Vec<&'static str>,
    /// Essential columns found in no sheet.
    pub columns_missing: Vec<&'static str>,
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub records: Vec<CotRecord>,
    pub report: NormalizeReport,
}

/// Parse `As_of_Date_In_Form_YYMMDD`.
///
/// Numeric values are left-padded to six digits (`50103` is 2005-01-03).
/// Anything that does not form a valid `%y%m%d` date is `None`.
pub fn parse_as_of_date(cell: &Cell) -> Option<NaiveDate> {
    let digits = match cell {
        Cell::Number(n) if n.fract() == 0.0 && *n >= 0.0 && *n < 1_000_000.0 => {
            format!("{:06}", *n as u32)
        }
        Cell::Text(s) => {
            let s = s.trim();
            if s.is_empty() || s.len() > 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            format!("{s:0>6}")
        }
        Cell::Date(serial) => return excel_serial_to_date(*serial),
        _ => return None,
    };
    NaiveDate::parse_from_str(&digits, "%y%m%d").ok()
}

/// Parse `Report_Date_as_MM_DD_YYYY`: an Excel date, or `MM/DD/YYYY` / ISO text.
pub fn parse_report_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(serial) | Cell::Number(serial) => excel_serial_to_date(*serial),
        Cell::Text(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, "%m/%d/%Y")
                .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
                .ok()
                .or_else(|| {
                    // ISO datetimes such as 2024-01-02T00:00:00
                    s.get(..10)
                        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
                })
        }
        _ => None,
    }
}

/// Header positions of the columns normalization reads, for one sheet.
struct SheetColumns {
    market: usize,
    as_of: Option<usize>,
    report: Option<usize>,
    contract_market_code: Option<usize>,
    commodity_code: Option<usize>,
    contract_units: Option<usize>,
    metrics: [Option<usize>; Metric::COUNT],
}

impl SheetColumns {
    fn locate(sheet: &RawSheet) -> Result<Self, IngestError> {
        let index: HashMap<&str, usize> = sheet
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .collect();
        let get = |name: &str| index.get(name).copied();

        let market = get(MARKET_AND_EXCHANGE_NAMES).ok_or_else(|| IngestError::MissingColumn {
            path: sheet.source.clone(),
            column: MARKET_AND_EXCHANGE_NAMES,
        })?;

        let mut metrics = [None; Metric::COUNT];
        for metric in Metric::ALL {
            metrics[metric.index()] = get(metric.column());
        }

        Ok(Self {
            market,
            as_of: get(AS_OF_DATE),
            report: get(REPORT_DATE),
            contract_market_code: get(CONTRACT_MARKET_CODE),
            commodity_code: get(COMMODITY_CODE),
            contract_units: get(CONTRACT_UNITS),
            metrics,
        })
    }
}

fn cell_at(row: &[Cell], idx: Option<usize>) -> &Cell {
    static EMPTY: Cell = Cell::Empty;
    idx.and_then(|i| row.get(i)).unwrap_or(&EMPTY)
}

/// Concatenate sheets into records sorted by as-of date.
///
/// Header lookup is per sheet, so workbooks from different years may order
/// their columns differently. The sort is stable and puts undated rows last.
pub fn normalize(sheets: &[RawSheet]) -> Result<Normalized, IngestError> {
    let mut report = NormalizeReport::default();
    let mut records = Vec::new();

    for sheet in sheets {
        let cols = SheetColumns::locate(sheet)?;

        for row in &sheet.rows {
            report.rows_in += 1;

            let Some(market) = cell_at(row, Some(cols.market)).as_text() else {
                report.rows_without_name += 1;
                continue;
            };
            let (commodity, exchange) = split_market_name(&market);
            let mut record = CotRecord::new(commodity, exchange);

            record.as_of_date = parse_as_of_date(cell_at(row, cols.as_of));
            if record.as_of_date.is_none() {
                report.unparsed_dates += 1;
            }
            record.report_date = parse_report_date(cell_at(row, cols.report));
            record.contract_market_code = cell_at(row, cols.contract_market_code).as_text();
            record.commodity_code = cell_at(row, cols.commodity_code).as_text();
            record.contract_units = cell_at(row, cols.contract_units).as_text();
            for metric in Metric::ALL {
                let value = cell_at(row, cols.metrics[metric.index()]).as_f64();
                record.set_metric(metric, value);
            }

            records.push(record);
        }
    }

    records.sort_by_key(|r| (r.as_of_date.is_none(), r.as_of_date));
    report.rows_kept = records.len();

    let (present, missing): (Vec<&'static str>, Vec<&'static str>) = ESSENTIAL_COLUMNS
        .iter()
        .copied()
        .partition(|col| sheets.iter().any(|s| s.column_index(col).is_some()));
    report.columns_present = present;
    report.columns_missing = missing;

    Ok(Normalized { records, report })
}
