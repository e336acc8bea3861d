//! CSV export of `cot_data` rows, and the matching reader.
//!
//! The header is the `cot_data` column list. Empty cells mean NULL; floats
//! are written with Rust's shortest round-trip formatting, so reading an
//! export back yields exactly the records that were written.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use cotlab_core::columns::{
    Metric, AS_OF_DATE, COMMODITY_CODE, COMMODITY_NAME, COMMODITY_TYPE, CONTRACT_MARKET_CODE,
    CONTRACT_UNITS, EXCHANGE_NAME, REPORT_DATE,
};
use cotlab_core::{CommodityType, CotRecord};

use crate::cot::cot_columns;

/// Download name for a commodity's export: spaces become underscores.
pub fn export_file_name(commodity: &str) -> String {
    format!("{}_cot_data.csv", commodity.replace(' ', "_"))
}

fn field(record: &CotRecord, column: &str) -> String {
    let opt_date = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
    match column {
        AS_OF_DATE => opt_date(record.as_of_date),
        REPORT_DATE => opt_date(record.report_date),
        CONTRACT_MARKET_CODE => record.contract_market_code.clone().unwrap_or_default(),
        COMMODITY_CODE => record.commodity_code.clone().unwrap_or_default(),
        CONTRACT_UNITS => record.contract_units.clone().unwrap_or_default(),
        COMMODITY_NAME => record.commodity_name.clone(),
        EXCHANGE_NAME => record.exchange_name.clone(),
        COMMODITY_TYPE => record.commodity_type.label().to_string(),
        other => Metric::from_column(other)
            .and_then(|m| record.metric(m))
            .map(|v| v.to_string())
            .unwrap_or_default(),
    }
}

/// Render records as CSV text with a header row.
pub fn records_to_csv(records: &[CotRecord]) -> Result<String> {
    let columns = cot_columns();
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(columns)?;
    for record in records {
        wtr.write_record(columns.iter().map(|c| field(record, c)))?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Parse CSV produced by [`records_to_csv`].
///
/// Columns are located by header name; any column outside the `cot_data` set
/// is ignored and any missing optional column reads as NULL.
pub fn records_from_csv(text: &str) -> Result<Vec<CotRecord>> {
    let mut rdr = csv::Reader::from_reader(text.as_bytes());
    let headers = rdr.headers().context("CSV has no header row")?.clone();
    let index = |name: &str| headers.iter().position(|h| h == name);

    let Some(name_idx) = index(COMMODITY_NAME) else {
        bail!("CSV is missing the {COMMODITY_NAME} column");
    };
    let exchange_idx = index(EXCHANGE_NAME);
    let type_idx = index(COMMODITY_TYPE);

    let mut records = Vec::new();
    for (line, row) in rdr.records().enumerate() {
        let row = row.with_context(|| format!("bad CSV record {}", line + 1))?;
        let get = |col: &str| index(col).and_then(|i| row.get(i)).filter(|s| !s.is_empty());
        let text = |col: &str| get(col).map(str::to_string);
        let date = |col: &str| -> Result<Option<NaiveDate>> {
            get(col)
                .map(|s| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .with_context(|| format!("record {}: bad {col} '{s}'", line + 1))
                })
                .transpose()
        };

        let name = row.get(name_idx).unwrap_or_default();
        let exchange = exchange_idx.and_then(|i| row.get(i)).unwrap_or_default();
        let mut record = CotRecord::new(name, exchange);
        if let Some(label) = type_idx.and_then(|i| row.get(i)).filter(|s| !s.is_empty()) {
            record.commodity_type = CommodityType::from_label(label)
                .with_context(|| format!("record {}: unknown commodity type '{label}'", line + 1))?;
        }
        record.as_of_date = date(AS_OF_DATE)?;
        record.report_date = date(REPORT_DATE)?;
        record.contract_market_code = text(CONTRACT_MARKET_CODE);
        record.commodity_code = text(COMMODITY_CODE);
        record.contract_units = text(CONTRACT_UNITS);
        for metric in Metric::ALL {
            let value = get(metric.column())
                .map(|s| {
                    s.parse::<f64>().with_context(|| {
                        format!("record {}: bad {} '{s}'", line + 1, metric.column())
                    })
                })
                .transpose()?;
            record.set_metric(metric, value);
        }
        records.push(record);
    }
    Ok(records)
}
