//! `cot_data` table: wholesale replacement at load time, read-only queries after.

use std::sync::OnceLock;

use chrono::NaiveDate;
use cotlab_core::columns::{
    Metric, AS_OF_DATE, COMMODITY_CODE, COMMODITY_NAME, COMMODITY_TYPE, CONTRACT_MARKET_CODE,
    CONTRACT_UNITS, EXCHANGE_NAME, REPORT_DATE,
};
use cotlab_core::{CommodityType, CotRecord};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::{create_cot_table_sql, CotStore, DateRange, StoreError};

pub(crate) const COT_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_commodity_name ON cot_data(Commodity_Name)",
    "CREATE INDEX IF NOT EXISTS idx_commodity_type ON cot_data(Commodity_Type)",
    "CREATE INDEX IF NOT EXISTS idx_exchange ON cot_data(Exchange_Name)",
    "CREATE INDEX IF NOT EXISTS idx_date ON cot_data(As_of_Date_In_Form_YYMMDD)",
    "CREATE INDEX IF NOT EXISTS idx_commodity_code ON cot_data(CFTC_Commodity_Code)",
    "CREATE INDEX IF NOT EXISTS idx_open_interest ON cot_data(Open_Interest_All)",
];

/// Every `cot_data` column in table (and CSV export) order: report fields,
/// the 24 metrics, then the derived name/exchange/type columns.
pub fn cot_columns() -> &'static [&'static str] {
    static COLUMNS: OnceLock<Vec<&'static str>> = OnceLock::new();
    COLUMNS.get_or_init(|| {
        let mut cols = vec![
            AS_OF_DATE,
            REPORT_DATE,
            CONTRACT_MARKET_CODE,
            COMMODITY_CODE,
            CONTRACT_UNITS,
        ];
        cols.extend(Metric::ALL.iter().map(|m| m.column()));
        cols.extend([COMMODITY_NAME, EXCHANGE_NAME, COMMODITY_TYPE]);
        cols
    })
}

pub(crate) fn sql_type(column: &str) -> &'static str {
    match column {
        COMMODITY_NAME | EXCHANGE_NAME | COMMODITY_TYPE => "TEXT NOT NULL",
        _ if Metric::from_column(column).is_some() => "REAL",
        _ => "TEXT",
    }
}

fn insert_sql() -> &'static str {
    static SQL: OnceLock<String> = OnceLock::new();
    SQL.get_or_init(|| {
        let cols = cot_columns();
        let placeholders = vec!["?"; cols.len()].join(", ");
        format!(
            "INSERT INTO cot_data ({}) VALUES ({placeholders})",
            cols.join(", ")
        )
    })
}

/// Per-commodity open interest summary, as listed in the dashboard sidebar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommodityStats {
    pub commodity_name: String,
    pub exchange_name: String,
    pub commodity_code: Option<String>,
    pub commodity_type: String,
    pub min_oi: Option<f64>,
    pub max_oi: Option<f64>,
    pub avg_oi: Option<f64>,
}

const STATS_SELECT: &str = "SELECT Commodity_Name, Exchange_Name, CFTC_Commodity_Code, Commodity_Type, \
     MIN(Open_Interest_All) AS Min_OI, MAX(Open_Interest_All) AS Max_OI, AVG(Open_Interest_All) AS Avg_OI \
     FROM cot_data";

const STATS_GROUP: &str = "GROUP BY Commodity_Name, Exchange_Name, CFTC_Commodity_Code, Commodity_Type \
     ORDER BY Commodity_Name";

fn stats_from_row(row: &SqliteRow) -> Result<CommodityStats, StoreError> {
    Ok(CommodityStats {
        commodity_name: row.try_get("Commodity_Name")?,
        exchange_name: row.try_get("Exchange_Name")?,
        commodity_code: row.try_get("CFTC_Commodity_Code")?,
        commodity_type: row.try_get("Commodity_Type")?,
        min_oi: row.try_get("Min_OI")?,
        max_oi: row.try_get("Max_OI")?,
        avg_oi: row.try_get("Avg_OI")?,
    })
}

fn record_from_row(row: &SqliteRow) -> Result<CotRecord, StoreError> {
    let commodity_name: String = row.try_get(COMMODITY_NAME)?;
    let exchange_name: String = row.try_get(EXCHANGE_NAME)?;
    let type_label: String = row.try_get(COMMODITY_TYPE)?;
    let commodity_type = CommodityType::from_label(&type_label).ok_or_else(|| {
        StoreError::InvalidRow(format!("unknown commodity type '{type_label}'"))
    })?;

    let mut record = CotRecord::new(commodity_name, exchange_name);
    record.commodity_type = commodity_type;
    record.as_of_date = row.try_get::<Option<NaiveDate>, _>(AS_OF_DATE)?;
    record.report_date = row.try_get::<Option<NaiveDate>, _>(REPORT_DATE)?;
    record.contract_market_code = row.try_get(CONTRACT_MARKET_CODE)?;
    record.commodity_code = row.try_get(COMMODITY_CODE)?;
    record.contract_units = row.try_get(CONTRACT_UNITS)?;
    for metric in Metric::ALL {
        record.set_metric(metric, row.try_get::<Option<f64>, _>(metric.column())?);
    }
    Ok(record)
}

impl CotStore {
    /// Drop and recreate `cot_data`, insert every record, rebuild the indexes.
    ///
    /// Runs in one transaction: readers see either the old table or the new one.
    pub async fn replace_cot_data(&self, records: &[CotRecord]) -> Result<usize, StoreError> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("DROP TABLE IF EXISTS cot_data")
            .execute(&mut *tx)
            .await?;
        sqlx::query(&create_cot_table_sql(""))
            .execute(&mut *tx)
            .await?;

        for record in records {
            let mut q = sqlx::query(insert_sql())
                .bind(record.as_of_date)
                .bind(record.report_date)
                .bind(record.contract_market_code.as_deref())
                .bind(record.commodity_code.as_deref())
                .bind(record.contract_units.as_deref());
            for metric in Metric::ALL {
                q = q.bind(record.metric(metric));
            }
            q.bind(record.commodity_name.as_str())
                .bind(record.exchange_name.as_str())
                .bind(record.commodity_type.label())
                .execute(&mut *tx)
                .await?;
        }

        for sql in COT_INDEXES {
            sqlx::query(sql).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        tracing::info!(rows = records.len(), "replaced cot_data");
        Ok(records.len())
    }

    pub async fn count_rows(&self) -> Result<i64, StoreError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cot_data")
            .fetch_one(self.pool())
            .await?;
        Ok(n)
    }

    /// Open interest stats grouped by name, exchange, code and type, ordered by name.
    pub async fn commodities_with_stats(&self) -> Result<Vec<CommodityStats>, StoreError> {
        let rows = sqlx::query(&format!("{STATS_SELECT} {STATS_GROUP}"))
            .fetch_all(self.pool())
            .await?;

        rows.iter().map(stats_from_row).collect()
    }

    /// Stats for one commodity; the first exchange/code group when it has several.
    pub async fn commodity_stats(&self, commodity: &str) -> Result<Option<CommodityStats>, StoreError> {
        let row = sqlx::query(&format!(
            "{STATS_SELECT} WHERE Commodity_Name = ? {STATS_GROUP} LIMIT 1"
        ))
        .bind(commodity)
        .fetch_optional(self.pool())
        .await?;
        row.as_ref().map(stats_from_row).transpose()
    }

    /// Distinct commodity type labels, sorted.
    pub async fn commodity_types(&self) -> Result<Vec<String>, StoreError> {
        let types = sqlx::query_scalar(
            "SELECT DISTINCT Commodity_Type FROM cot_data ORDER BY Commodity_Type",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(types)
    }

    /// Distinct commodity names, sorted.
    pub async fn commodity_names(&self) -> Result<Vec<String>, StoreError> {
        let names = sqlx::query_scalar(
            "SELECT DISTINCT Commodity_Name FROM cot_data ORDER BY Commodity_Name",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(names)
    }

    /// Rows for one commodity ordered by as-of date, optionally limited to an
    /// inclusive date range. Undated rows only appear when no range is given,
    /// and then come last.
    pub async fn load_commodity_data(
        &self,
        commodity: &str,
        range: Option<DateRange>,
    ) -> Result<Vec<CotRecord>, StoreError> {
        let rows = match range {
            Some(r) => {
                sqlx::query(
                    "SELECT * FROM cot_data WHERE Commodity_Name = ? \
                     AND As_of_Date_In_Form_YYMMDD BETWEEN ? AND ? \
                     ORDER BY As_of_Date_In_Form_YYMMDD",
                )
                .bind(commodity)
                .bind(r.start)
                .bind(r.end)
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT * FROM cot_data WHERE Commodity_Name = ? \
                     ORDER BY As_of_Date_In_Form_YYMMDD IS NULL, As_of_Date_In_Form_YYMMDD",
                )
                .bind(commodity)
                .fetch_all(self.pool())
                .await?
            }
        };
        rows.iter().map(record_from_row).collect()
    }

    /// Earliest and latest as-of date recorded for a commodity.
    pub async fn date_bounds(&self, commodity: &str) -> Result<Option<DateRange>, StoreError> {
        let (min, max): (Option<String>, Option<String>) = sqlx::query_as(
            "SELECT MIN(As_of_Date_In_Form_YYMMDD), MAX(As_of_Date_In_Form_YYMMDD) \
             FROM cot_data WHERE Commodity_Name = ?",
        )
        .bind(commodity)
        .fetch_one(self.pool())
        .await?;

        let parse = |s: Option<String>| -> Result<Option<NaiveDate>, StoreError> {
            s.map(|s| {
                NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map_err(|e| StoreError::InvalidRow(format!("bad date '{s}': {e}")))
            })
            .transpose()
        };
        Ok(match (parse(min)?, parse(max)?) {
            (Some(start), Some(end)) => DateRange::new(start, end),
            _ => None,
        })
    }
}
