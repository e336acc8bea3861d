//! SQLite connection, schema, and the shared store error type.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;

use crate::cot::{cot_columns, COT_INDEXES};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid row: {0}")]
    InvalidRow(String),
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// `None` when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Handle to the COT database. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct CotStore {
    pool: SqlitePool,
}

impl CotStore {
    /// Open (creating if needed) the SQLite file and make sure every table exists.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(sqlx::Error::Io)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        tracing::debug!(path = %path.display(), "opened store");
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(&create_cot_table_sql("IF NOT EXISTS "))
            .execute(&self.pool)
            .await?;
        for sql in COT_INDEXES {
            sqlx::query(sql).execute(&self.pool).await?;
        }

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS commodity_price_mapping (
                commodity_name TEXT PRIMARY KEY,
                ticker_symbol TEXT,
                ticker_type TEXT,
                auto_mapped INTEGER DEFAULT 0,
                verified INTEGER DEFAULT 0,
                notes TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_price_mapping_ticker \
             ON commodity_price_mapping(ticker_symbol)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS commodity_prices (
                Commodity_Name TEXT NOT NULL,
                DATE TEXT NOT NULL,
                OPEN REAL,
                HIGH REAL,
                LOW REAL,
                CLOSE REAL NOT NULL,
                VOLUME INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_commodity_price_date \
             ON commodity_prices(Commodity_Name, DATE)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// `CREATE TABLE [IF NOT EXISTS ]cot_data (...)` over the fixed column set.
pub(crate) fn create_cot_table_sql(if_not_exists: &str) -> String {
    let columns: Vec<String> = cot_columns()
        .iter()
        .map(|c| format!("    {c} {}", crate::cot::sql_type(c)))
        .collect();
    format!(
        "CREATE TABLE {if_not_exists}cot_data (\n{}\n)",
        columns.join(",\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_range_is_inclusive() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let r = DateRange::new(d(2), d(9)).unwrap();
        assert!(r.contains(d(2)));
        assert!(r.contains(d(9)));
        assert!(!r.contains(d(10)));
        assert!(DateRange::new(d(9), d(2)).is_none());
    }

    #[test]
    fn create_sql_lists_every_column() {
        let sql = create_cot_table_sql("");
        assert!(sql.starts_with("CREATE TABLE cot_data ("));
        assert!(sql.contains("Commodity_Name TEXT NOT NULL"));
        assert!(sql.contains("As_of_Date_In_Form_YYMMDD TEXT"));
        assert!(sql.contains("Open_Interest_All REAL"));
        assert_eq!(sql.matches(',').count(), cot_columns().len() - 1);
    }
}
