//! `commodity_price_mapping`: which Yahoo ticker stands in for each COT commodity.

use std::collections::HashSet;

use cotlab_core::tickers::{normalize_commodity_name, ticker_for, TickerType};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::{CotStore, StoreError};

/// One mapping row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceMapping {
    pub commodity_name: String,
    pub ticker_symbol: Option<String>,
    pub ticker_type: Option<TickerType>,
    pub auto_mapped: bool,
    pub verified: bool,
    pub notes: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

fn mapping_from_row(row: &SqliteRow) -> Result<PriceMapping, StoreError> {
    let ticker_type: Option<String> = row.try_get("ticker_type")?;
    let ticker_type = match ticker_type {
        Some(s) => Some(
            TickerType::parse(&s)
                .ok_or_else(|| StoreError::InvalidRow(format!("unknown ticker type '{s}'")))?,
        ),
        None => None,
    };
    Ok(PriceMapping {
        commodity_name: row.try_get("commodity_name")?,
        ticker_symbol: row.try_get("ticker_symbol")?,
        ticker_type,
        auto_mapped: row.try_get::<Option<i64>, _>("auto_mapped")?.unwrap_or(0) != 0,
        verified: row.try_get::<Option<i64>, _>("verified")?.unwrap_or(0) != 0,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl CotStore {
    /// Map every commodity in `cot_data` that the ticker catalog knows.
    ///
    /// Without `overwrite`, existing rows (including hand-edited ones) are kept.
    /// Returns the number of commodities the catalog could map.
    pub async fn auto_map(&self, overwrite: bool) -> Result<usize, StoreError> {
        let commodities = self.commodity_names().await?;
        let mappings: Vec<(String, &'static str)> = commodities
            .into_iter()
            .filter_map(|name| {
                ticker_for(&normalize_commodity_name(&name), true).map(|ticker| (name, ticker))
            })
            .collect();

        let sql = if overwrite {
            "INSERT OR REPLACE INTO commodity_price_mapping \
             (commodity_name, ticker_symbol, ticker_type, auto_mapped, verified, updated_at) \
             VALUES (?, ?, ?, 1, 0, CURRENT_TIMESTAMP)"
        } else {
            "INSERT OR IGNORE INTO commodity_price_mapping \
             (commodity_name, ticker_symbol, ticker_type, auto_mapped, verified) \
             VALUES (?, ?, ?, 1, 0)"
        };

        let mut tx = self.pool().begin().await?;
        for (name, ticker) in &mappings {
            sqlx::query(sql)
                .bind(name.as_str())
                .bind(*ticker)
                .bind(TickerType::of(ticker).as_str())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::info!(mapped = mappings.len(), overwrite, "auto-mapped commodities");
        Ok(mappings.len())
    }

    pub async fn price_mapping(&self, commodity: &str) -> Result<Option<PriceMapping>, StoreError> {
        let row = sqlx::query("SELECT * FROM commodity_price_mapping WHERE commodity_name = ?")
            .bind(commodity)
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(mapping_from_row).transpose()
    }

    /// Set or clear a commodity's mapping. A `None` ticker deletes the row.
    ///
    /// The row is replaced wholesale, so `auto_mapped` drops back to 0.
    pub async fn update_price_mapping(
        &self,
        commodity: &str,
        ticker: Option<&str>,
        ticker_type: Option<TickerType>,
        verified: bool,
        notes: Option<&str>,
    ) -> Result<(), StoreError> {
        match ticker {
            None => {
                sqlx::query("DELETE FROM commodity_price_mapping WHERE commodity_name = ?")
                    .bind(commodity)
                    .execute(self.pool())
                    .await?;
            }
            Some(ticker) => {
                sqlx::query(
                    "INSERT OR REPLACE INTO commodity_price_mapping \
                     (commodity_name, ticker_symbol, ticker_type, verified, notes, updated_at) \
                     VALUES (?, ?, ?, ?, ?, CURRENT_TIMESTAMP)",
                )
                .bind(commodity)
                .bind(ticker)
                .bind(ticker_type.map(TickerType::as_str))
                .bind(i64::from(verified))
                .bind(notes)
                .execute(self.pool())
                .await?;
            }
        }
        Ok(())
    }

    /// Every mapping ordered by commodity name.
    pub async fn price_mappings(&self, verified_only: bool) -> Result<Vec<PriceMapping>, StoreError> {
        let sql = if verified_only {
            "SELECT * FROM commodity_price_mapping WHERE verified = 1 ORDER BY commodity_name"
        } else {
            "SELECT * FROM commodity_price_mapping ORDER BY commodity_name"
        };
        let rows = sqlx::query(sql).fetch_all(self.pool()).await?;
        rows.iter().map(mapping_from_row).collect()
    }

    /// Names of commodities that have a mapping row.
    pub async fn mapped_names(&self) -> Result<HashSet<String>, StoreError> {
        let names: Vec<String> =
            sqlx::query_scalar("SELECT commodity_name FROM commodity_price_mapping")
                .fetch_all(self.pool())
                .await?;
        Ok(names.into_iter().collect())
    }

    /// Commodities in `cot_data` with no mapping row, sorted.
    pub async fn unmapped_commodities(&self) -> Result<Vec<String>, StoreError> {
        let names = sqlx::query_scalar(
            "SELECT DISTINCT c.Commodity_Name FROM cot_data c \
             LEFT JOIN commodity_price_mapping m ON m.commodity_name = c.Commodity_Name \
             WHERE m.commodity_name IS NULL ORDER BY c.Commodity_Name",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(names)
    }
}
