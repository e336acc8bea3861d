//! `commodity_prices`: daily bars stored per commodity.

use chrono::NaiveDate;
use cotlab_core::data::PriceBar;
use sqlx::Row;

use crate::db::{CotStore, DateRange, StoreError};

impl CotStore {
    /// Upsert bars keyed by (commodity, date). Refetching a range never duplicates rows.
    pub async fn save_prices(&self, commodity: &str, bars: &[PriceBar]) -> Result<usize, StoreError> {
        let mut tx = self.pool().begin().await?;
        for bar in bars {
            sqlx::query(
                r#"
                INSERT INTO commodity_prices (Commodity_Name, DATE, OPEN, HIGH, LOW, CLOSE, VOLUME)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(Commodity_Name, DATE) DO UPDATE SET
                    OPEN = excluded.OPEN,
                    HIGH = excluded.HIGH,
                    LOW = excluded.LOW,
                    CLOSE = excluded.CLOSE,
                    VOLUME = excluded.VOLUME
                "#,
            )
            .bind(commodity)
            .bind(bar.date)
            .bind(bar.open)
            .bind(bar.high)
            .bind(bar.low)
            .bind(bar.close)
            .bind(bar.volume)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        tracing::debug!(commodity, bars = bars.len(), "saved prices");
        Ok(bars.len())
    }

    /// Stored bars for a commodity in date order, optionally within an inclusive range.
    pub async fn prices_for(
        &self,
        commodity: &str,
        range: Option<DateRange>,
    ) -> Result<Vec<PriceBar>, StoreError> {
        let rows = match range {
            Some(r) => {
                sqlx::query(
                    "SELECT * FROM commodity_prices WHERE Commodity_Name = ? \
                     AND DATE BETWEEN ? AND ? ORDER BY DATE",
                )
                .bind(commodity)
                .bind(r.start)
                .bind(r.end)
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query("SELECT * FROM commodity_prices WHERE Commodity_Name = ? ORDER BY DATE")
                    .bind(commodity)
                    .fetch_all(self.pool())
                    .await?
            }
        };

        rows.iter()
            .map(|row| {
                Ok(PriceBar {
                    date: row.try_get::<NaiveDate, _>("DATE")?,
                    open: row.try_get("OPEN")?,
                    high: row.try_get("HIGH")?,
                    low: row.try_get("LOW")?,
                    close: row.try_get("CLOSE")?,
                    volume: row.try_get("VOLUME")?,
                })
            })
            .collect()
    }

    pub async fn has_prices(&self, commodity: &str) -> Result<bool, StoreError> {
        let n: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM commodity_prices WHERE Commodity_Name = ?")
                .bind(commodity)
                .fetch_one(self.pool())
                .await?;
        Ok(n > 0)
    }
}
