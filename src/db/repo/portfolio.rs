use super::{decimal_column, now_ms, Repository};
use crate::domain::{AccountId, Position, Tick, TimeMs, TradeDetail};
use sqlx::Row;
use std::collections::{BTreeSet, HashMap};

impl Repository {
    // =========================================================================
    // Position operations
    // =========================================================================

    /// Insert or replace an open position.
    ///
    /// # Errors
    /// Returns an error if the upsert fails.
    pub async fn upsert_position(&self, position: &Position) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO positions (account_id, symbol, qty, avg_price, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(account_id, symbol) DO UPDATE SET
                qty = excluded.qty,
                avg_price = excluded.avg_price,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(position.account_id.as_str())
        .bind(position.symbol.as_str())
        .bind(position.qty.as_text())
        .bind(position.avg_price.as_text())
        .bind(now_ms())
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Remove a closed position. Returns whether a row was deleted.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub async fn delete_position(
        &self,
        account_id: &AccountId,
        symbol: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM positions WHERE account_id = ? AND symbol = ?")
            .bind(account_id.as_str())
            .bind(symbol)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Open positions for an account ordered by symbol.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_positions(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<Position>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT account_id, symbol, qty, avg_price
            FROM positions
            WHERE account_id = ?
            ORDER BY symbol ASC
            "#,
        )
        .bind(account_id.as_str())
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| Position {
                account_id: AccountId::new(row.get("account_id")),
                symbol: row.get("symbol"),
                qty: decimal_column(row, "qty"),
                avg_price: decimal_column(row, "avg_price"),
            })
            .collect())
    }

    // =========================================================================
    // Tick operations
    // =========================================================================

    /// Append a market tick.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_tick(&self, tick: &Tick) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO ticks (symbol, price, time_ms) VALUES (?, ?, ?)")
            .bind(tick.symbol.as_str())
            .bind(tick.price.as_text())
            .bind(tick.ts.as_ms())
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Insert ticks in one transaction, returning the number of rows written.
    ///
    /// # Errors
    /// Returns an error if the transaction fails; nothing is inserted then.
    pub async fn insert_ticks_batch(&self, ticks: &[Tick]) -> Result<usize, sqlx::Error> {
        if ticks.is_empty() {
            return Ok(0);
        }

        let mut total_inserted = 0usize;
        let mut tx = self.pool().begin().await?;

        for tick in ticks {
            let result = sqlx::query("INSERT INTO ticks (symbol, price, time_ms) VALUES (?, ?, ?)")
                .bind(tick.symbol.as_str())
                .bind(tick.price.as_text())
                .bind(tick.ts.as_ms())
                .execute(&mut *tx)
                .await?;
            total_inserted += result.rows_affected() as usize;
        }

        tx.commit().await?;
        Ok(total_inserted)
    }

    /// Latest tick per requested symbol; symbols without ticks are absent.
    ///
    /// Latest means greatest `time_ms`, then most recently inserted.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_latest_ticks(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, Tick>, sqlx::Error> {
        let unique: Vec<&str> = symbols
            .iter()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if unique.is_empty() {
            return Ok(HashMap::new());
        }

        // SQLite has a 999 parameter limit; chunk to 500 for safety margin.
        const CHUNK_SIZE: usize = 500;
        let mut out: HashMap<String, Tick> = HashMap::with_capacity(unique.len());

        for chunk in unique.chunks(CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(",");
            let sql = format!(
                r#"
                SELECT t.symbol, t.price, t.time_ms
                FROM ticks t
                WHERE t.symbol IN ({})
                  AND t.id = (
                    SELECT t2.id FROM ticks t2
                    WHERE t2.symbol = t.symbol
                    ORDER BY t2.time_ms DESC, t2.id DESC
                    LIMIT 1
                  )
                "#,
                placeholders
            );

            let mut query = sqlx::query(&sql);
            for symbol in chunk {
                query = query.bind(*symbol);
            }

            for row in query.fetch_all(self.pool()).await? {
                let tick = Tick {
                    symbol: row.get("symbol"),
                    price: decimal_column(&row, "price"),
                    ts: TimeMs::new(row.get("time_ms")),
                };
                out.insert(tick.symbol.clone(), tick);
            }
        }

        Ok(out)
    }

    // =========================================================================
    // Realized trade operations
    // =========================================================================

    /// Insert a closed trade idempotently.
    ///
    /// Returns `false` when a trade with the same `trade_key` already exists.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_realized_trade(
        &self,
        account_id: &AccountId,
        trade: &TradeDetail,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO realized_trades (account_id, symbol, qty, price, realized, time_ms, trade_key)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(account_id, trade_key) DO NOTHING
            "#,
        )
        .bind(account_id.as_str())
        .bind(trade.symbol.as_str())
        .bind(trade.qty.as_text())
        .bind(trade.price.as_text())
        .bind(trade.realized.as_text())
        .bind(trade.time_ms.as_ms())
        .bind(trade.trade_key.as_str())
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Closed trades for an account ordered by (time_ms, insertion).
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_realized_trades(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<TradeDetail>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT symbol, qty, price, realized, time_ms, trade_key
            FROM realized_trades
            WHERE account_id = ?
            ORDER BY time_ms ASC, id ASC
            "#,
        )
        .bind(account_id.as_str())
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| TradeDetail {
                trade_key: row.get("trade_key"),
                symbol: row.get("symbol"),
                qty: decimal_column(row, "qty"),
                price: decimal_column(row, "price"),
                realized: decimal_column(row, "realized"),
                time_ms: TimeMs::new(row.get("time_ms")),
            })
            .collect())
    }
}
