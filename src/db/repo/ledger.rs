use super::{decimal_column, now_ms, Repository};
use crate::domain::{AccountId, Balance, LedgerEntry, LedgerRow, TimeMs};
use sqlx::Row;

impl Repository {
    // =========================================================================
    // Ledger entry operations
    // =========================================================================

    /// Insert a ledger entry idempotently.
    ///
    /// Returns `false` when an entry with the same `entry_key` already exists.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_ledger_entry(&self, entry: &LedgerEntry) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO ledger_entries (account_id, asset, debit, credit, time_ms, reference, entry_key)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(account_id, entry_key) DO NOTHING
            "#,
        )
        .bind(entry.account_id.as_str())
        .bind(entry.asset.as_str())
        .bind(entry.debit.as_text())
        .bind(entry.credit.as_text())
        .bind(entry.time_ms.as_ms())
        .bind(entry.reference.as_deref())
        .bind(entry.entry_key.as_str())
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert multiple ledger entries in a single transaction.
    ///
    /// Returns the number of newly inserted entries (excludes duplicates).
    ///
    /// # Errors
    /// Returns an error if the transaction fails; nothing is inserted then.
    pub async fn insert_ledger_entries_batch(
        &self,
        entries: &[LedgerEntry],
    ) -> Result<usize, sqlx::Error> {
        if entries.is_empty() {
            return Ok(0);
        }

        let mut total_inserted = 0usize;
        let mut tx = self.pool().begin().await?;

        for entry in entries {
            let result = sqlx::query(
                r#"
                INSERT INTO ledger_entries (account_id, asset, debit, credit, time_ms, reference, entry_key)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(account_id, entry_key) DO NOTHING
                "#,
            )
            .bind(entry.account_id.as_str())
            .bind(entry.asset.as_str())
            .bind(entry.debit.as_text())
            .bind(entry.credit.as_text())
            .bind(entry.time_ms.as_ms())
            .bind(entry.reference.as_deref())
            .bind(entry.entry_key.as_str())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                total_inserted += 1;
            }
        }

        tx.commit().await?;
        Ok(total_inserted)
    }

    /// Ledger entries for an account in insertion order.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_ledger_entries(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<LedgerEntry>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT account_id, asset, debit, credit, time_ms, reference, entry_key
            FROM ledger_entries
            WHERE account_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(account_id.as_str())
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| LedgerEntry {
                entry_key: row.get("entry_key"),
                account_id: AccountId::new(row.get("account_id")),
                asset: row.get("asset"),
                debit: decimal_column(row, "debit"),
                credit: decimal_column(row, "credit"),
                time_ms: TimeMs::new(row.get("time_ms")),
                reference: row.get("reference"),
            })
            .collect())
    }

    /// Ledger rows for an account in insertion order, ready for the balance calculator.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_ledger_rows(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<LedgerRow>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT asset, debit, credit
            FROM ledger_entries
            WHERE account_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(account_id.as_str())
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| LedgerRow {
                asset: row.get("asset"),
                debit: decimal_column(row, "debit"),
                credit: decimal_column(row, "credit"),
            })
            .collect())
    }

    // =========================================================================
    // Balance operations
    // =========================================================================

    /// Insert or replace the held amount of an asset.
    ///
    /// # Errors
    /// Returns an error if the upsert fails.
    pub async fn upsert_balance(
        &self,
        account_id: &AccountId,
        balance: &Balance,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO balances (account_id, asset, amount, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(account_id, asset) DO UPDATE SET
                amount = excluded.amount,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(account_id.as_str())
        .bind(balance.asset.as_str())
        .bind(balance.amount.as_text())
        .bind(now_ms())
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Balances for an account ordered by asset.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_balances(&self, account_id: &AccountId) -> Result<Vec<Balance>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT asset, amount FROM balances WHERE account_id = ? ORDER BY asset ASC",
        )
        .bind(account_id.as_str())
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| Balance {
                asset: row.get("asset"),
                amount: decimal_column(row, "amount"),
            })
            .collect())
    }
}
