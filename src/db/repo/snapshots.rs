use super::Repository;
use crate::domain::{AccountId, PnlSnapshot, SnapshotRecord, TimeMs};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

impl Repository {
    /// Persist a computed snapshot.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_snapshot_record(&self, record: &SnapshotRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO pnl_snapshots (id, account_id, time_ms, realized_pnl, unrealized_pnl, total_value)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.account_id.as_str())
        .bind(record.time_ms.as_ms())
        .bind(record.snapshot.realized_pnl.as_str())
        .bind(record.snapshot.unrealized_pnl.as_str())
        .bind(record.snapshot.total_value.as_str())
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Stored snapshots for an account, newest first, at most `limit`.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored id is not a UUID.
    pub async fn query_snapshot_records(
        &self,
        account_id: &AccountId,
        limit: u32,
    ) -> Result<Vec<SnapshotRecord>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, account_id, time_ms, realized_pnl, unrealized_pnl, total_value
            FROM pnl_snapshots
            WHERE account_id = ?
            ORDER BY time_ms DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(account_id.as_str())
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(snapshot_from_row).collect()
    }

    /// A stored snapshot of `account_id` by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_snapshot_record(
        &self,
        account_id: &AccountId,
        id: Uuid,
    ) -> Result<Option<SnapshotRecord>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, account_id, time_ms, realized_pnl, unrealized_pnl, total_value
            FROM pnl_snapshots
            WHERE id = ? AND account_id = ?
            "#,
        )
        .bind(id.to_string())
        .bind(account_id.as_str())
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(snapshot_from_row).transpose()
    }
}

fn snapshot_from_row(row: &SqliteRow) -> Result<SnapshotRecord, sqlx::Error> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    Ok(SnapshotRecord {
        id,
        account_id: AccountId::new(row.get("account_id")),
        time_ms: TimeMs::new(row.get("time_ms")),
        snapshot: PnlSnapshot {
            realized_pnl: row.get("realized_pnl"),
            unrealized_pnl: row.get("unrealized_pnl"),
            total_value: row.get("total_value"),
        },
    })
}
