//! Data access seam between the reporting service and persistence.

use crate::db::Repository;
use crate::domain::{
    AccountId, Balance, LedgerRow, Position, SnapshotRecord, Tick, TradeDetail,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub mod mock;

pub use mock::MockPortfolioSource;

/// Source of the rows the engine consumes, and sink for computed snapshots.
///
/// Decimal fields are returned raw; implementations must not parse or
/// normalize them.
#[async_trait]
pub trait PortfolioSource: Send + Sync + fmt::Debug {
    /// Ledger postings for an account, in stored order.
    async fn ledger_rows(&self, account_id: &AccountId) -> Result<Vec<LedgerRow>, SourceError>;

    /// Held amounts per asset.
    async fn balances(&self, account_id: &AccountId) -> Result<Vec<Balance>, SourceError>;

    /// Open positions.
    async fn positions(&self, account_id: &AccountId) -> Result<Vec<Position>, SourceError>;

    /// Latest tick for each of `symbols` that has one.
    async fn latest_ticks(&self, symbols: &[String]) -> Result<HashMap<String, Tick>, SourceError>;

    /// Closed trades with their realized PnL.
    async fn realized_trades(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<TradeDetail>, SourceError>;

    /// Persist a computed snapshot.
    async fn save_snapshot(&self, record: &SnapshotRecord) -> Result<(), SourceError>;

    /// Stored snapshots, newest first, at most `limit`.
    async fn snapshot_history(
        &self,
        account_id: &AccountId,
        limit: u32,
    ) -> Result<Vec<SnapshotRecord>, SourceError>;

    /// A stored snapshot of `account_id` by id.
    async fn snapshot_by_id(
        &self,
        account_id: &AccountId,
        id: Uuid,
    ) -> Result<Option<SnapshotRecord>, SourceError>;
}

/// Error type for portfolio source operations.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
impl PortfolioSource for Repository {
    async fn ledger_rows(&self, account_id: &AccountId) -> Result<Vec<LedgerRow>, SourceError> {
        Ok(self.query_ledger_rows(account_id).await?)
    }

    async fn balances(&self, account_id: &AccountId) -> Result<Vec<Balance>, SourceError> {
        Ok(self.query_balances(account_id).await?)
    }

    async fn positions(&self, account_id: &AccountId) -> Result<Vec<Position>, SourceError> {
        Ok(self.query_positions(account_id).await?)
    }

    async fn latest_ticks(&self, symbols: &[String]) -> Result<HashMap<String, Tick>, SourceError> {
        Ok(self.query_latest_ticks(symbols).await?)
    }

    async fn realized_trades(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<TradeDetail>, SourceError> {
        Ok(self.query_realized_trades(account_id).await?)
    }

    async fn save_snapshot(&self, record: &SnapshotRecord) -> Result<(), SourceError> {
        Ok(self.insert_snapshot_record(record).await?)
    }

    async fn snapshot_history(
        &self,
        account_id: &AccountId,
        limit: u32,
    ) -> Result<Vec<SnapshotRecord>, SourceError> {
        Ok(self.query_snapshot_records(account_id, limit).await?)
    }

    async fn snapshot_by_id(
        &self,
        account_id: &AccountId,
        id: Uuid,
    ) -> Result<Option<SnapshotRecord>, SourceError> {
        Ok(self.query_snapshot_record(account_id, id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_display() {
        let err = SourceError::Unavailable("replica lagging".to_string());
        assert_eq!(err.to_string(), "source unavailable: replica lagging");

        let err = SourceError::from(sqlx::Error::RowNotFound);
        assert!(err.to_string().starts_with("database error"));
    }
}
