//! Reporting service: fetches rows from a [`PortfolioSource`], runs the
//! engine and persists snapshot records.

use crate::domain::{AccountId, ParseError, PnlSnapshot, SnapshotRecord, TimeMs};
use crate::engine::{aggregate_realized, compute_balances, valuate};
use crate::source::{PortfolioSource, SourceError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// A live valuation of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    pub account_id: AccountId,
    pub as_of: TimeMs,
    #[serde(flatten)]
    pub snapshot: PnlSnapshot,
    /// Symbols of positions valued at zero for lack of a tick.
    pub unmarked_symbols: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ReportingError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("stored data is malformed: {0}")]
    Parse(#[from] ParseError),
}

#[derive(Clone)]
pub struct ReportingService {
    source: Arc<dyn PortfolioSource>,
}

impl ReportingService {
    pub fn new(source: Arc<dyn PortfolioSource>) -> Self {
        Self { source }
    }

    /// Net ledger balance per asset for an account, as 10-dp strings.
    pub async fn ledger_balances(
        &self,
        account_id: &AccountId,
    ) -> Result<BTreeMap<String, String>, ReportingError> {
        let rows = self.source.ledger_rows(account_id).await?;
        debug!(account = %account_id, rows = rows.len(), "Computing ledger balances");
        Ok(compute_balances(&rows)?)
    }

    /// Value an account from its stored balances, positions, ticks and trades.
    ///
    /// The inputs are read concurrently and not from a single consistent read.
    pub async fn snapshot(&self, account_id: &AccountId) -> Result<AccountSnapshot, ReportingError> {
        let (balances, positions, trades) = futures::try_join!(
            self.source.balances(account_id),
            self.source.positions(account_id),
            self.source.realized_trades(account_id),
        )?;

        let symbols: Vec<String> = positions.iter().map(|p| p.symbol.clone()).collect();
        let latest_ticks = self.source.latest_ticks(&symbols).await?;
        let realized_by_symbol = aggregate_realized(&trades)?;

        let valuation = valuate(&balances, &positions, &latest_ticks, &realized_by_symbol)?;
        if !valuation.unmarked_symbols.is_empty() {
            warn!(
                account = %account_id,
                symbols = ?valuation.unmarked_symbols,
                "Positions without a tick valued at zero"
            );
        }

        Ok(AccountSnapshot {
            account_id: account_id.clone(),
            as_of: TimeMs::now(),
            snapshot: valuation.to_snapshot(),
            unmarked_symbols: valuation.unmarked_symbols,
        })
    }

    /// Compute a snapshot and persist it as a [`SnapshotRecord`].
    pub async fn record_snapshot(
        &self,
        account_id: &AccountId,
    ) -> Result<SnapshotRecord, ReportingError> {
        let live = self.snapshot(account_id).await?;
        let record = SnapshotRecord::new(live.account_id, live.as_of, live.snapshot);
        self.source.save_snapshot(&record).await?;
        debug!(account = %account_id, id = %record.id, "Snapshot recorded");
        Ok(record)
    }

    /// Stored snapshots, newest first.
    pub async fn history(
        &self,
        account_id: &AccountId,
        limit: u32,
    ) -> Result<Vec<SnapshotRecord>, ReportingError> {
        Ok(self.source.snapshot_history(account_id, limit).await?)
    }

    /// One stored snapshot of the account, if it exists.
    pub async fn stored_snapshot(
        &self,
        account_id: &AccountId,
        id: Uuid,
    ) -> Result<Option<SnapshotRecord>, ReportingError> {
        Ok(self.source.snapshot_by_id(account_id, id).await?)
    }
}

impl std::fmt::Debug for ReportingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportingService")
            .field("source", &self.source)
            .finish()
    }
}
