//! In-memory portfolio source for testing without a database.

use super::{PortfolioSource, SourceError};
use crate::domain::{
    AccountId, Balance, LedgerRow, Position, SnapshotRecord, Tick, TradeDetail,
};
use crate::engine::latest_by_symbol;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Mock source that serves predefined rows and records saved snapshots.
#[derive(Debug, Default)]
pub struct MockPortfolioSource {
    ledger: HashMap<AccountId, Vec<LedgerRow>>,
    balances: HashMap<AccountId, Vec<Balance>>,
    positions: Vec<Position>,
    ticks: Vec<Tick>,
    trades: HashMap<AccountId, Vec<TradeDetail>>,
    snapshots: Mutex<Vec<SnapshotRecord>>,
    unavailable: Option<String>,
}

impl MockPortfolioSource {
    /// Create a new mock source with no data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a ledger row for an account.
    pub fn with_ledger_row(mut self, account_id: &AccountId, row: LedgerRow) -> Self {
        self.ledger.entry(account_id.clone()).or_default().push(row);
        self
    }

    /// Add a balance for an account.
    pub fn with_balance(mut self, account_id: &AccountId, balance: Balance) -> Self {
        self.balances
            .entry(account_id.clone())
            .or_default()
            .push(balance);
        self
    }

    /// Add an open position; its `account_id` scopes it.
    pub fn with_position(mut self, position: Position) -> Self {
        self.positions.push(position);
        self
    }

    /// Add a tick; only the latest per symbol is served.
    pub fn with_tick(mut self, tick: Tick) -> Self {
        self.ticks.push(tick);
        self
    }

    /// Add a closed trade for an account.
    pub fn with_trade(mut self, account_id: &AccountId, trade: TradeDetail) -> Self {
        self.trades.entry(account_id.clone()).or_default().push(trade);
        self
    }

    /// Make every call fail with [`SourceError::Unavailable`].
    pub fn unavailable(mut self, reason: &str) -> Self {
        self.unavailable = Some(reason.to_string());
        self
    }

    /// Snapshots saved so far, in save order.
    pub fn saved_snapshots(&self) -> Vec<SnapshotRecord> {
        self.snapshots
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    fn check(&self) -> Result<(), SourceError> {
        match &self.unavailable {
            Some(reason) => Err(SourceError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PortfolioSource for MockPortfolioSource {
    async fn ledger_rows(&self, account_id: &AccountId) -> Result<Vec<LedgerRow>, SourceError> {
        self.check()?;
        Ok(self.ledger.get(account_id).cloned().unwrap_or_default())
    }

    async fn balances(&self, account_id: &AccountId) -> Result<Vec<Balance>, SourceError> {
        self.check()?;
        Ok(self.balances.get(account_id).cloned().unwrap_or_default())
    }

    async fn positions(&self, account_id: &AccountId) -> Result<Vec<Position>, SourceError> {
        self.check()?;
        Ok(self
            .positions
            .iter()
            .filter(|p| &p.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn latest_ticks(&self, symbols: &[String]) -> Result<HashMap<String, Tick>, SourceError> {
        self.check()?;
        let mut latest = latest_by_symbol(self.ticks.iter().cloned());
        latest.retain(|symbol, _| symbols.contains(symbol));
        Ok(latest)
    }

    async fn realized_trades(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<TradeDetail>, SourceError> {
        self.check()?;
        Ok(self.trades.get(account_id).cloned().unwrap_or_default())
    }

    async fn save_snapshot(&self, record: &SnapshotRecord) -> Result<(), SourceError> {
        self.check()?;
        self.snapshots
            .lock()
            .map_err(|_| SourceError::Unavailable("snapshot store poisoned".to_string()))?
            .push(record.clone());
        Ok(())
    }

    async fn snapshot_history(
        &self,
        account_id: &AccountId,
        limit: u32,
    ) -> Result<Vec<SnapshotRecord>, SourceError> {
        self.check()?;
        let snapshots = self
            .snapshots
            .lock()
            .map_err(|_| SourceError::Unavailable("snapshot store poisoned".to_string()))?;
        Ok(snapshots
            .iter()
            .rev()
            .filter(|r| &r.account_id == account_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn snapshot_by_id(
        &self,
        account_id: &AccountId,
        id: Uuid,
    ) -> Result<Option<SnapshotRecord>, SourceError> {
        self.check()?;
        let snapshots = self
            .snapshots
            .lock()
            .map_err(|_| SourceError::Unavailable("snapshot store poisoned".to_string()))?;
        Ok(snapshots
            .iter()
            .find(|r| r.id == id && &r.account_id == account_id)
            .cloned())
    }
}
