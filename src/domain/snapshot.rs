//! Point-in-time valuation outputs.

use crate::domain::{AccountId, TimeMs};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Realized PnL, unrealized PnL and total value as fixed 10-dp decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PnlSnapshot {
    pub realized_pnl: String,
    pub unrealized_pnl: String,
    pub total_value: String,
}

/// A snapshot persisted for an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub id: Uuid,
    pub account_id: AccountId,
    pub time_ms: TimeMs,
    #[serde(flatten)]
    pub snapshot: PnlSnapshot,
}

impl SnapshotRecord {
    pub fn new(account_id: AccountId, time_ms: TimeMs, snapshot: PnlSnapshot) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            time_ms,
            snapshot,
        }
    }
}
