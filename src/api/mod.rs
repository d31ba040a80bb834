pub mod export;
pub mod health;
pub mod ingest;
pub mod ledger;
pub mod pnl;

use crate::config::{Config, MAX_HISTORY_LIMIT};
use crate::db::Repository;
use crate::domain::AccountId;
use crate::error::AppError;
use crate::reporting::ReportingService;
use axum::{
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Config,
    pub reporting: Arc<ReportingService>,
}

impl AppState {
    /// Build the state with a reporting service reading from `repo`.
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        let reporting = Arc::new(ReportingService::new(repo.clone()));
        Self {
            repo,
            config,
            reporting,
        }
    }

    /// History page size: the configured default when absent, clamped to
    /// `1..=MAX_HISTORY_LIMIT`.
    pub fn history_limit(&self, requested: Option<i64>) -> u32 {
        match requested {
            None => self.config.snapshot_history_limit,
            Some(n) => n.clamp(1, i64::from(MAX_HISTORY_LIMIT)) as u32,
        }
    }
}

/// Query string carrying only the account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountQuery {
    pub account_id: String,
}

/// Query string for paged snapshot history.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub account_id: String,
    pub limit: Option<i64>,
}

pub(crate) fn parse_account_id(input: &str) -> Result<AccountId, AppError> {
    AccountId::from_str(input).map_err(|e| AppError::BadRequest(format!("Invalid accountId: {}", e)))
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route(
            "/v1/ledger/balances",
            get(ledger::get_balances).post(ledger::compute_balances),
        )
        .route("/v1/ledger/entries", post(ingest::post_ledger_entries))
        .route("/v1/balances", put(ingest::put_balance))
        .route("/v1/positions", put(ingest::put_position))
        .route("/v1/ticks", post(ingest::post_ticks))
        .route("/v1/trades", post(ingest::post_trade))
        .route(
            "/v1/pnl/snapshot",
            get(pnl::get_snapshot).post(pnl::compute_snapshot),
        )
        .route(
            "/v1/pnl/snapshots",
            get(pnl::get_snapshot_history).post(pnl::record_snapshot),
        )
        .route("/v1/pnl/snapshots/:id", get(pnl::get_stored_snapshot))
        .route("/v1/export/balances.csv", get(export::balances_csv))
        .route("/v1/export/snapshots.csv", get(export::snapshots_csv))
        .layer(cors)
        .with_state(state)
}
