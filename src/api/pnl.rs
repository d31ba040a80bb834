use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::api::ingest::PositionInput;
use crate::api::{parse_account_id, AccountQuery, AppState, HistoryQuery};
use crate::domain::{
    AccountId, Balance, PnlSnapshot, Position, RealizedEntry, SnapshotRecord, Tick,
};
use crate::engine::valuate;
use crate::error::AppError;
use crate::reporting::AccountSnapshot;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeSnapshotRequest {
    #[serde(default)]
    pub balances: Vec<Balance>,
    #[serde(default)]
    pub positions: Vec<PositionInput>,
    #[serde(default)]
    pub latest_ticks: HashMap<String, Tick>,
    #[serde(default)]
    pub realized_by_symbol: HashMap<String, RealizedEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResponse {
    #[serde(flatten)]
    pub snapshot: PnlSnapshot,
    pub unmarked_symbols: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotHistoryResponse {
    pub account_id: String,
    pub snapshots: Vec<SnapshotRecord>,
}

pub async fn get_snapshot(
    Query(params): Query<AccountQuery>,
    State(state): State<AppState>,
) -> Result<Json<AccountSnapshot>, AppError> {
    let account_id = parse_account_id(&params.account_id)?;
    Ok(Json(state.reporting.snapshot(&account_id).await?))
}

/// Value the posted portfolio; nothing is read or stored.
pub async fn compute_snapshot(
    Json(request): Json<ComputeSnapshotRequest>,
) -> Result<Json<SnapshotResponse>, AppError> {
    let positions: Vec<Position> = request
        .positions
        .into_iter()
        .map(|p| Position::new(AccountId::new(String::new()), p.symbol, p.qty, p.avg_price))
        .collect();

    let valuation = valuate(
        &request.balances,
        &positions,
        &request.latest_ticks,
        &request.realized_by_symbol,
    )
    .map_err(AppError::from_request_data)?;

    Ok(Json(SnapshotResponse {
        snapshot: valuation.to_snapshot(),
        unmarked_symbols: valuation.unmarked_symbols,
    }))
}

pub async fn record_snapshot(
    Query(params): Query<AccountQuery>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SnapshotRecord>), AppError> {
    let account_id = parse_account_id(&params.account_id)?;
    let record = state.reporting.record_snapshot(&account_id).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_snapshot_history(
    Query(params): Query<HistoryQuery>,
    State(state): State<AppState>,
) -> Result<Json<SnapshotHistoryResponse>, AppError> {
    let account_id = parse_account_id(&params.account_id)?;
    let limit = state.history_limit(params.limit);
    let snapshots = state.reporting.history(&account_id, limit).await?;

    Ok(Json(SnapshotHistoryResponse {
        account_id: account_id.as_str().to_string(),
        snapshots,
    }))
}

pub async fn get_stored_snapshot(
    Path(id): Path<String>,
    Query(params): Query<AccountQuery>,
    State(state): State<AppState>,
) -> Result<Json<SnapshotRecord>, AppError> {
    let account_id = parse_account_id(&params.account_id)?;
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::BadRequest("Invalid snapshot id".to_string()))?;

    state
        .reporting
        .stored_snapshot(&account_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("snapshot {}", id)))
}
