//! Write endpoints that load ledger postings and portfolio state.
//!
//! Decimal fields are validated here and then stored exactly as sent.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{parse_account_id, AccountQuery, AppState};
use crate::domain::{Balance, DecimalInput, LedgerEntry, Position, Tick, TimeMs, TradeDetail};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryInput {
    pub asset: String,
    #[serde(default)]
    pub debit: DecimalInput,
    #[serde(default)]
    pub credit: DecimalInput,
    pub time_ms: i64,
    pub reference: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LedgerEntriesRequest {
    pub entries: Vec<LedgerEntryInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub received: usize,
    pub inserted: usize,
}

/// A position as posted; the account comes from the query string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionInput {
    pub symbol: String,
    pub qty: DecimalInput,
    pub avg_price: DecimalInput,
}

#[derive(Debug, Deserialize)]
pub struct TicksRequest {
    pub ticks: Vec<Tick>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeInput {
    pub symbol: String,
    pub qty: DecimalInput,
    pub price: DecimalInput,
    pub realized: DecimalInput,
    pub time_ms: i64,
    pub reference: Option<String>,
}

fn validate(value: &DecimalInput, field: &'static str, key: &str) -> Result<(), AppError> {
    value
        .parse_field(field, key)
        .map(|_| ())
        .map_err(AppError::from_request_data)
}

fn require_name(value: &str, what: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} must not be empty", what)));
    }
    Ok(())
}

/// Store ledger postings; postings whose key already exists are skipped.
pub async fn post_ledger_entries(
    Query(params): Query<AccountQuery>,
    State(state): State<AppState>,
    Json(request): Json<LedgerEntriesRequest>,
) -> Result<(StatusCode, Json<IngestResponse>), AppError> {
    let account_id = parse_account_id(&params.account_id)?;

    let mut entries = Vec::with_capacity(request.entries.len());
    for input in request.entries {
        require_name(&input.asset, "asset")?;
        validate(&input.debit, "debit", &input.asset)?;
        validate(&input.credit, "credit", &input.asset)?;
        entries.push(LedgerEntry::new(
            account_id.clone(),
            input.asset,
            input.debit,
            input.credit,
            TimeMs::new(input.time_ms),
            input.reference,
        ));
    }

    let inserted = state.repo.insert_ledger_entries_batch(&entries).await?;
    info!(account = %account_id, received = entries.len(), inserted, "Ledger entries stored");

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            received: entries.len(),
            inserted,
        }),
    ))
}

pub async fn put_balance(
    Query(params): Query<AccountQuery>,
    State(state): State<AppState>,
    Json(balance): Json<Balance>,
) -> Result<StatusCode, AppError> {
    let account_id = parse_account_id(&params.account_id)?;
    require_name(&balance.asset, "asset")?;
    validate(&balance.amount, "amount", &balance.asset)?;

    state.repo.upsert_balance(&account_id, &balance).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Upsert a position; a zero quantity closes it.
pub async fn put_position(
    Query(params): Query<AccountQuery>,
    State(state): State<AppState>,
    Json(input): Json<PositionInput>,
) -> Result<StatusCode, AppError> {
    let account_id = parse_account_id(&params.account_id)?;
    require_name(&input.symbol, "symbol")?;
    let qty = input
        .qty
        .parse_field("qty", &input.symbol)
        .map_err(AppError::from_request_data)?;
    validate(&input.avg_price, "avgPrice", &input.symbol)?;

    if qty.is_zero() {
        state.repo.delete_position(&account_id, &input.symbol).await?;
    } else {
        let position = Position::new(account_id, input.symbol, input.qty, input.avg_price);
        state.repo.upsert_position(&position).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn post_ticks(
    State(state): State<AppState>,
    Json(request): Json<TicksRequest>,
) -> Result<(StatusCode, Json<IngestResponse>), AppError> {
    for tick in &request.ticks {
        require_name(&tick.symbol, "symbol")?;
        validate(&tick.price, "price", &tick.symbol)?;
    }
    let inserted = state.repo.insert_ticks_batch(&request.ticks).await?;
    info!(received = request.ticks.len(), inserted, "Ticks stored");

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            received: request.ticks.len(),
            inserted,
        }),
    ))
}

pub async fn post_trade(
    Query(params): Query<AccountQuery>,
    State(state): State<AppState>,
    Json(input): Json<TradeInput>,
) -> Result<(StatusCode, Json<IngestResponse>), AppError> {
    let account_id = parse_account_id(&params.account_id)?;
    require_name(&input.symbol, "symbol")?;
    validate(&input.qty, "qty", &input.symbol)?;
    validate(&input.price, "price", &input.symbol)?;
    validate(&input.realized, "realized", &input.symbol)?;

    let trade = TradeDetail::new(
        &account_id,
        input.symbol,
        input.qty,
        input.price,
        input.realized,
        TimeMs::new(input.time_ms),
        input.reference,
    );
    let inserted = state.repo.insert_realized_trade(&account_id, &trade).await?;

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            received: 1,
            inserted: usize::from(inserted),
        }),
    ))
}
