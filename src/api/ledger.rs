use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::{parse_account_id, AccountQuery, AppState};
use crate::domain::LedgerRow;
use crate::engine;
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancesResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    pub balances: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct ComputeBalancesRequest {
    #[serde(default)]
    pub rows: Vec<LedgerRow>,
}

pub async fn get_balances(
    Query(params): Query<AccountQuery>,
    State(state): State<AppState>,
) -> Result<Json<BalancesResponse>, AppError> {
    let account_id = parse_account_id(&params.account_id)?;
    let balances = state.reporting.ledger_balances(&account_id).await?;

    Ok(Json(BalancesResponse {
        account_id: Some(account_id.as_str().to_string()),
        balances,
    }))
}

/// Net balances of the posted rows; nothing is read or stored.
pub async fn compute_balances(
    Json(request): Json<ComputeBalancesRequest>,
) -> Result<Json<BalancesResponse>, AppError> {
    let balances =
        engine::compute_balances(&request.rows).map_err(AppError::from_request_data)?;

    Ok(Json(BalancesResponse {
        account_id: None,
        balances,
    }))
}
