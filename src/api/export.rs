use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::api::{parse_account_id, AccountQuery, AppState, HistoryQuery};
use crate::error::AppError;

fn csv_response(body: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body).into_response()
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, AppError> {
    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e.error())))
}

/// `asset,balance` rows, one per asset, in asset order.
pub async fn balances_csv(
    Query(params): Query<AccountQuery>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let account_id = parse_account_id(&params.account_id)?;
    let balances = state.reporting.ledger_balances(&account_id).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["asset", "balance"])?;
    for (asset, balance) in &balances {
        writer.write_record([asset.as_str(), balance.as_str()])?;
    }

    Ok(csv_response(finish(writer)?))
}

/// Stored snapshots, newest first.
pub async fn snapshots_csv(
    Query(params): Query<HistoryQuery>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let account_id = parse_account_id(&params.account_id)?;
    let limit = state.history_limit(params.limit);
    let records = state.reporting.history(&account_id, limit).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "timeMs",
        "realizedPnl",
        "unrealizedPnl",
        "totalValue",
    ])?;
    for record in &records {
        writer.write_record([
            record.id.to_string(),
            record.time_ms.as_ms().to_string(),
            record.snapshot.realized_pnl.clone(),
            record.snapshot.unrealized_pnl.clone(),
            record.snapshot.total_value.clone(),
        ])?;
    }

    Ok(csv_response(finish(writer)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_response_content_type() {
        let response = csv_response(b"a,b\n".to_vec());
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
    }
}
