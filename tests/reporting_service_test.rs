//! Reporting service behavior over the in-memory portfolio source.

use std::sync::Arc;
use tradebot_ledger::{
    AccountId, Balance, LedgerRow, MockPortfolioSource, Position, ReportingError,
    ReportingService, SourceError, Tick, TimeMs, TradeDetail,
};

fn account() -> AccountId {
    AccountId::new("acct-1".to_string())
}

fn trade(symbol: &str, realized: &str, time_ms: i64) -> TradeDetail {
    TradeDetail::new(&account(), symbol, "1", "100", realized, TimeMs::new(time_ms), None)
}

fn populated_source() -> MockPortfolioSource {
    MockPortfolioSource::new()
        .with_ledger_row(&account(), LedgerRow::new("USD", "0", "1000"))
        .with_ledger_row(&account(), LedgerRow::new("BTC", "2", "0"))
        .with_ledger_row(&account(), LedgerRow::new("USD", "50", "0"))
        .with_balance(&account(), Balance::new("USD", "1000"))
        .with_position(Position::new(account(), "BTC", "1", "100"))
        .with_tick(Tick::new("BTC", "150", TimeMs::new(1)))
        .with_tick(Tick::new("BTC", "200", TimeMs::new(2)))
        .with_trade(&account(), trade("BTC", "30", 1))
        .with_trade(&account(), trade("BTC", "20", 2))
}

#[tokio::test]
async fn test_ledger_balances_from_source() {
    let service = ReportingService::new(Arc::new(populated_source()));
    let balances = service.ledger_balances(&account()).await.unwrap();

    assert_eq!(balances["USD"], "-950.0000000000");
    assert_eq!(balances["BTC"], "2.0000000000");
}

#[tokio::test]
async fn test_snapshot_uses_latest_tick_and_summed_trades() {
    let service = ReportingService::new(Arc::new(populated_source()));
    let live = service.snapshot(&account()).await.unwrap();

    assert_eq!(live.account_id, account());
    assert_eq!(live.snapshot.realized_pnl, "50.0000000000");
    assert_eq!(live.snapshot.unrealized_pnl, "100.0000000000");
    assert_eq!(live.snapshot.total_value, "1200.0000000000");
    assert!(live.unmarked_symbols.is_empty());
}

#[tokio::test]
async fn test_snapshot_reports_unmarked_positions() {
    let source = MockPortfolioSource::new()
        .with_balance(&account(), Balance::new("USD", "10"))
        .with_position(Position::new(account(), "DOGE", "1000", "0.1"));
    let service = ReportingService::new(Arc::new(source));

    let live = service.snapshot(&account()).await.unwrap();
    assert_eq!(live.snapshot.unrealized_pnl, "0.0000000000");
    assert_eq!(live.snapshot.total_value, "10.0000000000");
    assert_eq!(live.unmarked_symbols, vec!["DOGE".to_string()]);
}

#[tokio::test]
async fn test_snapshot_of_unknown_account_is_zero() {
    let service = ReportingService::new(Arc::new(populated_source()));
    let live = service
        .snapshot(&AccountId::new("nobody".to_string()))
        .await
        .unwrap();

    assert_eq!(live.snapshot.realized_pnl, "0.0000000000");
    assert_eq!(live.snapshot.total_value, "0.0000000000");
}

#[tokio::test]
async fn test_malformed_stored_value_is_parse_error() {
    let source = MockPortfolioSource::new().with_balance(&account(), Balance::new("USD", "abc"));
    let service = ReportingService::new(Arc::new(source));

    let err = service.snapshot(&account()).await.unwrap_err();
    match err {
        ReportingError::Parse(parse) => {
            assert_eq!(parse.field, "amount");
            assert_eq!(parse.key, "USD");
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unavailable_source_is_source_error() {
    let service = ReportingService::new(Arc::new(MockPortfolioSource::new().unavailable("down")));
    let err = service.ledger_balances(&account()).await.unwrap_err();
    assert!(matches!(
        err,
        ReportingError::Source(SourceError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_record_snapshot_persists_and_pages_history() {
    let source = Arc::new(populated_source());
    let service = ReportingService::new(source.clone());

    let first = service.record_snapshot(&account()).await.unwrap();
    let second = service.record_snapshot(&account()).await.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(first.snapshot.total_value, "1200.0000000000");
    assert_eq!(source.saved_snapshots().len(), 2);

    let history = service.history(&account(), 1).await.unwrap();
    assert_eq!(history, vec![second.clone()]);

    let stored = service.stored_snapshot(&account(), first.id).await.unwrap();
    assert_eq!(stored, Some(first));
}
