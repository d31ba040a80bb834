//! Property-style tests for the balance and snapshot calculators.
//!
//! Covers:
//! - Order independence of ledger rows and positions
//! - Output shape: exactly 10 fractional digits
//! - Fail-fast behavior on malformed decimals

use std::collections::HashMap;
use tradebot_ledger::domain::InvalidDecimal;
use tradebot_ledger::engine::{compute_balances, compute_snapshot, net_balances};
use tradebot_ledger::{AccountId, Balance, LedgerRow, Position, RealizedEntry, Tick, TimeMs};

fn is_fixed_10dp(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    match digits.split_once('.') {
        Some((int, frac)) => {
            !int.is_empty()
                && int.chars().all(|c| c.is_ascii_digit())
                && frac.len() == 10
                && frac.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Every ordering of `items`, generated by Heap's algorithm.
fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    fn heap<T: Clone>(k: usize, items: &mut Vec<T>, out: &mut Vec<Vec<T>>) {
        if k <= 1 {
            out.push(items.clone());
            return;
        }
        for i in 0..k {
            heap(k - 1, items, out);
            let j = if k % 2 == 0 { i } else { 0 };
            items.swap(j, k - 1);
        }
    }

    let mut items = items.to_vec();
    let mut out = Vec::new();
    let n = items.len();
    heap(n, &mut items, &mut out);
    out
}

fn account() -> AccountId {
    AccountId::new("acct-1".to_string())
}

#[test]
fn test_ledger_example() {
    let rows = vec![
        LedgerRow::new("USD", "0", "1000"),
        LedgerRow::new("BTC", "2", "0"),
        LedgerRow::new("USD", "50", "0"),
    ];
    let balances = compute_balances(&rows).unwrap();

    assert_eq!(balances.len(), 2);
    assert_eq!(balances["USD"], "-950.0000000000");
    assert_eq!(balances["BTC"], "2.0000000000");
}

#[test]
fn test_balances_are_order_independent() {
    let rows = vec![
        LedgerRow::new("USD", "0.1", "0"),
        LedgerRow::new("USD", "0.2", "0.05"),
        LedgerRow::new("ETH", "1.123456789012", "0"),
        LedgerRow::new("USD", "0", "0.3"),
        LedgerRow::new("ETH", "0", "0.000000000001"),
    ];
    let expected = compute_balances(&rows).unwrap();

    for ordering in permutations(&rows) {
        assert_eq!(compute_balances(&ordering).unwrap(), expected);
    }
    assert_eq!(expected["USD"], "-0.0500000000");
}

#[test]
fn test_balance_outputs_have_ten_fraction_digits() {
    let rows = vec![
        LedgerRow::new("A", "1", "0"),
        LedgerRow::new("B", "0", "12345.6789"),
        LedgerRow::new("C", "0.00000000005", "0"),
        LedgerRow::new("D", "1e3", "0"),
        LedgerRow::new("E", "0", "0"),
    ];
    for (asset, value) in compute_balances(&rows).unwrap() {
        assert!(is_fixed_10dp(&value), "{} -> {}", asset, value);
    }
}

#[test]
fn test_sums_are_exact_before_formatting() {
    // 0.1 + 0.2 - 0.3 must be exactly zero, not a float residue.
    let rows = vec![
        LedgerRow::new("USD", "0.1", "0"),
        LedgerRow::new("USD", "0.2", "0"),
        LedgerRow::new("USD", "0", "0.3"),
    ];
    let exact = net_balances(&rows).unwrap();
    assert!(exact["USD"].is_zero());
    assert_eq!(compute_balances(&rows).unwrap()["USD"], "0.0000000000");
}

#[test]
fn test_malformed_debit_fails_whole_computation() {
    let rows = vec![
        LedgerRow::new("USD", "10", "0"),
        LedgerRow::new("USD", "abc", "0"),
    ];
    let err = compute_balances(&rows).unwrap_err();

    assert_eq!(err.field, "debit");
    assert_eq!(err.key, "USD");
    assert_eq!(err.value, "abc");
    assert!(matches!(err.reason, InvalidDecimal::Rejected(_)));
}

#[test]
fn test_snapshot_example() {
    let mut ticks = HashMap::new();
    ticks.insert("BTC".to_string(), Tick::new("BTC", "200", TimeMs::new(1)));
    let mut realized = HashMap::new();
    realized.insert("BTC".to_string(), RealizedEntry::new("50"));

    let snapshot = compute_snapshot(
        &[Balance::new("USD", "1000")],
        &[Position::new(account(), "BTC", "1", "100")],
        &ticks,
        &realized,
    )
    .unwrap();

    assert_eq!(snapshot.realized_pnl, "50.0000000000");
    assert_eq!(snapshot.unrealized_pnl, "100.0000000000");
    assert_eq!(snapshot.total_value, "1200.0000000000");
}

#[test]
fn test_snapshot_is_position_order_independent() {
    let positions = vec![
        Position::new(account(), "BTC", "0.5", "30000"),
        Position::new(account(), "ETH", "-3", "2000.25"),
        Position::new(account(), "SOL", "12.5", "101.1"),
        Position::new(account(), "DOGE", "100", "0.1"),
    ];
    let mut ticks = HashMap::new();
    ticks.insert("BTC".to_string(), Tick::new("BTC", "31000.5", TimeMs::new(1)));
    ticks.insert("ETH".to_string(), Tick::new("ETH", "1999", TimeMs::new(1)));
    ticks.insert("SOL".to_string(), Tick::new("SOL", "99.99", TimeMs::new(1)));
    let balances = vec![Balance::new("USD", "250.5"), Balance::new("USDC", "-0.5")];

    let expected = compute_snapshot(&balances, &positions, &ticks, &HashMap::new()).unwrap();
    for ordering in permutations(&positions) {
        let snapshot = compute_snapshot(&balances, &ordering, &ticks, &HashMap::new()).unwrap();
        assert_eq!(snapshot, expected);
    }

    assert!(is_fixed_10dp(&expected.realized_pnl));
    assert!(is_fixed_10dp(&expected.unrealized_pnl));
    assert!(is_fixed_10dp(&expected.total_value));
}

#[test]
fn test_snapshot_malformed_balance_fails() {
    let err = compute_snapshot(
        &[Balance::new("USD", "1,000")],
        &[],
        &HashMap::new(),
        &HashMap::new(),
    )
    .unwrap_err();
    assert_eq!(err.field, "amount");
    assert_eq!(err.key, "USD");
}

#[test]
fn test_permutations_helper_covers_all_orderings() {
    assert_eq!(permutations(&[1, 2, 3, 4]).len(), 24);
}
