//! Portfolio inputs to the snapshot calculator.

use crate::domain::ledger::{canonical_or_raw, hash_var, normalize_reference};
use crate::domain::{AccountId, DecimalInput, TimeMs};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Amount of one asset held in an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub asset: String,
    pub amount: DecimalInput,
}

impl Balance {
    pub fn new(asset: impl Into<String>, amount: impl Into<DecimalInput>) -> Self {
        Self {
            asset: asset.into(),
            amount: amount.into(),
        }
    }
}

/// An open holding of `symbol`, acquired at the volume-weighted `avg_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub account_id: AccountId,
    pub symbol: String,
    pub qty: DecimalInput,
    pub avg_price: DecimalInput,
}

impl Position {
    pub fn new(
        account_id: AccountId,
        symbol: impl Into<String>,
        qty: impl Into<DecimalInput>,
        avg_price: impl Into<DecimalInput>,
    ) -> Self {
        Self {
            account_id,
            symbol: symbol.into(),
            qty: qty.into(),
            avg_price: avg_price.into(),
        }
    }
}

/// Latest known market price for a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub symbol: String,
    pub price: DecimalInput,
    pub ts: TimeMs,
}

impl Tick {
    pub fn new(symbol: impl Into<String>, price: impl Into<DecimalInput>, ts: TimeMs) -> Self {
        Self {
            symbol: symbol.into(),
            price: price.into(),
            ts,
        }
    }
}

/// A closed trade with its realized profit or loss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeDetail {
    /// Stable unique identifier for this trade.
    pub trade_key: String,
    pub symbol: String,
    pub qty: DecimalInput,
    pub price: DecimalInput,
    pub realized: DecimalInput,
    pub time_ms: TimeMs,
}

impl TradeDetail {
    /// Create a TradeDetail; the key is `reference` when given, else a content hash.
    pub fn new(
        account_id: &AccountId,
        symbol: impl Into<String>,
        qty: impl Into<DecimalInput>,
        price: impl Into<DecimalInput>,
        realized: impl Into<DecimalInput>,
        time_ms: TimeMs,
        reference: Option<String>,
    ) -> Self {
        let symbol = symbol.into();
        let qty = qty.into();
        let price = price.into();
        let realized = realized.into();

        let trade_key = match normalize_reference(reference) {
            Some(r) => r,
            None => {
                let mut hasher = Sha256::new();
                hash_var(&mut hasher, account_id.as_str());
                hash_var(&mut hasher, &symbol);
                hash_var(&mut hasher, &canonical_or_raw(&qty));
                hash_var(&mut hasher, &canonical_or_raw(&price));
                hash_var(&mut hasher, &canonical_or_raw(&realized));
                hasher.update(time_ms.as_ms().to_le_bytes());
                format!("hash:{}", hex::encode(&hasher.finalize()[..16]))
            }
        };

        Self {
            trade_key,
            symbol,
            qty,
            price,
            realized,
            time_ms,
        }
    }
}

/// Cumulative realized PnL for one symbol, with the trades behind it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RealizedEntry {
    pub realized: DecimalInput,
    #[serde(default)]
    pub details: Vec<TradeDetail>,
}

impl RealizedEntry {
    pub fn new(realized: impl Into<DecimalInput>) -> Self {
        Self {
            realized: realized.into(),
            details: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_json_is_camel_case() {
        let position = Position::new(AccountId::new("a1".to_string()), "BTC", "1", "100");
        let json = serde_json::to_value(&position).unwrap();
        assert_eq!(json["accountId"], "a1");
        assert_eq!(json["avgPrice"], "100");
    }

    #[test]
    fn test_realized_entry_details_default_to_empty() {
        let entry: RealizedEntry = serde_json::from_str(r#"{"realized":"50"}"#).unwrap();
        assert_eq!(entry.realized, DecimalInput::from("50"));
        assert!(entry.details.is_empty());
    }

    #[test]
    fn test_trade_key_prefers_reference() {
        let account = AccountId::new("a1".to_string());
        let trade = TradeDetail::new(
            &account,
            "BTC",
            "1",
            "200",
            "100",
            TimeMs::new(5),
            Some("T-9".to_string()),
        );
        assert_eq!(trade.trade_key, "t-9");
    }

    #[test]
    fn test_trade_key_hash_is_canonical() {
        let account = AccountId::new("a1".to_string());
        let t1 = TradeDetail::new(&account, "BTC", "1.0", "200", "100", TimeMs::new(5), None);
        let t2 = TradeDetail::new(&account, "BTC", "1", "200.00", "100", TimeMs::new(5), None);
        assert_eq!(t1.trade_key, t2.trade_key);
        assert!(t1.trade_key.starts_with("hash:"));
    }
}
