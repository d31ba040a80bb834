//! Double-entry ledger postings.

use crate::domain::{AccountId, DecimalInput, TimeMs};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One debit/credit posting against an asset, as consumed by the balance calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub asset: String,
    pub debit: DecimalInput,
    pub credit: DecimalInput,
}

impl LedgerRow {
    pub fn new(
        asset: impl Into<String>,
        debit: impl Into<DecimalInput>,
        credit: impl Into<DecimalInput>,
    ) -> Self {
        Self {
            asset: asset.into(),
            debit: debit.into(),
            credit: credit.into(),
        }
    }
}

/// A stored ledger posting for an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Stable unique identifier for this posting.
    ///
    /// Priority: `reference` (if present) > hash of deterministic fields.
    pub entry_key: String,
    pub account_id: AccountId,
    pub asset: String,
    pub debit: DecimalInput,
    pub credit: DecimalInput,
    pub time_ms: TimeMs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl LedgerEntry {
    /// Create a new LedgerEntry and compute its `entry_key`.
    pub fn new(
        account_id: AccountId,
        asset: impl Into<String>,
        debit: impl Into<DecimalInput>,
        credit: impl Into<DecimalInput>,
        time_ms: TimeMs,
        reference: Option<String>,
    ) -> Self {
        let asset = asset.into();
        let debit = debit.into();
        let credit = credit.into();
        let reference = normalize_reference(reference);
        let entry_key = Self::compute_entry_key(
            &account_id,
            &asset,
            &debit,
            &credit,
            time_ms,
            reference.as_deref(),
        );
        Self {
            entry_key,
            account_id,
            asset,
            debit,
            credit,
            time_ms,
            reference,
        }
    }

    /// Compute a stable unique key for this posting.
    ///
    /// Without a reference the key is the first 128 bits of a SHA-256 over the
    /// length-prefixed fields, with decimals in canonical form.
    pub fn compute_entry_key(
        account_id: &AccountId,
        asset: &str,
        debit: &DecimalInput,
        credit: &DecimalInput,
        time_ms: TimeMs,
        reference: Option<&str>,
    ) -> String {
        if let Some(r) = reference.filter(|s| !s.trim().is_empty()) {
            return r.trim().to_lowercase();
        }

        let mut hasher = Sha256::new();
        hash_var(&mut hasher, account_id.as_str());
        hash_var(&mut hasher, asset);
        hash_var(&mut hasher, &canonical_or_raw(debit));
        hash_var(&mut hasher, &canonical_or_raw(credit));
        hasher.update(time_ms.as_ms().to_le_bytes());

        let hash = hasher.finalize();
        format!("hash:{}", hex::encode(&hash[..16]))
    }

    /// The posting as a calculator row.
    pub fn to_row(&self) -> LedgerRow {
        LedgerRow {
            asset: self.asset.clone(),
            debit: self.debit.clone(),
            credit: self.credit.clone(),
        }
    }
}

pub(crate) fn hash_var(hasher: &mut Sha256, data: &str) {
    hasher.update((data.len() as u32).to_le_bytes());
    hasher.update(data.as_bytes());
}

/// Canonical text of a decimal input, or the raw text when it does not parse.
pub(crate) fn canonical_or_raw(input: &DecimalInput) -> String {
    input
        .parse_field("key", "")
        .map(|d| d.to_canonical_string())
        .unwrap_or_else(|_| input.as_text())
}

pub(crate) fn normalize_reference(reference: Option<String>) -> Option<String> {
    reference
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> AccountId {
        AccountId::new("acct-1".to_string())
    }

    #[test]
    fn entry_key_prefers_reference() {
        let entry = LedgerEntry::new(
            account(),
            "USD",
            "0",
            "1000",
            TimeMs::new(1000),
            Some("  Deposit-42 ".to_string()),
        );
        assert_eq!(entry.entry_key, "deposit-42");
        assert_eq!(entry.reference.as_deref(), Some("deposit-42"));
    }

    #[test]
    fn entry_key_falls_back_to_canonical_hash() {
        let e1 = LedgerEntry::new(account(), "BTC", "1.50", "0", TimeMs::new(1000), None);
        let e2 = LedgerEntry::new(account(), "BTC", "1.5", 0i64, TimeMs::new(1000), None);
        assert_eq!(e1.entry_key, e2.entry_key);
        assert!(e1.entry_key.starts_with("hash:"));
    }

    #[test]
    fn entry_key_distinguishes_assets() {
        let e1 = LedgerEntry::new(account(), "BTC", "1", "0", TimeMs::new(1000), None);
        let e2 = LedgerEntry::new(account(), "ETH", "1", "0", TimeMs::new(1000), None);
        assert_ne!(e1.entry_key, e2.entry_key);
    }

    #[test]
    fn to_row_keeps_raw_values() {
        let entry = LedgerEntry::new(account(), "USD", "50.00", "0", TimeMs::new(1), None);
        let row = entry.to_row();
        assert_eq!(row, LedgerRow::new("USD", "50.00", "0"));
    }

    #[test]
    fn ledger_row_deserializes_mixed_inputs() {
        let row: LedgerRow =
            serde_json::from_str(r#"{"asset":"USD","debit":"0","credit":1000}"#).unwrap();
        assert_eq!(row.asset, "USD");
        assert_eq!(row.debit, DecimalInput::from("0"));
        assert_eq!(row.credit.as_text(), "1000");
    }
}
