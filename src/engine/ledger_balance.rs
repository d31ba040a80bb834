use super::overflow;
use crate::domain::{Decimal, LedgerRow, ParseError};
use std::collections::BTreeMap;

/// Net `debit - credit` per asset, exact.
///
/// Rows are folded in input order. Assets are keyed case-sensitively and start
/// at zero. Debit and credit signs are not validated.
///
/// # Errors
/// Returns [`ParseError`] on the first row whose debit or credit is not a
/// valid decimal, or whose posting pushes the asset's balance out of range;
/// no partial result is produced.
pub fn net_balances(rows: &[LedgerRow]) -> Result<BTreeMap<String, Decimal>, ParseError> {
    let mut balances: BTreeMap<String, Decimal> = BTreeMap::new();

    for row in rows {
        let debit = row.debit.parse_field("debit", &row.asset)?;
        let credit = row.credit.parse_field("credit", &row.asset)?;

        let acc = balances.entry(row.asset.clone()).or_insert_with(Decimal::zero);
        *acc = acc
            .checked_add(debit)
            .ok_or_else(|| overflow("debit", &row.asset, &row.debit))?
            .checked_sub(credit)
            .ok_or_else(|| overflow("credit", &row.asset, &row.credit))?;
    }

    Ok(balances)
}

/// Net balances per asset, each formatted with exactly 10 fractional digits.
///
/// # Errors
/// Returns [`ParseError`] when any debit or credit is malformed.
pub fn compute_balances(rows: &[LedgerRow]) -> Result<BTreeMap<String, String>, ParseError> {
    Ok(net_balances(rows)?
        .into_iter()
        .map(|(asset, balance)| (asset, balance.to_fixed_string()))
        .collect())
}
