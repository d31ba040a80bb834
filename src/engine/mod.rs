//! Pure computation engine for ledger balances and PnL snapshots.
//!
//! Every function here is synchronous and side-effect free: inputs in,
//! exact decimal results out, formatted only at the output boundary.
//! Arithmetic is checked: a total that leaves the decimal range fails the
//! call with [`InvalidDecimal::Overflow`] instead of panicking.

pub mod ledger_balance;
pub mod pnl_snapshot;
pub mod realized;
pub mod ticks;

pub use ledger_balance::{compute_balances, net_balances};
pub use pnl_snapshot::{compute_snapshot, valuate, Valuation};
pub use realized::aggregate_realized;
pub use ticks::latest_by_symbol;

use crate::domain::{DecimalInput, InvalidDecimal, ParseError};

/// Overflow while folding `input` (the `field` of `key`) into a total.
pub(crate) fn overflow(field: &'static str, key: &str, input: &DecimalInput) -> ParseError {
    ParseError {
        field,
        key: key.to_string(),
        value: input.as_text(),
        reason: InvalidDecimal::Overflow,
    }
}
