use super::overflow;
use crate::domain::{Balance, Decimal, ParseError, PnlSnapshot, Position, RealizedEntry, Tick};
use std::collections::{BTreeMap, HashMap};

/// Exact valuation accumulators, before formatting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Valuation {
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
    pub total_value: Decimal,
    /// Symbols of positions that had no tick and were valued at zero, in
    /// position order without duplicates.
    pub unmarked_symbols: Vec<String>,
}

impl Valuation {
    /// Format every accumulator with exactly 10 fractional digits.
    pub fn to_snapshot(&self) -> PnlSnapshot {
        PnlSnapshot {
            realized_pnl: self.realized_pnl.to_fixed_string(),
            unrealized_pnl: self.unrealized_pnl.to_fixed_string(),
            total_value: self.total_value.to_fixed_string(),
        }
    }
}

/// Value a portfolio: realized PnL, unrealized PnL and total value.
///
/// - realized: sum of `realized` over every entry of `realized_by_symbol`
/// - unrealized: `(tick.price - avg_price) * qty` per position with a tick
/// - total value: every balance amount plus `tick.price * qty` per position
///   with a tick
///
/// A position whose symbol has no tick contributes zero to both unrealized
/// PnL and total value and is reported in [`Valuation::unmarked_symbols`].
/// Ticks are looked up by map key. Trade details are not read.
///
/// Ticks are parsed first, then realized entries (both in symbol order), then
/// positions and balances in input order.
///
/// # Errors
/// Returns [`ParseError`] when any balance amount, position qty or average
/// price, tick price or realized amount is not a valid decimal, whether or
/// not the value would have contributed to a total. A sum or product that
/// leaves the decimal range fails with [`crate::domain::InvalidDecimal::Overflow`].
pub fn valuate(
    balances: &[Balance],
    positions: &[Position],
    latest_ticks: &HashMap<String, Tick>,
    realized_by_symbol: &HashMap<String, RealizedEntry>,
) -> Result<Valuation, ParseError> {
    // Sorted so the first malformed value reported does not depend on hashing.
    let mut marks: BTreeMap<&str, Decimal> = BTreeMap::new();
    for (symbol, tick) in latest_ticks.iter().collect::<BTreeMap<_, _>>() {
        marks.insert(symbol.as_str(), tick.price.parse_field("price", symbol)?);
    }

    let mut realized_pnl = Decimal::zero();
    for (symbol, entry) in realized_by_symbol.iter().collect::<BTreeMap<_, _>>() {
        let realized = entry.realized.parse_field("realized", symbol)?;
        realized_pnl = realized_pnl
            .checked_add(realized)
            .ok_or_else(|| overflow("realized", symbol, &entry.realized))?;
    }

    let mut unrealized_pnl = Decimal::zero();
    let mut market_value = Decimal::zero();
    let mut unmarked_symbols: Vec<String> = Vec::new();
    for position in positions {
        let qty = position.qty.parse_field("qty", &position.symbol)?;
        let avg_price = position.avg_price.parse_field("avgPrice", &position.symbol)?;

        match marks.get(position.symbol.as_str()) {
            Some(&price) => {
                let qty_overflow = || overflow("qty", &position.symbol, &position.qty);
                let gain = price
                    .checked_sub(avg_price)
                    .ok_or_else(|| overflow("avgPrice", &position.symbol, &position.avg_price))?
                    .checked_mul(qty)
                    .ok_or_else(qty_overflow)?;
                unrealized_pnl = unrealized_pnl.checked_add(gain).ok_or_else(qty_overflow)?;
                let value = price.checked_mul(qty).ok_or_else(qty_overflow)?;
                market_value = market_value.checked_add(value).ok_or_else(qty_overflow)?;
            }
            None => {
                if !unmarked_symbols.contains(&position.symbol) {
                    unmarked_symbols.push(position.symbol.clone());
                }
            }
        }
    }

    let mut total_value = market_value;
    for balance in balances {
        let amount = balance.amount.parse_field("amount", &balance.asset)?;
        total_value = total_value
            .checked_add(amount)
            .ok_or_else(|| overflow("amount", &balance.asset, &balance.amount))?;
    }

    Ok(Valuation {
        realized_pnl,
        unrealized_pnl,
        total_value,
        unmarked_symbols,
    })
}

/// Compute a [`PnlSnapshot`] with every field formatted to 10 fractional digits.
///
/// # Errors
/// Returns [`ParseError`] when any decimal-bearing input is malformed.
pub fn compute_snapshot(
    balances: &[Balance],
    positions: &[Position],
    latest_ticks: &HashMap<String, Tick>,
    realized_by_symbol: &HashMap<String, RealizedEntry>,
) -> Result<PnlSnapshot, ParseError> {
    valuate(balances, positions, latest_ticks, realized_by_symbol).map(|v| v.to_snapshot())
}
