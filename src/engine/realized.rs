use super::overflow;
use crate::domain::{Decimal, ParseError, RealizedEntry, TradeDetail};
use std::collections::HashMap;

/// Group closed trades by symbol into [`RealizedEntry`] values.
///
/// Each entry's `realized` is the exact sum over its trades; `details` keeps
/// the trades in input order.
///
/// # Errors
/// Returns [`ParseError`] when a trade's realized amount is malformed or a
/// symbol's total leaves the decimal range.
pub fn aggregate_realized(
    trades: &[TradeDetail],
) -> Result<HashMap<String, RealizedEntry>, ParseError> {
    let mut totals: HashMap<String, (Decimal, Vec<TradeDetail>)> = HashMap::new();

    for trade in trades {
        let realized = trade.realized.parse_field("realized", &trade.symbol)?;
        let (sum, details) = totals
            .entry(trade.symbol.clone())
            .or_insert_with(|| (Decimal::zero(), Vec::new()));
        *sum = sum
            .checked_add(realized)
            .ok_or_else(|| overflow("realized", &trade.symbol, &trade.realized))?;
        details.push(trade.clone());
    }

    Ok(totals
        .into_iter()
        .map(|(symbol, (sum, details))| {
            (
                symbol,
                RealizedEntry {
                    realized: sum.into(),
                    details,
                },
            )
        })
        .collect())
}
