use crate::domain::Tick;
use std::collections::HashMap;

/// Reduce a tick stream to the latest tick per symbol.
///
/// A later `ts` wins; on equal `ts` the tick appearing later in the input wins.
pub fn latest_by_symbol<I>(ticks: I) -> HashMap<String, Tick>
where
    I: IntoIterator<Item = Tick>,
{
    let mut latest: HashMap<String, Tick> = HashMap::new();
    for tick in ticks {
        match latest.get(&tick.symbol) {
            Some(current) if current.ts > tick.ts => {}
            _ => {
                latest.insert(tick.symbol.clone(), tick);
            }
        }
    }
    latest
}
