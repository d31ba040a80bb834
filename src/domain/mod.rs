//! Domain types for the ledger and PnL engine.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal and raw DecimalInput values
//! - Domain primitives: TimeMs, AccountId
//! - Ledger postings, portfolio inputs and snapshot outputs

pub mod decimal;
pub mod ledger;
pub mod portfolio;
pub mod primitives;
pub mod snapshot;

pub use decimal::{Decimal, DecimalInput, InvalidDecimal, ParseError, FIXED_SCALE};
pub use ledger::{LedgerEntry, LedgerRow};
pub use portfolio::{Balance, Position, RealizedEntry, Tick, TradeDetail};
pub use primitives::{AccountId, AccountIdParseError, TimeMs};
pub use snapshot::{PnlSnapshot, SnapshotRecord};
