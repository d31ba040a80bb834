pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod reporting;
pub mod source;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    AccountId, Balance, Decimal, DecimalInput, LedgerEntry, LedgerRow, ParseError, PnlSnapshot,
    Position, RealizedEntry, SnapshotRecord, Tick, TimeMs, TradeDetail,
};
pub use engine::{compute_balances, compute_snapshot};
pub use error::AppError;
pub use reporting::{AccountSnapshot, ReportingError, ReportingService};
pub use source::{MockPortfolioSource, PortfolioSource, SourceError};
