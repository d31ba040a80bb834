//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by domain:
//! - `ledger.rs` - Ledger entry and balance operations
//! - `portfolio.rs` - Position, tick and realized trade operations
//! - `snapshots.rs` - Stored PnL snapshot records
//!
//! Decimal columns are stored as TEXT exactly as supplied and read back as
//! raw `DecimalInput` values; parsing happens in the engine.

mod ledger;
mod portfolio;
mod snapshots;

use crate::domain::DecimalInput;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository").finish_non_exhaustive()
    }
}

fn decimal_column(row: &SqliteRow, column: &str) -> DecimalInput {
    DecimalInput::Text(row.get::<String, _>(column))
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
