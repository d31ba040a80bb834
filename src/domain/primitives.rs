//! Domain primitives: TimeMs, AccountId.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Time in milliseconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    /// Create a TimeMs from milliseconds.
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        TimeMs(chrono::Utc::now().timestamp_millis())
    }

    /// Get the underlying milliseconds value.
    pub fn as_ms(&self) -> i64 {
        self.0
    }
}

/// Maximum accepted length of an account identifier.
pub const MAX_ACCOUNT_ID_LEN: usize = 64;

/// Trading account identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountIdParseError {
    #[error("account id must not be empty")]
    Empty,
    #[error("account id longer than {MAX_ACCOUNT_ID_LEN} characters")]
    TooLong,
    #[error("account id contains invalid character {0:?}")]
    InvalidChar(char),
}

impl AccountId {
    /// Create an AccountId without validation.
    pub fn new(id: String) -> Self {
        AccountId(id)
    }

    /// Get the id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = AccountIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AccountIdParseError::Empty);
        }
        if trimmed.len() > MAX_ACCOUNT_ID_LEN {
            return Err(AccountIdParseError::TooLong);
        }
        if let Some(c) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')))
        {
            return Err(AccountIdParseError::InvalidChar(c));
        }
        Ok(AccountId(trimmed.to_string()))
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
