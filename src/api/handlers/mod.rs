//! Request handlers, one module per resource.

/// CSV export
pub mod export;
/// Liveness check
pub mod health;
/// Daily and rolling statistics
pub mod stats;
/// Transaction recording and listing
pub mod transactions;
/// Language preference
pub mod users;

use crate::errors::{Error, Result};
use serde::Deserialize;

/// Query string carrying only the user.
#[derive(Debug, Deserialize)]
pub struct TelegramIdQuery {
    /// Telegram id of the user
    pub telegram_id: i64,
}

/// Unwraps a field the client must send, reporting it as a not-null violation.
pub(crate) fn require<T>(value: Option<T>, column: &str) -> Result<T> {
    value.ok_or_else(|| Error::NotNullViolation {
        column: column.to_string(),
    })
}
