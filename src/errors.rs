//! Unified error types for Hamyon.
//!
//! Storage failures are classified into the constraint taxonomy the schema
//! declares (uniqueness, check, not-null) so callers can react to them without
//! inspecting driver messages. The HTTP layer renders every variant as a JSON
//! body with a matching status code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A second row tried to claim a unique value (e.g. `users.telegram_id`).
    #[error("Uniqueness violation on {column}")]
    UniquenessViolation {
        /// Column (or constraint description) that was violated
        column: String,
    },

    /// A check constraint or domain rule rejected the write.
    #[error("Constraint violation: {message}")]
    ConstraintViolation {
        /// What was rejected
        message: String,
    },

    /// A required field was omitted.
    #[error("Missing required field: {column}")]
    NotNullViolation {
        /// The missing column
        column: String,
    },

    /// Missing or wrong API key.
    #[error("Unauthorized")]
    Unauthorized,

    /// Configuration could not be loaded.
    #[error("Configuration error: {message}")]
    Config {
        /// Error details
        message: String,
    },

    /// Any other storage failure.
    #[error("Database error: {0}")]
    Database(DbErr),

    /// CSV serialization failure during export.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O failure (config file, socket binding).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return Self::UniquenessViolation { column: detail };
        }

        let message = err.to_string();
        // SQLite: "CHECK constraint failed: ...", PostgreSQL: "violates check constraint"
        if message.contains("CHECK constraint failed") || message.contains("violates check constraint")
        {
            return Self::ConstraintViolation { message };
        }
        if let Some(column) = not_null_column(&message) {
            return Self::NotNullViolation { column };
        }

        Self::Database(err)
    }
}

/// Extracts the column name from a backend not-null failure message.
fn not_null_column(message: &str) -> Option<String> {
    // SQLite: "NOT NULL constraint failed: users.telegram_id"
    if let Some((_, rest)) = message.split_once("NOT NULL constraint failed: ") {
        let qualified = rest.split_whitespace().next().unwrap_or(rest);
        let column = qualified.rsplit('.').next().unwrap_or(qualified);
        return Some(column.trim_matches(|c: char| !c.is_alphanumeric() && c != '_').to_string());
    }
    // PostgreSQL: null value in column "amount" ... violates not-null constraint
    if message.contains("violates not-null constraint") {
        let column = message
            .split('"')
            .nth(1)
            .map_or_else(|| "unknown".to_string(), ToString::to_string);
        return Some(column);
    }
    None
}

impl Error {
    /// HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::UniquenessViolation { .. } => StatusCode::CONFLICT,
            Self::ConstraintViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotNullViolation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Config { .. } | Self::Database(_) | Self::Csv(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_check_failure_is_constraint_violation() {
        let err = DbErr::Exec(sea_orm::RuntimeErr::Internal(
            "CHECK constraint failed: amount >= 0".to_string(),
        ));
        assert!(matches!(Error::from(err), Error::ConstraintViolation { .. }));
    }

    #[test]
    fn test_sqlite_not_null_failure_names_column() {
        let err = DbErr::Exec(sea_orm::RuntimeErr::Internal(
            "NOT NULL constraint failed: transactions.category_key".to_string(),
        ));
        match Error::from(err) {
            Error::NotNullViolation { column } => assert_eq!(column, "category_key"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_postgres_not_null_failure_names_column() {
        let column = not_null_column(
            "null value in column \"amount\" of relation \"transactions\" violates not-null constraint",
        );
        assert_eq!(column.as_deref(), Some("amount"));
    }

    #[test]
    fn test_other_errors_stay_database_errors() {
        let err = DbErr::Custom("connection reset".to_string());
        assert!(matches!(Error::from(err), Error::Database(_)));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::UniquenessViolation { column: "telegram_id".to_string() }.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::ConstraintViolation { message: "amount".to_string() }.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            Error::NotNullViolation { column: "amount".to_string() }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    }
}
