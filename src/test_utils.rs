//! Shared test utilities for Hamyon.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::database,
    core::{
        transaction::{self, NewTransaction},
        user,
    },
    entities::{self, TransactionType},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly tracing subscriber once per process.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = database::create_connection("sqlite::memory:").await?;
    database::create_tables(&db).await?;
    Ok(db)
}

/// Sleeps long enough for consecutive inserts to get distinct `created_at` values.
pub async fn pause() {
    tokio::time::sleep(Duration::from_millis(2)).await;
}

/// Creates a test user with the default language.
pub async fn create_test_user(
    db: &DatabaseConnection,
    telegram_id: i64,
) -> Result<entities::user::Model> {
    user::create_user(db, telegram_id, None).await
}

/// Creates an undated test transaction with sensible defaults.
///
/// # Defaults
/// * `category_key`: `"food"` for expenses, `"salary"` for income, `"friends"` for debt
/// * `description`, `merchant`, `tx_date`: None
/// * `source`: column default (`"text"`)
pub async fn create_test_transaction(
    db: &DatabaseConnection,
    telegram_id: i64,
    kind: TransactionType,
    amount: i64,
) -> Result<entities::transaction::Model> {
    create_custom_transaction(db, telegram_id, kind, amount, None).await
}

/// Creates an expense attributed to `tx_date`.
pub async fn create_dated_transaction(
    db: &DatabaseConnection,
    telegram_id: i64,
    amount: i64,
    tx_date: NaiveDate,
) -> Result<entities::transaction::Model> {
    create_custom_transaction(db, telegram_id, TransactionType::Expense, amount, Some(tx_date))
        .await
}

/// Creates a test transaction with custom type and date.
pub async fn create_custom_transaction(
    db: &DatabaseConnection,
    telegram_id: i64,
    kind: TransactionType,
    amount: i64,
    tx_date: Option<NaiveDate>,
) -> Result<entities::transaction::Model> {
    let category_key = match kind {
        TransactionType::Expense => "food",
        TransactionType::Income => "salary",
        TransactionType::Debt => "friends",
    };

    transaction::create_transaction(
        db,
        NewTransaction {
            tx_date,
            ..NewTransaction::new(telegram_id, kind, amount, category_key)
        },
    )
    .await
}
