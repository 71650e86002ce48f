//! Database configuration module for Hamyon.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! The schema is written out with `sea_query` statements rather than derived from
//! the entities, because it carries storage-level rules the entity derive cannot
//! express: `CHECK` constraints, column defaults and descending composite indexes.
//! Every statement uses `IF NOT EXISTS`, so `create_tables` is safe to run on each
//! startup against `SQLite` or `PostgreSQL`.

use crate::entities::{
    Transaction, TransactionColumn, TransactionType, User, UserColumn, transaction, user,
};
use crate::errors::Result;
use sea_orm::sea_query::{
    ColumnDef, Expr, Index, IndexCreateStatement, IndexOrder, SimpleExpr, Table, TableCreateStatement,
};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Database URL used when neither config.toml nor `DATABASE_URL` provide one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/hamyon.sqlite?mode=rwc";

/// `SQLite` default for `created_at`, in the same RFC 3339 shape the driver writes
/// for application timestamps so text comparisons and ordering stay consistent.
const SQLITE_NOW_RFC3339: &str = "(strftime('%Y-%m-%dT%H:%M:%f+00:00', 'now'))";

/// Index backing "most recent transactions for this user".
pub const IDX_TRANSACTIONS_TELEGRAM_CREATED: &str = "idx_transactions_telegram_created";
/// Index backing "transactions on or before a date for this user".
pub const IDX_TRANSACTIONS_TELEGRAM_TX_DATE: &str = "idx_transactions_telegram_tx_date";
/// Index backing user lookups by platform id.
pub const IDX_USERS_TELEGRAM_ID: &str = "idx_users_telegram_id";

/// Establishes a connection to the database at `database_url`.
///
/// For file-backed `SQLite` URLs the parent directory is created first.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(parent) = sqlite_file_path(database_url)
        .and_then(Path::parent)
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }

    debug!("Connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

/// File path of a `SQLite` URL, or `None` for other backends and in-memory databases.
fn sqlite_file_path(database_url: &str) -> Option<&Path> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();

    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(Path::new(path))
    }
}

fn now_default(backend: DbBackend) -> SimpleExpr {
    match backend {
        DbBackend::Sqlite => Expr::cust(SQLITE_NOW_RFC3339),
        _ => Expr::current_timestamp().into(),
    }
}

/// Creates both tables and all three indexes if they do not exist yet.
#[instrument(skip(db))]
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();

    db.execute(builder.build(&users_table(builder))).await?;
    db.execute(builder.build(&transactions_table(builder))).await?;

    for index in indexes() {
        db.execute(builder.build(&index)).await?;
    }

    info!("Database tables and indexes ensured");
    Ok(())
}

fn users_table(backend: DbBackend) -> TableCreateStatement {
    Table::create()
        .table(User)
        .if_not_exists()
        .col(
            ColumnDef::new(UserColumn::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(UserColumn::TelegramId)
                .big_integer()
                .not_null()
                .unique_key(),
        )
        .col(
            ColumnDef::new(UserColumn::Language)
                .string_len(8)
                .not_null()
                .default(user::DEFAULT_LANGUAGE),
        )
        .col(
            ColumnDef::new(UserColumn::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(now_default(backend)),
        )
        .to_owned()
}

fn transactions_table(backend: DbBackend) -> TableCreateStatement {
    let mut id = ColumnDef::new(TransactionColumn::Id);
    id.uuid().not_null().primary_key();
    // SQLite has no UUID generator; the application always supplies the id there.
    if backend == DbBackend::Postgres {
        id.default(Expr::cust("gen_random_uuid()"));
    }

    Table::create()
        .table(Transaction)
        .if_not_exists()
        .col(&mut id)
        .col(
            ColumnDef::new(TransactionColumn::TelegramId)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(TransactionColumn::Kind)
                .string_len(16)
                .not_null()
                .check(Expr::col(TransactionColumn::Kind).is_in(TransactionType::literals())),
        )
        .col(
            ColumnDef::new(TransactionColumn::Amount)
                .big_integer()
                .not_null()
                .check(Expr::col(TransactionColumn::Amount).gte(0)),
        )
        .col(
            ColumnDef::new(TransactionColumn::CategoryKey)
                .string_len(64)
                .not_null(),
        )
        .col(ColumnDef::new(TransactionColumn::Description).text().null())
        .col(ColumnDef::new(TransactionColumn::Merchant).text().null())
        .col(ColumnDef::new(TransactionColumn::TxDate).date().null())
        .col(
            ColumnDef::new(TransactionColumn::Source)
                .string_len(16)
                .not_null()
                .default(transaction::DEFAULT_SOURCE),
        )
        .col(
            ColumnDef::new(TransactionColumn::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(now_default(backend)),
        )
        .to_owned()
}

fn indexes() -> [IndexCreateStatement; 3] {
    [
        Index::create()
            .name(IDX_TRANSACTIONS_TELEGRAM_CREATED)
            .table(Transaction)
            .col(TransactionColumn::TelegramId)
            .col((TransactionColumn::CreatedAt, IndexOrder::Desc))
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name(IDX_TRANSACTIONS_TELEGRAM_TX_DATE)
            .table(Transaction)
            .col(TransactionColumn::TelegramId)
            .col((TransactionColumn::TxDate, IndexOrder::Desc))
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name(IDX_USERS_TELEGRAM_ID)
            .table(User)
            .col(UserColumn::TelegramId)
            .if_not_exists()
            .to_owned(),
    ]
}
