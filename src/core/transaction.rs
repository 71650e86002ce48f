//! Transaction business logic - recording and listing financial events.
//!
//! Transactions are append-only: this module inserts and reads them but never
//! updates or deletes. Validation mirrors the storage-level checks so that the
//! common mistakes are reported before a round trip; the database constraints
//! still guard every write. Listings follow the two indexes on `transactions`:
//! recency by `created_at` and attribution by `tx_date`.

use crate::{
    entities::{Transaction, TransactionType, transaction},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{NotSet, QueryOrder, QuerySelect, Set, prelude::*};
use tracing::{debug, instrument};

/// Everything needed to record one transaction.
///
/// `source` falls back to the column default (`"text"`) when `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewTransaction {
    /// Owner of the transaction
    pub telegram_id: i64,
    /// Expense, income or debt
    pub kind: TransactionType,
    /// Smallest currency unit; must not be negative
    pub amount: i64,
    /// Category code
    pub category_key: String,
    /// Free-text note
    pub description: Option<String>,
    /// Where the money went or came from
    pub merchant: Option<String>,
    /// Day the event is attributed to
    pub tx_date: Option<NaiveDate>,
    /// Capture channel
    pub source: Option<String>,
}

impl NewTransaction {
    /// Creates a transaction with the required fields and no optional ones.
    #[must_use]
    pub fn new(
        telegram_id: i64,
        kind: TransactionType,
        amount: i64,
        category_key: impl Into<String>,
    ) -> Self {
        Self {
            telegram_id,
            kind,
            amount,
            category_key: category_key.into(),
            ..Default::default()
        }
    }

    /// Checks the rules the schema enforces with `CHECK` constraints.
    ///
    /// # Errors
    /// Returns [`Error::ConstraintViolation`] if `amount` is negative.
    pub fn validate(&self) -> Result<()> {
        if self.amount < 0 {
            return Err(Error::ConstraintViolation {
                message: format!("amount must be >= 0, got {}", self.amount),
            });
        }
        Ok(())
    }
}

/// Records a transaction and returns the stored row.
///
/// The id is a fresh random UUID and `created_at` is the current time.
#[instrument(skip(db, new), fields(telegram_id = new.telegram_id, kind = %new.kind))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    new: NewTransaction,
) -> Result<transaction::Model> {
    new.validate()?;

    let model = transaction::ActiveModel {
        id: Set(Uuid::new_v4()),
        telegram_id: Set(new.telegram_id),
        kind: Set(new.kind),
        amount: Set(new.amount),
        category_key: Set(new.category_key),
        description: Set(new.description),
        merchant: Set(new.merchant),
        tx_date: Set(new.tx_date),
        source: new.source.map_or(NotSet, Set),
        created_at: Set(Utc::now()),
    };

    let created = model.insert(db).await?;
    debug!(id = %created.id, amount = created.amount, "Transaction recorded");
    Ok(created)
}

/// Retrieves a specific transaction by its id.
pub async fn get_transaction_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<transaction::Model>> {
    Transaction::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Lists a user's transactions, newest `created_at` first.
pub async fn list_recent_transactions(
    db: &DatabaseConnection,
    telegram_id: i64,
    limit: Option<u64>,
) -> Result<Vec<transaction::Model>> {
    let mut query = Transaction::find()
        .filter(transaction::Column::TelegramId.eq(telegram_id))
        .order_by_desc(transaction::Column::CreatedAt);
    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    query.all(db).await.map_err(Into::into)
}

/// Lists a user's dated transactions, newest `tx_date` first.
///
/// Rows without a `tx_date` are skipped. With `on_or_before` set, only rows
/// attributed to that day or earlier are returned.
pub async fn list_transactions_by_date(
    db: &DatabaseConnection,
    telegram_id: i64,
    on_or_before: Option<NaiveDate>,
    limit: Option<u64>,
) -> Result<Vec<transaction::Model>> {
    let mut query = Transaction::find()
        .filter(transaction::Column::TelegramId.eq(telegram_id))
        .filter(transaction::Column::TxDate.is_not_null());
    if let Some(day) = on_or_before {
        query = query.filter(transaction::Column::TxDate.lte(day));
    }
    query = query
        .order_by_desc(transaction::Column::TxDate)
        .order_by_desc(transaction::Column::CreatedAt);
    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    query.all(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_create_transaction_validation() -> Result<()> {
        // Rejected before any query reaches the database
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_transaction(
            &db,
            NewTransaction::new(1, TransactionType::Expense, -1, "food"),
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ConstraintViolation { .. }
        ));

        let result = create_transaction(
            &db,
            NewTransaction::new(1, TransactionType::Income, i64::MIN, "salary"),
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ConstraintViolation { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_zero_amount_is_accepted() -> Result<()> {
        let db = setup_test_db().await?;

        let transaction = create_test_transaction(&db, 1, TransactionType::Expense, 0).await?;
        assert_eq!(transaction.amount, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_type_rejected_debt_accepted() -> Result<()> {
        let db = setup_test_db().await?;

        assert!(matches!(
            "loan".parse::<TransactionType>(),
            Err(Error::ConstraintViolation { .. })
        ));

        let kind: TransactionType = "debt".parse()?;
        let transaction = create_test_transaction(&db, 1, kind, 500).await?;
        assert_eq!(transaction.kind, TransactionType::Debt);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_transaction_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let before = Utc::now();
        let transaction = create_transaction(
            &db,
            NewTransaction {
                description: Some("Lunch".to_string()),
                merchant: Some("Oqtepa Lavash".to_string()),
                tx_date: Some(date(2025, 5, 1)),
                source: Some("voice".to_string()),
                ..NewTransaction::new(77, TransactionType::Expense, 45_000, "food")
            },
        )
        .await?;
        let after = Utc::now();

        assert_eq!(transaction.telegram_id, 77);
        assert_eq!(transaction.amount, 45_000);
        assert_eq!(transaction.category_key, "food");
        assert_eq!(transaction.description.as_deref(), Some("Lunch"));
        assert_eq!(transaction.merchant.as_deref(), Some("Oqtepa Lavash"));
        assert_eq!(transaction.tx_date, Some(date(2025, 5, 1)));
        assert_eq!(transaction.source, "voice");
        assert!(transaction.created_at >= before);
        assert!(transaction.created_at <= after);

        // Verify persistence
        let retrieved = get_transaction_by_id(&db, transaction.id).await?.unwrap();
        assert_eq!(retrieved, transaction);

        Ok(())
    }

    #[tokio::test]
    async fn test_source_defaults_to_text() -> Result<()> {
        let db = setup_test_db().await?;

        let transaction = create_test_transaction(&db, 1, TransactionType::Income, 100).await?;
        assert_eq!(transaction.source, "text");

        let retrieved = get_transaction_by_id(&db, transaction.id).await?.unwrap();
        assert_eq!(retrieved.source, "text");

        Ok(())
    }

    #[tokio::test]
    async fn test_ids_are_unique() -> Result<()> {
        let db = setup_test_db().await?;

        let first = create_test_transaction(&db, 1, TransactionType::Expense, 10).await?;
        let second = create_test_transaction(&db, 1, TransactionType::Expense, 10).await?;
        assert_ne!(first.id, second.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_transactions_do_not_require_a_user_row() -> Result<()> {
        let db = setup_test_db().await?;

        // No user 999 exists; the relationship is not enforced
        create_test_transaction(&db, 999, TransactionType::Expense, 10).await?;
        assert!(
            crate::core::user::get_user_by_telegram_id(&db, 999)
                .await?
                .is_none()
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_get_transaction_by_id_not_found() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([Vec::<transaction::Model>::new()])
            .into_connection();

        let transaction = get_transaction_by_id(&db, Uuid::new_v4()).await?;
        assert!(transaction.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_list_recent_transactions_newest_first() -> Result<()> {
        let db = setup_test_db().await?;

        let t1 = create_test_transaction(&db, 10, TransactionType::Expense, 1).await?;
        pause().await;
        let t2 = create_test_transaction(&db, 10, TransactionType::Income, 2).await?;
        pause().await;
        let t3 = create_test_transaction(&db, 10, TransactionType::Debt, 3).await?;

        let listed = list_recent_transactions(&db, 10, None).await?;
        assert_eq!(listed, vec![t3.clone(), t2, t1]);

        let limited = list_recent_transactions(&db, 10, Some(1)).await?;
        assert_eq!(limited, vec![t3]);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_recent_transactions_per_user() -> Result<()> {
        let db = setup_test_db().await?;

        let mine = create_test_transaction(&db, 1, TransactionType::Expense, 50).await?;
        let theirs = create_test_transaction(&db, 2, TransactionType::Expense, 75).await?;

        assert_eq!(list_recent_transactions(&db, 1, None).await?, vec![mine]);
        assert_eq!(list_recent_transactions(&db, 2, None).await?, vec![theirs]);
        assert!(list_recent_transactions(&db, 3, None).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_list_transactions_by_date() -> Result<()> {
        let db = setup_test_db().await?;

        let march = create_dated_transaction(&db, 5, 100, date(2025, 3, 1)).await?;
        let april = create_dated_transaction(&db, 5, 200, date(2025, 4, 1)).await?;
        let may = create_dated_transaction(&db, 5, 300, date(2025, 5, 1)).await?;
        // Undated rows are not part of the date listing
        create_test_transaction(&db, 5, TransactionType::Expense, 400).await?;

        let all = list_transactions_by_date(&db, 5, None, None).await?;
        assert_eq!(all, vec![may, april.clone(), march.clone()]);

        let on_or_before = list_transactions_by_date(&db, 5, Some(date(2025, 4, 1)), None).await?;
        assert_eq!(on_or_before, vec![april.clone(), march]);

        let limited = list_transactions_by_date(&db, 5, Some(date(2025, 4, 30)), Some(1)).await?;
        assert_eq!(limited, vec![april]);

        Ok(())
    }
}
