//! Statistics - totals per transaction type over a window of days.
//!
//! Transactions are bucketed by their effective date: `tx_date` when the user
//! attributed the event to a day, otherwise the UTC date of `created_at`. The
//! window is pushed down to the database as two conditions (dated rows by
//! `tx_date`, undated rows by `created_at`) and summed there, one row per type.

use crate::{
    entities::{Transaction, TransactionType, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    Condition, QuerySelect,
    prelude::*,
    sea_query::{Alias, Expr},
};
use serde::Serialize;

/// Default window for range statistics, in days.
pub const DEFAULT_RANGE_DAYS: i64 = 7;

/// Totals per type and the number of transactions counted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Sum of expense amounts
    pub expense: i64,
    /// Sum of income amounts
    pub income: i64,
    /// Sum of debt amounts
    pub debt: i64,
    /// Number of transactions in the window
    pub count: u64,
}

impl Summary {
    /// Adds the aggregated `total` and `count` of one transaction type.
    pub fn add(&mut self, kind: TransactionType, total: i64, count: u64) {
        let sum = match kind {
            TransactionType::Expense => &mut self.expense,
            TransactionType::Income => &mut self.income,
            TransactionType::Debt => &mut self.debt,
        };
        *sum = sum.saturating_add(total);
        self.count += count;
    }
}

/// Totals for transactions whose effective date is `day`.
pub async fn summarize_day(
    db: &DatabaseConnection,
    telegram_id: i64,
    day: NaiveDate,
) -> Result<Summary> {
    summarize_window(db, telegram_id, day, day.succ_opt()).await
}

/// Totals for transactions whose effective date is `since` or later.
pub async fn summarize_since(
    db: &DatabaseConnection,
    telegram_id: i64,
    since: NaiveDate,
) -> Result<Summary> {
    summarize_window(db, telegram_id, since, None).await
}

/// First day of a `days`-long window that ends with `today`.
///
/// # Errors
/// Returns [`Error::ConstraintViolation`] if `days` is less than 1.
pub fn range_start(today: NaiveDate, days: i64) -> Result<NaiveDate> {
    let span = u64::try_from(days)
        .ok()
        .filter(|days| *days >= 1)
        .ok_or_else(|| Error::ConstraintViolation {
            message: format!("days must be >= 1, got {days}"),
        })?;

    today
        .checked_sub_days(Days::new(span - 1))
        .ok_or_else(|| Error::ConstraintViolation {
            message: format!("days out of range: {days}"),
        })
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// `from` is inclusive, `until` exclusive.
async fn summarize_window(
    db: &DatabaseConnection,
    telegram_id: i64,
    from: NaiveDate,
    until: Option<NaiveDate>,
) -> Result<Summary> {
    let mut dated = Condition::all().add(transaction::Column::TxDate.gte(from));
    let mut undated = Condition::all()
        .add(transaction::Column::TxDate.is_null())
        .add(transaction::Column::CreatedAt.gte(start_of_day(from)));
    if let Some(until) = until {
        dated = dated.add(transaction::Column::TxDate.lt(until));
        undated = undated.add(transaction::Column::CreatedAt.lt(start_of_day(until)));
    }

    // PostgreSQL widens SUM(bigint) to numeric
    let groups: Vec<(TransactionType, i64, i64)> = Transaction::find()
        .select_only()
        .column(transaction::Column::Kind)
        .column_as(
            Expr::col(transaction::Column::Amount)
                .sum()
                .cast_as(Alias::new("BIGINT")),
            "total",
        )
        .column_as(Expr::col(transaction::Column::Id).count(), "count")
        .filter(transaction::Column::TelegramId.eq(telegram_id))
        .filter(Condition::any().add(dated).add(undated))
        .group_by(transaction::Column::Kind)
        .into_tuple()
        .all(db)
        .await?;

    let mut summary = Summary::default();
    for (kind, total, count) in groups {
        summary.add(kind, total, u64::try_from(count).unwrap_or_default());
    }
    Ok(summary)
}
