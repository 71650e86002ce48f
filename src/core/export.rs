//! CSV export of a user's transactions, newest first.

use crate::{
    core::transaction::list_recent_transactions,
    entities::transaction,
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use tracing::instrument;

/// Header row of every export.
pub const CSV_HEADER: [&str; 8] = [
    "created_at",
    "type",
    "amount",
    "category",
    "description",
    "merchant",
    "date",
    "source",
];

/// Exports up to `limit` of the user's most recent transactions as CSV bytes.
#[instrument(skip(db))]
pub async fn export_csv(db: &DatabaseConnection, telegram_id: i64, limit: u64) -> Result<Vec<u8>> {
    let transactions = list_recent_transactions(db, telegram_id, Some(limit)).await?;
    tracing::debug!(rows = transactions.len(), "Exporting transactions");
    render_csv(&transactions)
}

/// Writes the header and one record per transaction.
///
/// Optional text fields become empty cells; `date` is the effective date.
pub fn render_csv(transactions: &[transaction::Model]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for tx in transactions {
        writer.write_record([
            tx.created_at.to_rfc3339(),
            tx.kind.to_string(),
            tx.amount.to_string(),
            tx.category_key.clone(),
            tx.description.clone().unwrap_or_default(),
            tx.merchant.clone().unwrap_or_default(),
            tx.effective_date().to_string(),
            tx.source.clone(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))
}
