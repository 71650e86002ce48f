//! Transaction endpoints: the typed `/transactions` API and the loose legacy
//! `/sync/tx` payload older bot builds still send.

use super::require;
use crate::{
    api::AppState,
    core::transaction::{self, NewTransaction},
    entities::{TransactionType, transaction::Model},
    errors::Result,
};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};

/// Default page size for listings.
const DEFAULT_LIST_LIMIT: u64 = 20;

/// Body of `POST /transactions`
#[derive(Debug, Default, Deserialize)]
pub struct TransactionIn {
    /// Telegram id of the owner
    pub telegram_id: Option<i64>,
    /// Defaults to `expense`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Non-negative amount
    pub amount: Option<i64>,
    /// Category code
    pub category_key: Option<String>,
    /// Free-text note
    pub description: Option<String>,
    /// Shop or counterparty
    pub merchant: Option<String>,
    /// `YYYY-MM-DD`
    pub tx_date: Option<NaiveDate>,
    /// Defaults to `text`
    pub source: Option<String>,
}

impl TryFrom<TransactionIn> for NewTransaction {
    type Error = crate::errors::Error;

    fn try_from(payload: TransactionIn) -> Result<Self> {
        let kind = match payload.kind {
            Some(kind) => kind.parse()?,
            None => TransactionType::default(),
        };

        Ok(Self {
            telegram_id: require(payload.telegram_id, "telegram_id")?,
            kind,
            amount: require(payload.amount, "amount")?,
            category_key: require(payload.category_key, "category_key")?,
            description: payload.description,
            merchant: payload.merchant,
            tx_date: payload.tx_date,
            source: payload.source,
        })
    }
}

/// Body of `POST /sync/tx`. Every field is optional on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct LegacyTxIn {
    /// Owner id as old clients sent it; `0` means unknown
    pub user_id: Option<i64>,
    /// Owner id, used when `user_id` is missing or `0`
    pub telegram_id: Option<i64>,
    /// Defaults to `expense`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Non-negative amount
    pub amount: Option<i64>,
    /// Category code, preferred over `category_key` when non-empty
    pub category: Option<String>,
    /// Category code
    pub category_key: Option<String>,
    /// Defaults to `bot`
    pub source: Option<String>,
}

impl TryFrom<LegacyTxIn> for NewTransaction {
    type Error = crate::errors::Error;

    fn try_from(payload: LegacyTxIn) -> Result<Self> {
        // A zero id is how old clients signalled "unknown user"
        let owner = payload
            .user_id
            .filter(|id| *id != 0)
            .or(payload.telegram_id.filter(|id| *id != 0));
        let kind = match payload.kind {
            Some(kind) => kind.parse()?,
            None => TransactionType::default(),
        };
        let category_key = payload
            .category
            .filter(|category| !category.is_empty())
            .or(payload.category_key)
            .unwrap_or_else(|| "other".to_string());

        Ok(Self {
            telegram_id: require(owner, "telegram_id")?,
            kind,
            amount: require(payload.amount, "amount")?,
            category_key,
            source: Some(payload.source.unwrap_or_else(|| "bot".to_string())),
            ..Default::default()
        })
    }
}

/// Query of the listing endpoints
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Telegram id of the user
    pub telegram_id: i64,
    /// Page size; defaults to 20
    pub limit: Option<u64>,
    /// Only used by `/transactions/by-date`
    pub on_or_before: Option<NaiveDate>,
}

/// Records a transaction and returns its id.
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<TransactionIn>,
) -> Result<Json<Value>> {
    let created =
        transaction::create_transaction(&state.database, NewTransaction::try_from(payload)?)
            .await?;
    Ok(Json(json!({ "ok": true, "id": created.id.to_string() })))
}

/// Records a transaction from the legacy payload.
pub async fn create_legacy(
    State(state): State<AppState>,
    Json(payload): Json<LegacyTxIn>,
) -> Result<Json<Value>> {
    let created =
        transaction::create_transaction(&state.database, NewTransaction::try_from(payload)?)
            .await?;
    Ok(Json(json!({ "id": created.id.to_string() })))
}

/// Most recent transactions first.
pub async fn list_recent(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Model>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let transactions =
        transaction::list_recent_transactions(&state.database, query.telegram_id, Some(limit))
            .await?;
    Ok(Json(transactions))
}

/// Dated transactions, latest `tx_date` first.
pub async fn list_by_date(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Model>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let transactions = transaction::list_transactions_by_date(
        &state.database,
        query.telegram_id,
        query.on_or_before,
        Some(limit),
    )
    .await?;
    Ok(Json(transactions))
}
