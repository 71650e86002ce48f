//! Statistics endpoints. "Today" is the current UTC date.

use super::TelegramIdQuery;
use crate::{
    api::AppState,
    core::stats::{self, DEFAULT_RANGE_DAYS, Summary},
    errors::Result,
};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Query of `GET /stats/range`
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    /// Telegram id of the user
    pub telegram_id: i64,
    /// Window length including today; defaults to 7
    pub days: Option<i64>,
}

/// Response of `GET /stats/range`
#[derive(Debug, Serialize)]
pub struct RangeSummary {
    #[serde(flatten)]
    pub summary: Summary,
    /// First day of the window
    pub since: NaiveDate,
}

/// Totals for today.
pub async fn today(
    State(state): State<AppState>,
    Query(query): Query<TelegramIdQuery>,
) -> Result<Json<Summary>> {
    let today = Utc::now().date_naive();
    let summary = stats::summarize_day(&state.database, query.telegram_id, today).await?;
    Ok(Json(summary))
}

/// Totals for the last `days` days, today included.
pub async fn range(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<RangeSummary>> {
    let days = query.days.unwrap_or(DEFAULT_RANGE_DAYS);
    let since = stats::range_start(Utc::now().date_naive(), days)?;
    let summary = stats::summarize_since(&state.database, query.telegram_id, since).await?;
    Ok(Json(RangeSummary { summary, since }))
}
