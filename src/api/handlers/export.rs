use super::TelegramIdQuery;
use crate::{api::AppState, core::export, errors::Result};
use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};

/// Returns the user's transactions as a CSV document.
pub async fn csv(
    State(state): State<AppState>,
    Query(query): Query<TelegramIdQuery>,
) -> Result<impl IntoResponse> {
    let body =
        export::export_csv(&state.database, query.telegram_id, state.export_row_limit).await?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body))
}
