//! Language preference endpoints.

use super::{TelegramIdQuery, require};
use crate::{
    api::AppState,
    core::user::{self, Language},
    errors::Result,
};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Body of `POST /users/lang`
#[derive(Debug, Deserialize)]
pub struct LanguageIn {
    /// Telegram id of the user
    pub telegram_id: Option<i64>,
    /// One of `uz`, `ru`, `en`
    pub language: Option<String>,
}

/// Stores the user's language, creating the user on first contact.
pub async fn set_language(
    State(state): State<AppState>,
    Json(payload): Json<LanguageIn>,
) -> Result<Json<Value>> {
    let telegram_id = require(payload.telegram_id, "telegram_id")?;
    let language: Language = require(payload.language, "language")?.parse()?;

    user::set_user_language(&state.database, telegram_id, language).await?;
    Ok(Json(json!({ "ok": true, "language": language })))
}

/// Returns the stored language, `uz` for unknown users.
pub async fn get_language(
    State(state): State<AppState>,
    Query(query): Query<TelegramIdQuery>,
) -> Result<Json<Value>> {
    let language = user::get_user_language(&state.database, query.telegram_id).await?;
    Ok(Json(json!({ "language": language })))
}
