//! API key guard shared by all protected routes.
//!
//! The bot sends the shared secret in `X-API-KEY`; older bot builds send it in
//! `X-API-SECRET`, so both headers are accepted, the former taking precedence.

use crate::{api::AppState, errors::Error};
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::warn;

/// Primary header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Fallback header accepted for older clients.
pub const API_SECRET_HEADER: &str = "x-api-secret";

/// Rejects the request with 401 unless it carries the configured key.
///
/// Does nothing when no key is configured.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Error> {
    if state.api_key.is_empty() {
        return Ok(next.run(request).await);
    }

    if provided_key(request.headers()) == Some(&*state.api_key) {
        Ok(next.run(request).await)
    } else {
        warn!(path = %request.uri().path(), "Rejected request with missing or invalid API key");
        Err(Error::Unauthorized)
    }
}

/// First non-empty key header, in precedence order.
fn provided_key(headers: &HeaderMap) -> Option<&str> {
    [API_KEY_HEADER, API_SECRET_HEADER]
        .into_iter()
        .filter_map(|name| headers.get(name))
        .filter_map(|value| value.to_str().ok())
        .find(|value| !value.is_empty())
}
