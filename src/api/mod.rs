//! API layer - HTTP interface used by the Telegram bot.
//!
//! This module wires the core operations into an axum router, guards it with the
//! shared API key and holds the state every handler needs.

/// API key guard
pub mod auth;
/// Request handlers grouped by resource
pub mod handlers;

use crate::{config::settings::Settings, errors::Result};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared data available to all handlers.
/// Cloned per request; clones share one connection handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection for all database operations
    pub database: Arc<DatabaseConnection>,
    /// Shared secret expected from the bot; empty disables the check
    pub api_key: Arc<str>,
    /// Maximum rows per CSV export
    pub export_row_limit: u64,
}

impl AppState {
    /// Creates the handler state from a connection and loaded settings.
    #[must_use]
    pub fn new(database: DatabaseConnection, settings: &Settings) -> Self {
        Self {
            database: Arc::new(database),
            api_key: Arc::from(settings.server.api_key.as_str()),
            export_row_limit: settings.export.row_limit,
        }
    }
}

/// Builds the router. `/health` is public; everything else requires the API key.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/users/lang",
            get(handlers::users::get_language).post(handlers::users::set_language),
        )
        .route(
            "/transactions",
            get(handlers::transactions::list_recent).post(handlers::transactions::create),
        )
        .route(
            "/transactions/by-date",
            get(handlers::transactions::list_by_date),
        )
        .route("/sync/tx", post(handlers::transactions::create_legacy))
        .route("/stats/today", get(handlers::stats::today))
        .route("/stats/range", get(handlers::stats::range))
        .route("/export/csv", get(handlers::export::csv))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .route("/health", get(handlers::health::health))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Serves the API on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
