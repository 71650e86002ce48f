use dotenvy::dotenv;
use hamyon::{
    api::{self, AppState},
    config::{database, settings},
    errors::Result,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env first so RUST_LOG and DATABASE_URL can live there
    dotenv().ok(); // Make it non-fatal, env vars can be set externally

    // 2. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 3. Load settings (config.toml, then environment overrides)
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;
    if settings.server.api_key.is_empty() {
        warn!("API_KEY is not set; the API accepts unauthenticated requests");
    }

    // 4. Connect and make sure the schema exists
    let db = database::create_connection(&settings.database.url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Serve
    let listener = TcpListener::bind(&settings.server.bind_address).await?;
    api::serve(listener, AppState::new(db, &settings)).await
}
