mod configuration;
mod error;
mod routes;
mod state;

use std::path::Path;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local development keeps its settings in .env; deployments use the real environment
    if Path::new(".env").exists() {
        dotenv::dotenv()?;
    }

    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let settings = configuration::Settings::new()?;
    if settings.project_connection_string.is_none() {
        tracing::warn!("PROJECT_CONNECTION_STRING is not set, agent requests will fall back");
    }

    let state = state::AppState::new(&settings);

    // Create router with CORS support
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(settings.server.socket_addr()?).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
