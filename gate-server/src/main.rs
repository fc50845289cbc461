use tracing::info;
use tracing_subscriber::EnvFilter;

use gate_server::config::ServerConfig;
use gate_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gate_server=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let store = config.build_store()?;
    match &config.mock_data {
        Some(path) => info!(path = ?path, "serving from fixture data"),
        None => info!(
            url = config.store_url.as_deref().unwrap_or("default"),
            "using remote store"
        ),
    }

    let state = AppState::new(
        store,
        &config.cache,
        &config.sessions,
        config.discovery.clone(),
    );
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "gate server listening");
    info!("endpoints: GET /health, PUT|GET /profiles/:user_id, POST /scan, GET /browse/:user_id, POST /browse/:user_id/next|prev");

    axum::serve(listener, app).await?;
    Ok(())
}
