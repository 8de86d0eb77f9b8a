use std::sync::Arc;

use melody_studio_api::app::app;
use melody_studio_api::auth::LocalIdentityProvider;
use melody_studio_api::config;
use melody_studio_api::state::AppState;
use melody_studio_api::store;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("melody_studio_api=info,tower_http=info")),
        )
        .init();

    let config = config::config().clone();
    config.validate()?;
    tracing::info!("Starting MelodyStudio API in {:?} mode", config.environment);

    let store = store::connect(&config.store).await?;
    let identity = Arc::new(LocalIdentityProvider::new(store.clone(), &config.security));

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let state = AppState::new(store, identity, config);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("MelodyStudio API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
