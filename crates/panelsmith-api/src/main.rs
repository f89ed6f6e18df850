//! Panelsmith API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use panelsmith_api::config::ServerConfig;
use panelsmith_api::error::AppError;
use panelsmith_api::routes;
use panelsmith_api::state::AppState;
use panelsmith_core::clock::SystemClock;
use panelsmith_core::repository::EpisodeRepository;
use panelsmith_production::domain::workflow::PermissiveTransitions;
use panelsmith_store::memory_episode_repository::InMemoryEpisodeRepository;
use panelsmith_store::pg_episode_repository::PgEpisodeRepository;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

async fn episode_repository(
    config: &ServerConfig,
) -> Result<Arc<dyn EpisodeRepository>, AppError> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set; episodes are kept in memory and lost on restart");
        return Ok(Arc::new(InMemoryEpisodeRepository::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(database_url)
        .await?;
    let repository = PgEpisodeRepository::new(pool);
    repository.ensure_schema().await?;
    Ok(Arc::new(repository))
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Panelsmith API server");

    let config = ServerConfig::from_env()?;
    let gazetteer = config.load_gazetteer().await?;
    tracing::info!(
        characters = gazetteer.characters.len(),
        locations = gazetteer.locations.len(),
        props = gazetteer.props.len(),
        "gazetteer loaded"
    );

    // Build application state.
    let app_state = AppState::new(
        Arc::new(SystemClock),
        episode_repository(&config).await?,
        Arc::new(gazetteer),
        Arc::new(PermissiveTransitions),
    );

    // Build router.
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/breakdowns", routes::breakdowns::router())
        .nest("/api/v1/episodes", routes::episodes::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
