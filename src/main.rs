use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ultiscore::{
    config::{AppConfig, DEFAULT_LOG_FILTER},
    routes,
    session::{
        repository::{FileSnapshotStore, InMemorySnapshotStore, SnapshotStore},
        start_cleanup_task,
    },
    AppState,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    info!(?config, "Starting Ulti score keeper");

    let snapshot_store: Arc<dyn SnapshotStore> = match &config.snapshot_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "Persisting sessions to disk");
            Arc::new(FileSnapshotStore::new(dir.clone()))
        }
        None => {
            info!("Keeping sessions in memory only");
            Arc::new(InMemorySnapshotStore::new())
        }
    };

    let state = AppState::new(snapshot_store);
    tokio::spawn(start_cleanup_task(
        state.session_service.clone(),
        config.cleanup(),
    ));

    let app = routes::app(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
