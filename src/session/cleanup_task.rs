use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, instrument};

use super::service::SessionService;

/// Configuration for the cleanup task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupConfig {
    /// How often to run the cleanup task
    pub cleanup_interval: Duration,
    /// How long a session must go untouched before it leaves memory
    pub idle_threshold: Duration,
    /// Also delete the stored snapshots of evicted sessions
    pub discard_snapshots: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(10 * 60), // 10 minutes
            idle_threshold: Duration::from_secs(6 * 60 * 60), // 6 hours
            discard_snapshots: false,
        }
    }
}

/// Starts the background task that periodically evicts idle sessions
#[instrument(skip(session_service))]
pub async fn start_cleanup_task(session_service: Arc<SessionService>, config: CleanupConfig) {
    info!(
        cleanup_interval_secs = config.cleanup_interval.as_secs(),
        idle_threshold_secs = config.idle_threshold.as_secs(),
        discard_snapshots = config.discard_snapshots,
        "Starting session cleanup background task"
    );

    let mut cleanup_interval = interval(config.cleanup_interval);

    loop {
        cleanup_interval.tick().await;
        cleanup_idle_sessions(&session_service, &config).await;
    }
}

/// Runs one eviction pass and returns how many sessions left memory
async fn cleanup_idle_sessions(session_service: &SessionService, config: &CleanupConfig) -> usize {
    let evicted = session_service
        .evict_idle(config.idle_threshold, config.discard_snapshots)
        .await;

    if evicted > 0 {
        let live = session_service.live_session_count().await;
        info!(
            evicted,
            live,
            "Session cleanup completed"
        );
    }
    evicted
}
