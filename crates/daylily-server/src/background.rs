//! Background tasks for the Daylily server.
//!
//! Includes:
//! - Sweeping expired sessions out of the registry.

use daylily_session::SessionRegistry;
use tokio::time::{sleep, Duration};

/// Starts the session sweep task.
///
/// Lookups already evict the sessions they find expired; this task catches
/// the ones nobody asks about again, so `active_count` stays close to the
/// number of live sessions. Runs until the runtime shuts down.
pub async fn start_session_cleanup_task(sessions: SessionRegistry, interval_seconds: u64) {
    if interval_seconds == 0 {
        tracing::warn!("session cleanup task disabled (interval=0)");
        return;
    }

    let interval = Duration::from_secs(interval_seconds);
    tracing::info!(
        interval_seconds,
        timeout_seconds = sessions.timeout().as_secs(),
        "starting session cleanup task"
    );

    loop {
        sleep(interval).await;

        let removed = sessions.cleanup();
        if removed > 0 {
            tracing::info!(
                removed,
                remaining = sessions.active_count(),
                "swept expired sessions"
            );
        }
    }
}
