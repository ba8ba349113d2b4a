//! Background retention sweeper — evicts expired jobs and their artifacts.

use std::sync::Arc;

use tracing::{error, info};

use crate::state::AppState;

/// Start the periodic sweeper task.
pub fn start_retention_sweeper(state: Arc<AppState>) {
    let period = state.config.retention.sweep_interval;

    tokio::spawn(async move {
        info!(
            "Retention sweeper started (every {}s, ttl {}h)",
            period.as_secs(),
            state.config.retention.job_ttl.as_secs() / 3600
        );
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let sweep_state = state.clone();
            // Evictions are logged by the processor.
            if let Err(e) =
                tokio::task::spawn_blocking(move || sweep_state.processor.sweep_expired()).await
            {
                error!("Retention sweep failed: {}", e);
            }
        }
    });
}
