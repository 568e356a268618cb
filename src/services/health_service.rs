use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the session store and report whether the engine can take commands.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let reachable = match state.session_store().await {
        Some(store) => match store.health_check().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "session store failed its health probe");
                false
            }
        },
        None => {
            warn!("no session store installed; commands are rejected");
            false
        }
    };

    HealthResponse::new(state.is_degraded().await, reachable)
}
