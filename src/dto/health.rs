use serde::Serialize;
use utoipa::ToSchema;

/// Overall service condition reported by `/healthcheck`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// A session store is installed and commands are accepted.
    Ok,
    /// Commands are rejected until the session store comes back.
    Degraded,
}

/// Connectivity report returned by the health route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall condition.
    pub status: HealthStatus,
    /// Whether the session store answered its latest probe.
    pub session_store_reachable: bool,
}

impl HealthResponse {
    /// Build the report from the degraded flag and the probe outcome.
    pub fn new(degraded: bool, session_store_reachable: bool) -> Self {
        let status = if degraded {
            HealthStatus::Degraded
        } else {
            HealthStatus::Ok
        };
        Self {
            status,
            session_store_reachable,
        }
    }
}
