//! Server-Sent Events plumbing for per-session subscriptions.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::watch;
use tokio_stream::{StreamExt, wrappers::WatchStream};
use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::session_store::VersionedSession, dto::session::SessionSummary, error::EngineError,
    state::SharedState,
};

/// Subscribe to one session's change feed at the store.
pub async fn subscribe_session(
    state: &SharedState,
    id: Uuid,
) -> Result<watch::Receiver<VersionedSession>, EngineError> {
    let store = state.require_session_store().await?;
    store
        .watch(id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("session `{id}`")))
}

/// Convert the watch feed into an SSE response.
///
/// The receiver is seeded with the current snapshot, so a client renders
/// immediately and then observes every committed write.
pub fn to_sse_stream(
    receiver: watch::Receiver<VersionedSession>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = WatchStream::new(receiver).filter_map(|versioned| {
        let summary = SessionSummary::from(versioned);
        match serde_json::to_string(&summary) {
            Ok(data) => Some(Ok(Event::default().event("session").data(data))),
            Err(err) => {
                warn!(error = %err, "failed to serialize session snapshot for SSE");
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
