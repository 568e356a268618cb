use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{services::documentation::ApiDoc, state::SharedState};

/// Leaderboard routes.
pub mod board;
/// Health check routes.
pub mod health;
/// Session lifecycle routes.
pub mod session;
/// Server-sent event streams.
pub mod sse;

/// Compose all route trees, wiring in shared state and the Swagger UI.
pub fn router(state: SharedState) -> Router<()> {
    let swagger: Router<SharedState> = SwaggerUi::new("/docs")
        .url("/api-doc/openapi.json", ApiDoc::openapi())
        .into();

    health::router()
        .merge(sse::router())
        .merge(session::router())
        .merge(board::router())
        .merge(swagger)
        .with_state(state)
}
