use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::board::{GlobalRankingEntry, SessionBoard},
    error::AppError,
    services::board_service,
    state::SharedState,
};

/// Read-only leaderboard routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/board/global", get(global_board))
        .route("/sessions/{id}/board", get(session_board))
}

/// Global ranking of all players by games won.
#[utoipa::path(
    get,
    path = "/board/global",
    tag = "board",
    responses(
        (status = 200, description = "Players ordered by games won", body = [GlobalRankingEntry])
    )
)]
pub async fn global_board(
    State(state): State<SharedState>,
) -> Result<Json<Vec<GlobalRankingEntry>>, AppError> {
    let board = board_service::global_board(&state).await?;
    Ok(Json(board))
}

/// Per-session ranking plus the annotated answer log.
#[utoipa::path(
    get,
    path = "/sessions/{id}/board",
    tag = "board",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session scoreboard and review log", body = SessionBoard),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn session_board(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionBoard>, AppError> {
    let board = board_service::session_board(&state, id).await?;
    Ok(Json(board))
}
