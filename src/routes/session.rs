use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::session::{
        AnswerOutcome, CreateSessionRequest, LifelineOutcome, LifelineRequest, QuestionSummary,
        RollupSummary, SelectQuestionRequest, SessionSummary, SubmitAnswerRequest, TopicGroup,
    },
    error::AppError,
    model::{Language, LifelineKind},
    services::{board_service, rollup_service, session_service},
    state::SharedState,
};

/// Routes driving the session lifecycle and turn commands.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}/questions", get(available_questions))
        .route("/sessions/{id}/select", post(select_question))
        .route("/sessions/{id}/answer", post(submit_answer))
        .route(
            "/sessions/{id}/lifelines/external-help",
            post(use_external_help),
        )
        .route(
            "/sessions/{id}/lifelines/fifty-fifty",
            post(use_fifty_fifty),
        )
        .route("/sessions/{id}/lifelines/switch", post(use_switch))
        .route("/sessions/{id}/rollup", post(run_rollup))
        .route("/questions", get(list_bank_questions))
}

/// Create a new session from an ordered player list and a question pick.
#[utoipa::path(
    post,
    path = "/sessions",
    tag = "session",
    request_body = CreateSessionRequest,
    responses(
        (status = 200, description = "Session created", body = SessionSummary),
        (status = 400, description = "Invalid creation input")
    )
)]
pub async fn create_session(
    State(state): State<SharedState>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<Json<SessionSummary>, AppError> {
    payload.validate()?;
    let summary = session_service::create_session(&state, payload).await?;
    Ok(Json(summary))
}

/// Fetch a versioned snapshot of one session.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Current session state", body = SessionSummary),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, AppError> {
    let summary = session_service::get_session(&state, id).await?;
    Ok(Json(summary))
}

/// Unanswered questions grouped by topic, ascending difficulty per group.
#[utoipa::path(
    get,
    path = "/sessions/{id}/questions",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Available questions for the selecting view", body = [TopicGroup])
    )
)]
pub async fn available_questions(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TopicGroup>>, AppError> {
    let groups = board_service::available_questions(&state, id).await?;
    Ok(Json(groups))
}

/// Select the question for the current turn.
#[utoipa::path(
    post,
    path = "/sessions/{id}/select",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = SelectQuestionRequest,
    responses(
        (status = 200, description = "Question selected", body = SessionSummary),
        (status = 403, description = "Caller does not hold the turn"),
        (status = 409, description = "Question not selectable or concurrent write")
    )
)]
pub async fn select_question(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectQuestionRequest>,
) -> Result<Json<SessionSummary>, AppError> {
    let summary = session_service::select_question(&state, id, payload).await?;
    Ok(Json(summary))
}

/// Grade the pending question and advance the turn.
#[utoipa::path(
    post,
    path = "/sessions/{id}/answer",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer graded", body = AnswerOutcome),
        (status = 403, description = "Caller does not hold the turn"),
        (status = 409, description = "Selection mismatch or concurrent write")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Json<AnswerOutcome>, AppError> {
    let outcome = session_service::submit_answer(&state, id, payload).await?;
    Ok(Json(outcome))
}

/// Spend an external-help lifeline for the current turn.
#[utoipa::path(
    post,
    path = "/sessions/{id}/lifelines/external-help",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = LifelineRequest,
    responses(
        (status = 200, description = "Lifeline spent", body = LifelineOutcome),
        (status = 409, description = "Lifeline exhausted or no pending selection")
    )
)]
pub async fn use_external_help(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LifelineRequest>,
) -> Result<Json<LifelineOutcome>, AppError> {
    let outcome =
        session_service::use_lifeline(&state, id, LifelineKind::ExternalHelp, payload.player_id)
            .await?;
    Ok(Json(outcome))
}

/// Spend a fifty-fifty lifeline; the response carries the kept options.
#[utoipa::path(
    post,
    path = "/sessions/{id}/lifelines/fifty-fifty",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = LifelineRequest,
    responses(
        (status = 200, description = "Lifeline spent", body = LifelineOutcome),
        (status = 409, description = "Lifeline exhausted or no pending selection")
    )
)]
pub async fn use_fifty_fifty(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LifelineRequest>,
) -> Result<Json<LifelineOutcome>, AppError> {
    let outcome =
        session_service::use_lifeline(&state, id, LifelineKind::FiftyFifty, payload.player_id)
            .await?;
    Ok(Json(outcome))
}

/// Spend a switch lifeline, returning the turn to the selecting sub-state.
#[utoipa::path(
    post,
    path = "/sessions/{id}/lifelines/switch",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = LifelineRequest,
    responses(
        (status = 200, description = "Lifeline spent", body = LifelineOutcome),
        (status = 409, description = "Lifeline exhausted or no pending selection")
    )
)]
pub async fn use_switch(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LifelineRequest>,
) -> Result<Json<LifelineOutcome>, AppError> {
    let outcome =
        session_service::use_lifeline(&state, id, LifelineKind::Switch, payload.player_id).await?;
    Ok(Json(outcome))
}

/// Re-run the completion rollup; a no-op once applied.
#[utoipa::path(
    post,
    path = "/sessions/{id}/rollup",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Rollup outcome", body = RollupSummary),
        (status = 409, description = "Session is not completed")
    )
)]
pub async fn run_rollup(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RollupSummary>, AppError> {
    let summary = rollup_service::apply_rollup(&state, id).await?;
    Ok(Json(summary))
}

/// Query parameters for the bank question listing.
#[derive(Debug, Deserialize, IntoParams)]
pub struct BankQuestionQuery {
    /// Language to filter by.
    pub language: Language,
}

/// List authored questions in one language for the session-creation view.
#[utoipa::path(
    get,
    path = "/questions",
    tag = "session",
    params(BankQuestionQuery),
    responses(
        (status = 200, description = "Questions in the requested language", body = [QuestionSummary])
    )
)]
pub async fn list_bank_questions(
    State(state): State<SharedState>,
    Query(query): Query<BankQuestionQuery>,
) -> Result<Json<Vec<QuestionSummary>>, AppError> {
    let questions = board_service::bank_questions(&state, query.language).await?;
    Ok(Json(questions))
}
