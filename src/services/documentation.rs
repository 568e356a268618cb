use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the Quiz Arena backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::session::create_session,
        crate::routes::session::get_session,
        crate::routes::session::available_questions,
        crate::routes::session::select_question,
        crate::routes::session::submit_answer,
        crate::routes::session::use_external_help,
        crate::routes::session::use_fifty_fifty,
        crate::routes::session::use_switch,
        crate::routes::session::run_rollup,
        crate::routes::session::list_bank_questions,
        crate::routes::board::global_board,
        crate::routes::board::session_board,
        crate::routes::sse::session_events,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::session::CreateSessionRequest,
            crate::dto::session::LifelineAllotmentInput,
            crate::dto::session::SelectQuestionRequest,
            crate::dto::session::SubmitAnswerRequest,
            crate::dto::session::LifelineRequest,
            crate::dto::session::SessionSummary,
            crate::dto::session::SessionPlayerSummary,
            crate::dto::session::AnswerOutcome,
            crate::dto::session::LifelineOutcome,
            crate::dto::session::QuestionSummary,
            crate::dto::session::TopicGroup,
            crate::dto::session::RollupSummary,
            crate::dto::board::GlobalRankingEntry,
            crate::dto::board::SessionRankingEntry,
            crate::dto::board::AnswerReview,
            crate::dto::board::SessionBoard,
            crate::model::Language,
            crate::model::SessionStatus,
            crate::model::LifelineKind,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "session", description = "Session lifecycle and turn commands"),
        (name = "board", description = "Leaderboard projections"),
        (name = "sse", description = "Server-sent session event streams"),
    )
)]
pub struct ApiDoc;
