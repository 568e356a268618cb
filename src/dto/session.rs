use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::session_store::VersionedSession,
    dto::format_system_time,
    model::{Language, LifelineAllotment, LifelineKind, Question, SessionPlayer, SessionStatus},
};

/// Payload used to create a new session.
///
/// `player_ids` order is turn order; a duplicated game reshuffles play
/// order simply by reordering this list.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateSessionRequest {
    /// Directory id of the caller creating the session.
    pub player_id: String,
    /// Display name of the game.
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Language every selected question must match.
    pub language: Language,
    /// Ordered participant ids.
    #[validate(length(min = 1))]
    pub player_ids: Vec<String>,
    /// Questions to play; count must be a positive multiple of the player
    /// count.
    #[validate(length(min = 1))]
    pub question_ids: Vec<Uuid>,
    /// Per-player lifeline counts; configured defaults apply when omitted.
    #[serde(default)]
    pub lifelines: Option<LifelineAllotmentInput>,
}

/// Lifeline counts supplied at creation.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct LifelineAllotmentInput {
    /// External-help uses per player.
    #[serde(default)]
    pub external_helps: u32,
    /// Fifty-fifty uses per player.
    #[serde(default)]
    pub fifty_fifties: u32,
    /// Question-switch uses per player.
    #[serde(default)]
    pub switches: u32,
}

impl From<LifelineAllotmentInput> for LifelineAllotment {
    fn from(value: LifelineAllotmentInput) -> Self {
        Self {
            external_helps: value.external_helps,
            fifty_fifties: value.fifty_fifties,
            switches: value.switches,
        }
    }
}

/// Request to pick the question for the current turn.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectQuestionRequest {
    /// Directory id of the acting caller.
    pub player_id: String,
    /// Question to select; must be unanswered.
    pub question_id: Uuid,
}

/// Request to grade the pending question.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitAnswerRequest {
    /// Directory id of the acting caller.
    pub player_id: String,
    /// Must match the currently selected question.
    pub question_id: Uuid,
    /// Index of the chosen answer option.
    pub answer_index: usize,
}

/// Request to spend a lifeline during the caller's turn.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LifelineRequest {
    /// Directory id of the acting caller.
    pub player_id: String,
}

/// Public projection of a session participant.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionPlayerSummary {
    /// Directory id.
    pub player_id: String,
    /// Snapshotted display name.
    pub display_name: String,
    /// Snapshotted avatar URL.
    pub avatar_url: Option<String>,
    /// Current session score.
    pub score: i64,
    /// Remaining external-help uses.
    pub external_help_uses: u32,
    /// Remaining fifty-fifty uses.
    pub fifty_fifty_uses: u32,
    /// Remaining question-switch uses.
    pub switch_uses: u32,
}

impl From<&SessionPlayer> for SessionPlayerSummary {
    fn from(player: &SessionPlayer) -> Self {
        Self {
            player_id: player.player_id.clone(),
            display_name: player.display_name.clone(),
            avatar_url: player.avatar_url.clone(),
            score: player.score,
            external_help_uses: player.external_help_uses,
            fifty_fifty_uses: player.fifty_fifty_uses,
            switch_uses: player.switch_uses,
        }
    }
}

/// Versioned snapshot of a session returned by reads and the event stream.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionSummary {
    /// Session id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Session language.
    pub language: Language,
    /// Creator's directory id.
    pub created_by: String,
    /// Lifecycle state.
    pub status: SessionStatus,
    /// Participants in turn order.
    pub players: Vec<SessionPlayerSummary>,
    /// Total number of questions in the session.
    pub question_count: usize,
    /// Number of questions already answered.
    pub answered_count: usize,
    /// Player whose turn it is.
    pub current_turn_player_id: String,
    /// Question picked but not yet answered, when in the answering sub-state.
    pub current_selected_question_id: Option<Uuid>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 completion timestamp, once completed.
    pub completed_at: Option<String>,
    /// Store version the snapshot was read at; echo it back on retries.
    pub version: u64,
}

impl From<VersionedSession> for SessionSummary {
    fn from(versioned: VersionedSession) -> Self {
        let VersionedSession { session, version } = versioned;
        Self {
            id: session.id,
            name: session.name.clone(),
            language: session.language,
            created_by: session.created_by.clone(),
            status: session.status,
            players: session.players.iter().map(Into::into).collect(),
            question_count: session.questions.len(),
            answered_count: session.player_answers.len(),
            current_turn_player_id: session.current_turn_player_id.clone(),
            current_selected_question_id: session.current_selected_question_id,
            created_at: format_system_time(session.created_at),
            completed_at: session.completed_at.map(format_system_time),
            version,
        }
    }
}

/// Outcome of grading one answer.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerOutcome {
    /// Whether the chosen option was correct.
    pub is_correct: bool,
    /// Signed score change applied to the acting player.
    pub points_delta: i64,
    /// Turn holder after the grading commit.
    pub next_turn_player_id: String,
    /// Whether this answer completed the session.
    pub completed: bool,
    /// Session version after the commit.
    pub version: u64,
}

/// Outcome of spending a lifeline.
#[derive(Debug, Serialize, ToSchema)]
pub struct LifelineOutcome {
    /// Which lifeline was spent.
    pub kind: LifelineKind,
    /// Uses left after this one.
    pub remaining_uses: u32,
    /// For fifty-fifty: answer indexes still shown, ascending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kept_answer_indexes: Option<Vec<usize>>,
    /// For switch: whether the pending selection was cleared.
    pub selection_cleared: bool,
    /// Session version after the commit.
    pub version: u64,
}

/// Question projection offered to the selecting player.
///
/// Correctness flags and plausibility hints stay server-side.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuestionSummary {
    /// Question id.
    pub id: Uuid,
    /// Question text.
    pub text: String,
    /// Topic the question belongs to.
    pub topic_id: String,
    /// Difficulty level, 1 to 5.
    pub difficulty: u8,
    /// Answer option texts in stored order.
    pub answers: Vec<String>,
}

impl From<&Question> for QuestionSummary {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id,
            text: question.text.clone(),
            topic_id: question.topic_id.clone(),
            difficulty: question.difficulty,
            answers: question
                .answers
                .iter()
                .map(|answer| answer.text.clone())
                .collect(),
        }
    }
}

/// Unanswered questions of one topic, ordered by ascending difficulty.
#[derive(Debug, Serialize, ToSchema)]
pub struct TopicGroup {
    /// Topic identifier.
    pub topic_id: String,
    /// Questions still open for selection.
    pub questions: Vec<QuestionSummary>,
}

/// Result of running (or re-running) the completion rollup.
#[derive(Debug, Serialize, ToSchema)]
pub struct RollupSummary {
    /// Whether this call claimed the rollup; false when already applied.
    pub applied: bool,
    /// Players whose final score equals the session maximum.
    pub winner_ids: Vec<String>,
    /// Participants whose directory statistics were written.
    pub updated_ids: Vec<String>,
    /// Participants skipped because the directory write failed.
    pub skipped_ids: Vec<String>,
}
