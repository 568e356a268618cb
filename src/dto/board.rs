use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::model::Player;

/// One row of the global leaderboard, ordered by games won.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GlobalRankingEntry {
    /// Directory id.
    pub player_id: String,
    /// Current display name.
    pub display_name: String,
    /// Completed sessions won (ties count).
    pub games_won: u32,
    /// Completed sessions played.
    pub games_played: u32,
    /// Lifetime point total; can decrease after a bad game.
    pub total_points: i64,
}

impl From<Player> for GlobalRankingEntry {
    fn from(player: Player) -> Self {
        Self {
            player_id: player.id,
            display_name: player.display_name,
            games_won: player.games_won,
            games_played: player.games_played,
            total_points: player.total_points,
        }
    }
}

/// One row of a per-session ranking, ordered by score.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionRankingEntry {
    /// Directory id.
    pub player_id: String,
    /// Display name snapshotted into the session.
    pub display_name: String,
    /// Final (or current) session score.
    pub score: i64,
}

/// One graded answer annotated for review.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnswerReview {
    /// Player who answered.
    pub player_id: String,
    /// Snapshotted name of that player.
    pub player_name: String,
    /// Question that was answered.
    pub question_id: Uuid,
    /// Question text.
    pub question_text: String,
    /// Text of the option the player chose.
    pub answer_text: String,
    /// Text of the correct option.
    pub correct_answer_text: String,
    /// Grading outcome.
    pub is_correct: bool,
    /// Signed score change.
    pub points_delta: i64,
    /// RFC 3339 commit time of the answer.
    pub answered_at: String,
}

/// Per-session leaderboard: ranking plus the full annotated answer log.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionBoard {
    /// Session id.
    pub session_id: Uuid,
    /// Session display name.
    pub name: String,
    /// RFC 3339 completion timestamp, once completed.
    pub completed_at: Option<String>,
    /// Participants ordered by score, highest first.
    pub ranking: Vec<SessionRankingEntry>,
    /// Answer log in commit order.
    pub reviews: Vec<AnswerReview>,
}
