use std::collections::HashSet;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::model::{Player, Question};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created, no play action recorded yet.
    Waiting,
    /// At least one play action happened; turns are rotating.
    InProgress,
    /// Every question answered; terminal.
    Completed,
}

/// The three limited-use helper actions a player can spend during a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LifelineKind {
    /// Ask someone outside the game; no engine-side effect beyond the counter.
    ExternalHelp,
    /// Narrow the visible options to the correct answer plus one decoy.
    FiftyFifty,
    /// Abandon the pending selection and pick a different question.
    Switch,
}

/// Per-player lifeline counts granted at session creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifelineAllotment {
    /// External-help uses granted to each player.
    pub external_helps: u32,
    /// Fifty-fifty uses granted to each player.
    pub fifty_fifties: u32,
    /// Question-switch uses granted to each player.
    pub switches: u32,
}

/// Player snapshot embedded in a session.
///
/// A copy, not a reference: `display_name` and `avatar_url` are frozen at
/// creation so the session stays self-contained and replayable even when
/// the directory record changes later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionPlayer {
    /// Directory id of the snapshotted player.
    pub player_id: String,
    /// Display name at the time the session was created.
    pub display_name: String,
    /// Avatar URL at the time the session was created.
    pub avatar_url: Option<String>,
    /// Session score; wrong answers subtract, so it can go negative.
    pub score: i64,
    /// Remaining external-help uses.
    pub external_help_uses: u32,
    /// Remaining fifty-fifty uses.
    pub fifty_fifty_uses: u32,
    /// Remaining question-switch uses.
    pub switch_uses: u32,
}

impl SessionPlayer {
    /// Build the embedded snapshot for a directory player.
    pub fn snapshot_of(player: &Player, allotment: LifelineAllotment) -> Self {
        Self {
            player_id: player.id.clone(),
            display_name: player.display_name.clone(),
            avatar_url: player.avatar_url.clone(),
            score: 0,
            external_help_uses: allotment.external_helps,
            fifty_fifty_uses: allotment.fifty_fifties,
            switch_uses: allotment.switches,
        }
    }

    /// Remaining uses of the given lifeline.
    pub fn lifeline_uses(&self, kind: LifelineKind) -> u32 {
        match kind {
            LifelineKind::ExternalHelp => self.external_help_uses,
            LifelineKind::FiftyFifty => self.fifty_fifty_uses,
            LifelineKind::Switch => self.switch_uses,
        }
    }

    /// Mutable access to the counter backing the given lifeline.
    pub fn lifeline_uses_mut(&mut self, kind: LifelineKind) -> &mut u32 {
        match kind {
            LifelineKind::ExternalHelp => &mut self.external_help_uses,
            LifelineKind::FiftyFifty => &mut self.fifty_fifty_uses,
            LifelineKind::Switch => &mut self.switch_uses,
        }
    }
}

/// Immutable event appended to the session history when a question is graded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerAnswer {
    /// Player who answered.
    pub player_id: String,
    /// Question that was answered; unique across the log.
    pub question_id: Uuid,
    /// Index of the chosen option.
    pub answer_index: usize,
    /// Grading outcome.
    pub is_correct: bool,
    /// Signed score change applied to the acting player.
    pub points_delta: i64,
    /// Commit time of the grading write.
    pub timestamp: SystemTime,
}

/// Aggregate root for one quiz game.
///
/// Persisted as a single versioned document; every mutation goes through
/// the Session Store's conditional write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSession {
    /// Primary key.
    pub id: Uuid,
    /// Display name of the game.
    pub name: String,
    /// Language shared by the session and all of its questions.
    pub language: crate::model::Language,
    /// Directory id of the creating player.
    pub created_by: String,
    /// Lifecycle state.
    pub status: SessionStatus,
    /// Participants; array order is turn order.
    pub players: Vec<SessionPlayer>,
    /// Questions fixed at creation; count is a multiple of the player count.
    pub questions: Vec<Question>,
    /// Player whose turn it currently is.
    pub current_turn_player_id: String,
    /// Question picked but not yet answered by the turn holder.
    pub current_selected_question_id: Option<Uuid>,
    /// Append-only grading log; order reflects commit order.
    pub player_answers: Vec<PlayerAnswer>,
    /// Set once the completion rollup has claimed this session.
    #[serde(default)]
    pub rollup_applied: bool,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Set exactly once on the transition to Completed.
    pub completed_at: Option<SystemTime>,
}

impl GameSession {
    /// Build a new session in the Waiting state.
    ///
    /// Validation (non-empty players, question count divisibility, language
    /// consistency) happens in the service layer before this is called;
    /// the first player in creation order receives the opening turn.
    pub fn new(
        name: String,
        language: crate::model::Language,
        created_by: String,
        players: Vec<SessionPlayer>,
        questions: Vec<Question>,
    ) -> Self {
        let current_turn_player_id = players
            .first()
            .map(|player| player.player_id.clone())
            .unwrap_or_default();

        Self {
            id: Uuid::new_v4(),
            name,
            language,
            created_by,
            status: SessionStatus::Waiting,
            players,
            questions,
            current_turn_player_id,
            current_selected_question_id: None,
            player_answers: Vec::new(),
            rollup_applied: false,
            created_at: SystemTime::now(),
            completed_at: None,
        }
    }

    /// Ids of questions already present in the answer log.
    pub fn answered_question_ids(&self) -> HashSet<Uuid> {
        self.player_answers
            .iter()
            .map(|answer| answer.question_id)
            .collect()
    }

    /// Whether the given question has already been answered.
    pub fn is_answered(&self, question_id: Uuid) -> bool {
        self.player_answers
            .iter()
            .any(|answer| answer.question_id == question_id)
    }

    /// Look up a question embedded in this session.
    pub fn question(&self, question_id: Uuid) -> Option<&Question> {
        self.questions
            .iter()
            .find(|question| question.id == question_id)
    }

    /// Questions still open for selection, in embedding order.
    pub fn remaining_questions(&self) -> Vec<&Question> {
        let answered = self.answered_question_ids();
        self.questions
            .iter()
            .filter(|question| !answered.contains(&question.id))
            .collect()
    }

    /// Borrow a participant by directory id.
    pub fn player(&self, player_id: &str) -> Option<&SessionPlayer> {
        self.players
            .iter()
            .find(|player| player.player_id == player_id)
    }

    /// Mutably borrow a participant by directory id.
    pub fn player_mut(&mut self, player_id: &str) -> Option<&mut SessionPlayer> {
        self.players
            .iter_mut()
            .find(|player| player.player_id == player_id)
    }

    /// Next turn holder in round-robin creation order, wrapping after the
    /// last player. Rotation ignores scores and correctness.
    pub fn next_turn_player_id(&self) -> String {
        let current = self
            .players
            .iter()
            .position(|player| player.player_id == self.current_turn_player_id)
            .unwrap_or(0);
        let next = (current + 1) % self.players.len();
        self.players[next].player_id.clone()
    }

    /// True once every embedded question appears in the answer log.
    pub fn all_answered(&self) -> bool {
        self.player_answers.len() == self.questions.len()
    }

    /// Highest session score among the participants.
    pub fn top_score(&self) -> i64 {
        self.players
            .iter()
            .map(|player| player.score)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answer, Language, PlayerRole};

    fn directory_player(id: &str) -> Player {
        Player {
            id: id.into(),
            display_name: format!("player {id}"),
            avatar_url: None,
            role: PlayerRole::Player,
            games_played: 0,
            games_won: 0,
            total_points: 0,
            created_at: SystemTime::now(),
            last_login_at: SystemTime::now(),
        }
    }

    fn question(text: &str) -> Question {
        Question {
            id: Uuid::new_v4(),
            text: text.into(),
            topic_id: "history".into(),
            difficulty: 1,
            language: Language::En,
            answers: vec![
                Answer {
                    text: "right".into(),
                    correct: true,
                    plausibility: None,
                },
                Answer {
                    text: "wrong".into(),
                    correct: false,
                    plausibility: None,
                },
            ],
        }
    }

    fn session(player_ids: &[&str], question_count: usize) -> GameSession {
        let players = player_ids
            .iter()
            .map(|id| {
                SessionPlayer::snapshot_of(&directory_player(id), LifelineAllotment::default())
            })
            .collect();
        let questions = (0..question_count)
            .map(|index| question(&format!("q{index}")))
            .collect();
        GameSession::new(
            "test game".into(),
            Language::En,
            player_ids[0].into(),
            players,
            questions,
        )
    }

    #[test]
    fn new_session_starts_waiting_with_first_player_turn() {
        let session = session(&["alice", "bob"], 4);
        assert_eq!(session.status, SessionStatus::Waiting);
        assert_eq!(session.current_turn_player_id, "alice");
        assert!(session.current_selected_question_id.is_none());
        assert!(session.player_answers.is_empty());
        assert!(session.completed_at.is_none());
    }

    #[test]
    fn turn_rotation_is_round_robin_and_wraps() {
        let mut session = session(&["a", "b", "c"], 3);
        assert_eq!(session.next_turn_player_id(), "b");
        session.current_turn_player_id = "b".into();
        assert_eq!(session.next_turn_player_id(), "c");
        session.current_turn_player_id = "c".into();
        assert_eq!(session.next_turn_player_id(), "a");
    }

    #[test]
    fn remaining_questions_shrinks_with_answer_log() {
        let mut session = session(&["a", "b"], 4);
        let first = session.questions[0].id;
        session.player_answers.push(PlayerAnswer {
            player_id: "a".into(),
            question_id: first,
            answer_index: 0,
            is_correct: true,
            points_delta: 10,
            timestamp: SystemTime::now(),
        });

        assert!(session.is_answered(first));
        assert_eq!(session.remaining_questions().len(), 3);
        assert!(!session.all_answered());
    }

    #[test]
    fn lifeline_counters_are_per_kind() {
        let player = SessionPlayer::snapshot_of(
            &directory_player("a"),
            LifelineAllotment {
                external_helps: 1,
                fifty_fifties: 2,
                switches: 3,
            },
        );
        assert_eq!(player.lifeline_uses(LifelineKind::ExternalHelp), 1);
        assert_eq!(player.lifeline_uses(LifelineKind::FiftyFifty), 2);
        assert_eq!(player.lifeline_uses(LifelineKind::Switch), 3);
    }

    #[test]
    fn top_score_handles_negative_scores() {
        let mut session = session(&["a", "b"], 2);
        session.players[0].score = -15;
        session.players[1].score = -5;
        assert_eq!(session.top_score(), -5);
    }
}
