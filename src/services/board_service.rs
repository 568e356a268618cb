//! Read-side projections: the grouped available-questions view, the global
//! leaderboard, and the per-session ranking with its answer review log.
//! Nothing in here mutates.

use std::cmp::Reverse;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::{
    dto::{
        board::{AnswerReview, GlobalRankingEntry, SessionBoard, SessionRankingEntry},
        format_system_time,
        session::{QuestionSummary, TopicGroup},
    },
    error::EngineError,
    model::{GameSession, Language, Question},
    state::SharedState,
};

/// Unanswered questions of a session, grouped for the selecting player.
pub async fn available_questions(
    state: &SharedState,
    session_id: Uuid,
) -> Result<Vec<TopicGroup>, EngineError> {
    let store = state.require_session_store().await?;
    let Some(versioned) = store.get(session_id).await? else {
        return Err(EngineError::NotFound(format!("session `{session_id}`")));
    };
    Ok(group_remaining(&versioned.session))
}

/// Group a session's unanswered questions by topic and sort each group by
/// ascending difficulty.
///
/// Group order is the first-appearance order of the topics in the session's
/// question list; the in-group sort is stable, so equal difficulties keep
/// embedding order. Clients render this view as-is.
pub fn group_remaining(session: &GameSession) -> Vec<TopicGroup> {
    let mut groups: IndexMap<&str, Vec<&Question>> = IndexMap::new();
    for question in session.remaining_questions() {
        groups
            .entry(question.topic_id.as_str())
            .or_default()
            .push(question);
    }

    groups
        .into_iter()
        .map(|(topic_id, mut questions)| {
            questions.sort_by_key(|question| question.difficulty);
            TopicGroup {
                topic_id: topic_id.to_owned(),
                questions: questions.into_iter().map(Into::into).collect(),
            }
        })
        .collect()
}

/// Global leaderboard: every player ordered by games won, ties broken by
/// id so the order is stable across reads.
pub async fn global_board(state: &SharedState) -> Result<Vec<GlobalRankingEntry>, EngineError> {
    let mut players = state.player_directory().list().await?;
    players.sort_by(|a, b| {
        (Reverse(a.games_won), a.id.as_str()).cmp(&(Reverse(b.games_won), b.id.as_str()))
    });
    Ok(players.into_iter().map(Into::into).collect())
}

/// Per-session board: score ranking plus the annotated answer log.
pub async fn session_board(
    state: &SharedState,
    session_id: Uuid,
) -> Result<SessionBoard, EngineError> {
    let store = state.require_session_store().await?;
    let Some(versioned) = store.get(session_id).await? else {
        return Err(EngineError::NotFound(format!("session `{session_id}`")));
    };
    Ok(project_board(&versioned.session))
}

fn project_board(session: &GameSession) -> SessionBoard {
    let mut ranking: Vec<SessionRankingEntry> = session
        .players
        .iter()
        .map(|player| SessionRankingEntry {
            player_id: player.player_id.clone(),
            display_name: player.display_name.clone(),
            score: player.score,
        })
        .collect();
    // Stable sort keeps turn order between tied scores.
    ranking.sort_by_key(|entry| Reverse(entry.score));

    let reviews = session
        .player_answers
        .iter()
        .map(|answer| {
            let question = session.question(answer.question_id);
            AnswerReview {
                player_id: answer.player_id.clone(),
                player_name: session
                    .player(&answer.player_id)
                    .map(|player| player.display_name.clone())
                    .unwrap_or_else(|| "unknown".into()),
                question_id: answer.question_id,
                question_text: question
                    .map(|question| question.text.clone())
                    .unwrap_or_else(|| "unknown".into()),
                answer_text: question
                    .and_then(|question| question.answers.get(answer.answer_index))
                    .map(|option| option.text.clone())
                    .unwrap_or_else(|| "unknown".into()),
                correct_answer_text: question
                    .and_then(|question| question.correct_answer_text())
                    .unwrap_or("unknown")
                    .to_owned(),
                is_correct: answer.is_correct,
                points_delta: answer.points_delta,
                answered_at: format_system_time(answer.timestamp),
            }
        })
        .collect();

    SessionBoard {
        session_id: session.id,
        name: session.name.clone(),
        completed_at: session.completed_at.map(format_system_time),
        ranking,
        reviews,
    }
}

/// Bank questions authored in one language, for the session-creation view.
pub async fn bank_questions(
    state: &SharedState,
    language: Language,
) -> Result<Vec<QuestionSummary>, EngineError> {
    let questions = state.question_bank().query_by_language(language).await?;
    Ok(questions.iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::SystemTime;

    use crate::{
        config::AppConfig,
        dao::{
            memory::{InMemoryPlayerDirectory, InMemoryQuestionBank, InMemorySessionStore},
            session_store::SessionStore,
        },
        model::{
            Answer, LifelineAllotment, Player, PlayerAnswer, PlayerRole, SessionPlayer,
        },
    };

    fn question(topic: &str, difficulty: u8, text: &str) -> Question {
        Question {
            id: Uuid::new_v4(),
            text: text.into(),
            topic_id: topic.into(),
            difficulty,
            language: Language::En,
            answers: vec![
                Answer {
                    text: "yes".into(),
                    correct: true,
                    plausibility: None,
                },
                Answer {
                    text: "no".into(),
                    correct: false,
                    plausibility: None,
                },
            ],
        }
    }

    fn directory_player(id: &str, games_won: u32) -> Player {
        Player {
            id: id.into(),
            display_name: id.to_uppercase(),
            avatar_url: None,
            role: PlayerRole::Player,
            games_played: games_won + 2,
            games_won,
            total_points: i64::from(games_won) * 100,
            created_at: SystemTime::now(),
            last_login_at: SystemTime::now(),
        }
    }

    fn session_of(questions: Vec<Question>) -> GameSession {
        let player = SessionPlayer::snapshot_of(
            &directory_player("a", 0),
            LifelineAllotment::default(),
        );
        GameSession::new("game".into(), Language::En, "a".into(), vec![player], questions)
    }

    #[test]
    fn grouping_keeps_topic_first_appearance_and_sorts_by_difficulty() {
        let questions = vec![
            question("history", 4, "h4"),
            question("science", 2, "s2"),
            question("history", 1, "h1"),
            question("science", 5, "s5"),
            question("history", 1, "h1-second"),
        ];
        let session = session_of(questions);

        let groups = group_remaining(&session);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].topic_id, "history");
        assert_eq!(groups[1].topic_id, "science");

        let history: Vec<&str> = groups[0]
            .questions
            .iter()
            .map(|question| question.text.as_str())
            .collect();
        // Ascending difficulty; equal difficulties keep embedding order.
        assert_eq!(history, vec!["h1", "h1-second", "h4"]);

        let difficulties: Vec<u8> = groups[1]
            .questions
            .iter()
            .map(|question| question.difficulty)
            .collect();
        assert_eq!(difficulties, vec![2, 5]);
    }

    #[test]
    fn answered_questions_leave_the_selecting_view() {
        let questions = vec![question("history", 1, "h1"), question("history", 2, "h2")];
        let answered_id = questions[0].id;
        let mut session = session_of(questions);
        session.player_answers.push(PlayerAnswer {
            player_id: "a".into(),
            question_id: answered_id,
            answer_index: 0,
            is_correct: true,
            points_delta: 10,
            timestamp: SystemTime::now(),
        });

        let groups = group_remaining(&session);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].questions.len(), 1);
        assert_eq!(groups[0].questions[0].text, "h2");
    }

    #[tokio::test]
    async fn global_board_orders_by_wins_with_stable_ties() {
        let directory = InMemoryPlayerDirectory::new();
        directory.upsert(directory_player("zoe", 5));
        directory.upsert(directory_player("amy", 5));
        directory.upsert(directory_player("max", 9));

        let state = crate::state::AppState::new(
            AppConfig::default(),
            Arc::new(InMemoryQuestionBank::new()),
            Arc::new(directory),
        );

        let board = global_board(&state).await.unwrap();
        let ids: Vec<&str> = board.iter().map(|entry| entry.player_id.as_str()).collect();
        assert_eq!(ids, vec!["max", "amy", "zoe"]);
        assert_eq!(board[0].games_played, 11);
        assert_eq!(board[0].total_points, 900);
    }

    #[tokio::test]
    async fn session_board_ranks_by_score_and_annotates_answers() {
        let questions = vec![question("history", 3, "who?")];
        let question_id = questions[0].id;
        let mut session = session_of(questions);
        session.players.push({
            let mut other = SessionPlayer::snapshot_of(
                &directory_player("b", 0),
                LifelineAllotment::default(),
            );
            other.score = 30;
            other
        });
        session.player_answers.push(PlayerAnswer {
            player_id: "b".into(),
            question_id,
            answer_index: 1,
            is_correct: false,
            points_delta: -15,
            timestamp: SystemTime::now(),
        });

        let store = InMemorySessionStore::new();
        store.create(session.clone()).await.unwrap();
        let state = crate::state::AppState::new(
            AppConfig::default(),
            Arc::new(InMemoryQuestionBank::new()),
            Arc::new(InMemoryPlayerDirectory::new()),
        );
        state.install_session_store(Arc::new(store)).await;

        let board = session_board(&state, session.id).await.unwrap();
        assert_eq!(board.ranking[0].player_id, "b");
        assert_eq!(board.ranking[0].score, 30);
        assert_eq!(board.ranking[1].score, 0);

        let review = &board.reviews[0];
        assert_eq!(review.player_name, "B");
        assert_eq!(review.question_text, "who?");
        assert_eq!(review.answer_text, "no");
        assert_eq!(review.correct_answer_text, "yes");
        assert!(!review.is_correct);
        assert_eq!(review.points_delta, -15);
    }
}
