//! Completion rollup: fold a finished session's outcomes into each
//! participant's durable statistics.
//!
//! The rollup is deliberately not transactional with the completion
//! commit. It claims the session once through the `rollup_applied` flag
//! (a conditional write, so two replicas cannot both claim it) and then
//! walks the participants; a failed directory write is logged and skipped,
//! never fatal for the rest of the roster.

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::{player_directory::StatsPatch, session_store::VersionedSession, storage::StorageResult},
    dto::session::RollupSummary,
    error::EngineError,
    model::{GameSession, SessionStatus},
    state::SharedState,
};

/// Apply the statistics rollup for a completed session.
///
/// Safe to call again: once the session carries the applied flag the call
/// reports `applied: false` and writes nothing.
pub async fn apply_rollup(
    state: &SharedState,
    session_id: Uuid,
) -> Result<RollupSummary, EngineError> {
    let store = state.require_session_store().await?;
    let Some(versioned) = store.get(session_id).await? else {
        return Err(EngineError::NotFound(format!("session `{session_id}`")));
    };
    let VersionedSession {
        mut session,
        version,
    } = versioned;

    if session.status != SessionStatus::Completed {
        return Err(EngineError::InvalidSelection(
            "rollup applies to completed sessions only".into(),
        ));
    }

    let winner_ids = winner_ids(&session);

    if session.rollup_applied {
        return Ok(RollupSummary {
            applied: false,
            winner_ids,
            updated_ids: Vec::new(),
            skipped_ids: Vec::new(),
        });
    }

    // Claim the rollup before touching the directory; losing this write
    // means another engine instance owns it.
    session.rollup_applied = true;
    store.update(session_id, version, session.clone()).await?;

    let directory = state.player_directory();
    let mut updated_ids = Vec::new();
    let mut skipped_ids = Vec::new();

    for participant in &session.players {
        let is_winner = winner_ids.contains(&participant.player_id);
        let result: StorageResult<()> = async {
            let Some(player) = directory.get(participant.player_id.clone()).await? else {
                return Err(crate::dao::storage::StorageError::NotFound {
                    what: format!("player `{}`", participant.player_id),
                });
            };

            let patch = StatsPatch {
                games_played: Some(player.games_played + 1),
                games_won: Some(player.games_won + u32::from(is_winner)),
                // Session scores are signed; a bad game lowers the total.
                total_points: Some(player.total_points + participant.score),
            };
            directory
                .update_stats(participant.player_id.clone(), patch)
                .await
        }
        .await;

        match result {
            Ok(()) => updated_ids.push(participant.player_id.clone()),
            Err(err) => {
                warn!(
                    session = %session_id,
                    player = %participant.player_id,
                    error = %err,
                    "statistics update failed; continuing with remaining participants"
                );
                skipped_ids.push(participant.player_id.clone());
            }
        }
    }

    info!(
        session = %session_id,
        winners = winner_ids.len(),
        updated = updated_ids.len(),
        skipped = skipped_ids.len(),
        "completion rollup applied"
    );

    Ok(RollupSummary {
        applied: true,
        winner_ids,
        updated_ids,
        skipped_ids,
    })
}

/// Players whose final score equals the session maximum; ties produce
/// multiple winners.
pub fn winner_ids(session: &GameSession) -> Vec<String> {
    let top = session.top_score();
    session
        .players
        .iter()
        .filter(|player| player.score == top)
        .map(|player| player.player_id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::SystemTime;

    use futures::future::BoxFuture;

    use crate::{
        config::AppConfig,
        dao::{
            memory::{InMemoryPlayerDirectory, InMemoryQuestionBank, InMemorySessionStore},
            player_directory::PlayerDirectory,
            session_store::SessionStore,
            storage::StorageError,
        },
        model::{Language, LifelineAllotment, Player, PlayerRole, SessionPlayer},
    };

    fn directory_player(id: &str) -> Player {
        Player {
            id: id.into(),
            display_name: id.to_uppercase(),
            avatar_url: None,
            role: PlayerRole::Player,
            games_played: 2,
            games_won: 1,
            total_points: 100,
            created_at: SystemTime::now(),
            last_login_at: SystemTime::now(),
        }
    }

    fn completed_session(scores: &[(&str, i64)]) -> GameSession {
        let players = scores
            .iter()
            .map(|(id, score)| {
                let mut snapshot = SessionPlayer::snapshot_of(
                    &directory_player(id),
                    LifelineAllotment::default(),
                );
                snapshot.score = *score;
                snapshot
            })
            .collect();

        let mut session = GameSession::new(
            "finished".into(),
            Language::En,
            scores[0].0.into(),
            players,
            Vec::new(),
        );
        session.status = SessionStatus::Completed;
        session.completed_at = Some(SystemTime::now());
        session
    }

    async fn state_with(
        directory: InMemoryPlayerDirectory,
        session: &GameSession,
    ) -> SharedState {
        let state = crate::state::AppState::new(
            AppConfig::default(),
            Arc::new(InMemoryQuestionBank::new()),
            Arc::new(directory),
        );
        let store = InMemorySessionStore::new();
        store.create(session.clone()).await.unwrap();
        state.install_session_store(Arc::new(store)).await;
        state
    }

    #[test]
    fn ties_produce_multiple_winners() {
        let session = completed_session(&[("a", 50), ("b", 50), ("c", 30)]);
        assert_eq!(winner_ids(&session), vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn rollup_updates_every_participant_and_flags_the_session() {
        let session = completed_session(&[("a", 50), ("b", 50), ("c", 30)]);
        let directory = InMemoryPlayerDirectory::new();
        for id in ["a", "b", "c"] {
            directory.upsert(directory_player(id));
        }
        let state = state_with(directory.clone(), &session).await;

        let summary = apply_rollup(&state, session.id).await.unwrap();
        assert!(summary.applied);
        assert_eq!(summary.winner_ids, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(summary.updated_ids.len(), 3);
        assert!(summary.skipped_ids.is_empty());

        // Both tied winners gain a win; everyone gains a game.
        for (id, won, points) in [("a", 2, 150), ("b", 2, 150), ("c", 1, 130)] {
            let player = directory.get(id.into()).await.unwrap().unwrap();
            assert_eq!(player.games_played, 3);
            assert_eq!(player.games_won, won);
            assert_eq!(player.total_points, points);
        }

        let store = state.session_store().await.unwrap();
        assert!(store.get(session.id).await.unwrap().unwrap().session.rollup_applied);
    }

    #[tokio::test]
    async fn negative_scores_lower_the_lifetime_total() {
        let session = completed_session(&[("a", -40)]);
        let directory = InMemoryPlayerDirectory::new();
        directory.upsert(directory_player("a"));
        let state = state_with(directory.clone(), &session).await;

        apply_rollup(&state, session.id).await.unwrap();

        let player = directory.get("a".into()).await.unwrap().unwrap();
        assert_eq!(player.total_points, 60);
        // A lone player is the winner by definition.
        assert_eq!(player.games_won, 2);
    }

    #[tokio::test]
    async fn second_run_is_a_no_op() {
        let session = completed_session(&[("a", 10), ("b", 5)]);
        let directory = InMemoryPlayerDirectory::new();
        directory.upsert(directory_player("a"));
        directory.upsert(directory_player("b"));
        let state = state_with(directory.clone(), &session).await;

        let first = apply_rollup(&state, session.id).await.unwrap();
        assert!(first.applied);

        let second = apply_rollup(&state, session.id).await.unwrap();
        assert!(!second.applied);
        assert!(second.updated_ids.is_empty());

        let player = directory.get("a".into()).await.unwrap().unwrap();
        assert_eq!(player.games_played, 3);
        assert_eq!(player.games_won, 2);
    }

    #[tokio::test]
    async fn rollup_rejects_sessions_that_are_not_completed() {
        let mut session = completed_session(&[("a", 10)]);
        session.status = SessionStatus::InProgress;
        session.completed_at = None;
        let directory = InMemoryPlayerDirectory::new();
        directory.upsert(directory_player("a"));
        let state = state_with(directory, &session).await;

        let err = apply_rollup(&state, session.id).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidSelection(_)));
    }

    /// Directory that fails every write for one chosen player.
    #[derive(Clone)]
    struct FlakyDirectory {
        inner: InMemoryPlayerDirectory,
        failing_id: String,
    }

    impl PlayerDirectory for FlakyDirectory {
        fn get(&self, id: String) -> BoxFuture<'static, crate::dao::storage::StorageResult<Option<Player>>> {
            self.inner.get(id)
        }

        fn update_stats(
            &self,
            id: String,
            patch: StatsPatch,
        ) -> BoxFuture<'static, crate::dao::storage::StorageResult<()>> {
            if id == self.failing_id {
                Box::pin(async move {
                    Err(StorageError::unavailable(
                        format!("write for `{id}` refused"),
                        std::io::Error::other("directory offline"),
                    ))
                })
            } else {
                self.inner.update_stats(id, patch)
            }
        }

        fn list(&self) -> BoxFuture<'static, crate::dao::storage::StorageResult<Vec<Player>>> {
            self.inner.list()
        }
    }

    #[tokio::test]
    async fn partial_directory_failure_skips_only_that_participant() {
        let session = completed_session(&[("a", 20), ("b", 10), ("c", 5)]);
        let inner = InMemoryPlayerDirectory::new();
        for id in ["a", "b", "c"] {
            inner.upsert(directory_player(id));
        }
        let flaky = FlakyDirectory {
            inner: inner.clone(),
            failing_id: "b".into(),
        };

        let state = crate::state::AppState::new(
            AppConfig::default(),
            Arc::new(InMemoryQuestionBank::new()),
            Arc::new(flaky),
        );
        let store = InMemorySessionStore::new();
        store.create(session.clone()).await.unwrap();
        state.install_session_store(Arc::new(store)).await;

        let summary = apply_rollup(&state, session.id).await.unwrap();
        assert!(summary.applied);
        assert_eq!(summary.updated_ids, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(summary.skipped_ids, vec!["b".to_string()]);

        // The session stays completed and claimed despite the skip.
        let stored = state
            .session_store()
            .await
            .unwrap()
            .get(session.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.session.status, SessionStatus::Completed);
        assert!(stored.session.rollup_applied);

        let untouched = inner.get("b".into()).await.unwrap().unwrap();
        assert_eq!(untouched.games_played, 2);
    }
}
