use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::BoxFuture;
use tokio::sync::watch;
use uuid::Uuid;

use crate::dao::{
    player_directory::{PlayerDirectory, StatsPatch},
    question_bank::QuestionBank,
    session_store::{SessionStore, VersionedSession},
    storage::{StorageError, StorageResult},
};
use crate::model::{GameSession, Language, Player, Question};

struct Slot {
    current: VersionedSession,
    notifier: watch::Sender<VersionedSession>,
}

/// Session store backed by a concurrent in-process map.
///
/// The default backend for tests and single-node deployments; conditional
/// writes and change notification behave exactly like the database-backed
/// stores.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    slots: Arc<DashMap<Uuid, Slot>>,
}

impl InMemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn create_sync(&self, session: GameSession) -> StorageResult<u64> {
        match self.slots.entry(session.id) {
            Entry::Occupied(_) => Err(StorageError::AlreadyExists { id: session.id }),
            Entry::Vacant(vacant) => {
                let versioned = VersionedSession {
                    session,
                    version: 1,
                };
                let (notifier, _receiver) = watch::channel(versioned.clone());
                vacant.insert(Slot {
                    current: versioned,
                    notifier,
                });
                Ok(1)
            }
        }
    }

    fn update_sync(
        &self,
        id: Uuid,
        expected_version: u64,
        session: GameSession,
    ) -> StorageResult<u64> {
        let Some(mut slot) = self.slots.get_mut(&id) else {
            return Err(StorageError::NotFound {
                what: format!("session `{id}`"),
            });
        };

        if slot.current.version != expected_version {
            return Err(StorageError::Conflict {
                id,
                expected: expected_version,
                actual: slot.current.version,
            });
        }

        let next = VersionedSession {
            session,
            version: expected_version + 1,
        };
        slot.current = next.clone();
        let _ = slot.notifier.send(next);
        Ok(expected_version + 1)
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, session: GameSession) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.create_sync(session) })
    }

    fn get(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<VersionedSession>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.slots.get(&id).map(|slot| slot.current.clone())) })
    }

    fn update(
        &self,
        id: Uuid,
        expected_version: u64,
        session: GameSession,
    ) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.update_sync(id, expected_version, session) })
    }

    fn watch(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<watch::Receiver<VersionedSession>>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.slots.get(&id).map(|slot| slot.notifier.subscribe())) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// Question bank held in memory, seeded from configuration at startup.
#[derive(Clone, Default)]
pub struct InMemoryQuestionBank {
    questions: Arc<DashMap<Uuid, Question>>,
}

impl InMemoryQuestionBank {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a question.
    pub fn insert(&self, question: Question) {
        self.questions.insert(question.id, question);
    }

    /// Number of questions currently held.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the bank holds no questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl QuestionBank for InMemoryQuestionBank {
    fn get_by_ids(&self, ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<Vec<Question>>> {
        let bank = self.clone();
        Box::pin(async move {
            Ok(ids
                .into_iter()
                .filter_map(|id| bank.questions.get(&id).map(|entry| entry.value().clone()))
                .collect())
        })
    }

    fn query_by_language(
        &self,
        language: Language,
    ) -> BoxFuture<'static, StorageResult<Vec<Question>>> {
        let bank = self.clone();
        Box::pin(async move {
            let mut questions: Vec<Question> = bank
                .questions
                .iter()
                .filter(|entry| entry.value().language == language)
                .map(|entry| entry.value().clone())
                .collect();
            questions.sort_by(|a, b| {
                (a.topic_id.as_str(), a.difficulty, a.text.as_str()).cmp(&(
                    b.topic_id.as_str(),
                    b.difficulty,
                    b.text.as_str(),
                ))
            });
            Ok(questions)
        })
    }
}

/// Player directory held in memory, seeded from configuration at startup.
#[derive(Clone, Default)]
pub struct InMemoryPlayerDirectory {
    players: Arc<DashMap<String, Player>>,
}

impl InMemoryPlayerDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a player record.
    pub fn upsert(&self, player: Player) {
        self.players.insert(player.id.clone(), player);
    }
}

impl PlayerDirectory for InMemoryPlayerDirectory {
    fn get(&self, id: String) -> BoxFuture<'static, StorageResult<Option<Player>>> {
        let directory = self.clone();
        Box::pin(async move { Ok(directory.players.get(&id).map(|entry| entry.value().clone())) })
    }

    fn update_stats(
        &self,
        id: String,
        patch: StatsPatch,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let directory = self.clone();
        Box::pin(async move {
            let Some(mut player) = directory.players.get_mut(&id) else {
                return Err(StorageError::NotFound {
                    what: format!("player `{id}`"),
                });
            };

            if let Some(games_played) = patch.games_played {
                player.games_played = games_played;
            }
            if let Some(games_won) = patch.games_won {
                player.games_won = games_won;
            }
            if let Some(total_points) = patch.total_points {
                player.total_points = total_points;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'static, StorageResult<Vec<Player>>> {
        let directory = self.clone();
        Box::pin(async move {
            Ok(directory
                .players
                .iter()
                .map(|entry| entry.value().clone())
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LifelineAllotment, PlayerRole, SessionPlayer};
    use std::time::SystemTime;

    fn player(id: &str) -> Player {
        Player {
            id: id.into(),
            display_name: id.to_uppercase(),
            avatar_url: None,
            role: PlayerRole::Player,
            games_played: 0,
            games_won: 0,
            total_points: 0,
            created_at: SystemTime::now(),
            last_login_at: SystemTime::now(),
        }
    }

    fn session() -> GameSession {
        let players = vec![
            SessionPlayer::snapshot_of(&player("a"), LifelineAllotment::default()),
            SessionPlayer::snapshot_of(&player("b"), LifelineAllotment::default()),
        ];
        GameSession::new("game".into(), Language::En, "a".into(), players, Vec::new())
    }

    #[tokio::test]
    async fn create_then_get_roundtrips_at_version_one() {
        let store = InMemorySessionStore::new();
        let session = session();
        let id = session.id;

        assert_eq!(store.create(session.clone()).await.unwrap(), 1);
        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.session, session);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_id() {
        let store = InMemorySessionStore::new();
        let session = session();
        store.create(session.clone()).await.unwrap();

        let err = store.create(session).await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn stale_update_conflicts_and_leaves_document_untouched() {
        let store = InMemorySessionStore::new();
        let mut session = session();
        let id = session.id;
        store.create(session.clone()).await.unwrap();

        session.name = "first write".into();
        assert_eq!(store.update(id, 1, session.clone()).await.unwrap(), 2);

        // A second writer still holding version 1 must lose.
        session.name = "second write".into();
        let err = store.update(id, 1, session).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::Conflict {
                expected: 1,
                actual: 2,
                ..
            }
        ));

        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.session.name, "first write");
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn watch_sees_current_value_and_updates() {
        let store = InMemorySessionStore::new();
        let mut session = session();
        let id = session.id;
        store.create(session.clone()).await.unwrap();

        let mut receiver = store.watch(id).await.unwrap().unwrap();
        assert_eq!(receiver.borrow().version, 1);

        session.name = "renamed".into();
        store.update(id, 1, session).await.unwrap();

        receiver.changed().await.unwrap();
        let seen = receiver.borrow().clone();
        assert_eq!(seen.version, 2);
        assert_eq!(seen.session.name, "renamed");
    }

    #[tokio::test]
    async fn watch_unknown_session_is_none() {
        let store = InMemorySessionStore::new();
        assert!(store.watch(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn directory_patch_updates_only_given_fields() {
        let directory = InMemoryPlayerDirectory::new();
        directory.upsert(player("a"));

        directory
            .update_stats(
                "a".into(),
                StatsPatch {
                    games_played: Some(3),
                    games_won: None,
                    total_points: Some(-20),
                },
            )
            .await
            .unwrap();

        let stored = directory.get("a".into()).await.unwrap().unwrap();
        assert_eq!(stored.games_played, 3);
        assert_eq!(stored.games_won, 0);
        assert_eq!(stored.total_points, -20);
    }

    #[tokio::test]
    async fn directory_patch_unknown_player_is_not_found() {
        let directory = InMemoryPlayerDirectory::new();
        let err = directory
            .update_stats("ghost".into(), StatsPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }
}
