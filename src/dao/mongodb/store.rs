use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use mongodb::{Client, Collection, Database, bson::doc, options::IndexOptions};
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::MongoDaoError,
    error::MongoResult,
    models::{MongoSessionDocument, doc_id, doc_id_at_version},
};
use crate::dao::{
    session_store::{SessionStore, VersionedSession},
    storage::{StorageError, StorageResult},
};
use crate::model::GameSession;

const SESSION_COLLECTION_NAME: &str = "sessions";

/// Session store persisting each game as one versioned document.
///
/// Conditional writes filter on `{_id, version}` so a stale writer never
/// matches; the caller sees [`StorageError::Conflict`] and retries from a
/// fresh read. Change notification fans out through process-local watch
/// channels; replicas sharing a database need a change-stream bridge in
/// front of their subscribers.
#[derive(Clone)]
pub struct MongoSessionStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
    watchers: DashMap<Uuid, watch::Sender<VersionedSession>>,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoSessionStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
            watchers: DashMap::new(),
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;
        let collection = database.collection::<mongodb::bson::Document>(SESSION_COLLECTION_NAME);
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"session.created_by": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("session_creator_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: SESSION_COLLECTION_NAME,
                index: "session.created_by",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn collection(&self) -> Collection<MongoSessionDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoSessionDocument>(SESSION_COLLECTION_NAME)
    }

    fn publish(&self, versioned: VersionedSession) {
        if let Some(sender) = self.inner.watchers.get(&versioned.session.id) {
            let _ = sender.send(versioned);
        }
    }

    async fn create_session(&self, session: GameSession) -> StorageResult<u64> {
        let id = session.id;
        let collection = self.collection().await;

        let existing = collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadSession { id, source })?;
        if existing.is_some() {
            return Err(StorageError::AlreadyExists { id });
        }

        let document = MongoSessionDocument::new(session, 1);
        collection
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::CreateSession { id, source })?;

        self.publish(document.into());
        Ok(1)
    }

    async fn find_session(&self, id: Uuid) -> StorageResult<Option<VersionedSession>> {
        let collection = self.collection().await;
        let document = collection
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadSession { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn replace_session(
        &self,
        id: Uuid,
        expected_version: u64,
        session: GameSession,
    ) -> StorageResult<u64> {
        let collection = self.collection().await;
        let next_version = expected_version + 1;
        let document = MongoSessionDocument::new(session, next_version);

        let result = collection
            .replace_one(doc_id_at_version(id, expected_version), &document)
            .await
            .map_err(|source| MongoDaoError::StoreSession { id, source })?;

        if result.matched_count == 0 {
            // Either the document is gone or another writer bumped the
            // version first; a plain read tells the two apart.
            return match self.find_session(id).await? {
                Some(current) => Err(StorageError::Conflict {
                    id,
                    expected: expected_version,
                    actual: current.version,
                }),
                None => Err(StorageError::NotFound {
                    what: format!("session `{id}`"),
                }),
            };
        }

        self.publish(document.into());
        Ok(next_version)
    }

    async fn watch_session(
        &self,
        id: Uuid,
    ) -> StorageResult<Option<watch::Receiver<VersionedSession>>> {
        if let Some(sender) = self.inner.watchers.get(&id) {
            return Ok(Some(sender.subscribe()));
        }

        let Some(current) = self.find_session(id).await? else {
            return Ok(None);
        };

        let receiver = self
            .inner
            .watchers
            .entry(id)
            .or_insert_with(|| watch::channel(current).0)
            .subscribe();
        Ok(Some(receiver))
    }
}

impl SessionStore for MongoSessionStore {
    fn create(&self, session: GameSession) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.create_session(session).await })
    }

    fn get(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<VersionedSession>>> {
        let store = self.clone();
        Box::pin(async move { store.find_session(id).await })
    }

    fn update(
        &self,
        id: Uuid,
        expected_version: u64,
        session: GameSession,
    ) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.replace_session(id, expected_version, session).await })
    }

    fn watch(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<watch::Receiver<VersionedSession>>>> {
        let store = self.clone();
        Box::pin(async move { store.watch_session(id).await })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
