use futures::future::BoxFuture;
use tokio::sync::watch;
use uuid::Uuid;

use crate::dao::storage::StorageResult;
use crate::model::GameSession;

/// A session document paired with the store version it was read at.
///
/// The version is the optimistic-concurrency token: a mutating operation
/// reads `(session, version)`, computes the next state, and writes back
/// conditioned on the version being unchanged.
#[derive(Debug, Clone)]
pub struct VersionedSession {
    /// The stored document.
    pub session: GameSession,
    /// Monotonically increasing document version, starting at 1.
    pub version: u64,
}

/// Abstraction over the versioned session document store.
///
/// Implementations are shared across any number of engine tasks; all write
/// serialization comes from the conditional-update contract, never from
/// locks held by callers.
pub trait SessionStore: Send + Sync {
    /// Persist a brand-new session; fails if the id is already taken.
    fn create(&self, session: GameSession) -> BoxFuture<'static, StorageResult<u64>>;

    /// Fetch a session together with its current version.
    fn get(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<VersionedSession>>>;

    /// Replace the stored document iff its version still equals
    /// `expected_version`, returning the new version on success and
    /// [`StorageError::Conflict`](crate::dao::storage::StorageError) when a
    /// concurrent write got there first.
    fn update(
        &self,
        id: Uuid,
        expected_version: u64,
        session: GameSession,
    ) -> BoxFuture<'static, StorageResult<u64>>;

    /// Subscribe to change notifications for one session.
    ///
    /// The receiver is seeded with the current document; every committed
    /// write publishes a fresh snapshot. Returns `None` for unknown ids.
    fn watch(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<watch::Receiver<VersionedSession>>>>;

    /// Cheap connectivity probe used by the health endpoint and supervisor.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;

    /// Attempt to re-establish a broken backend connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
