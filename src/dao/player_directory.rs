use futures::future::BoxFuture;

use crate::dao::storage::StorageResult;
use crate::model::Player;

/// Partial statistics update written by the completion rollup.
///
/// Fields carry absolute new values; `None` leaves the stored value
/// untouched. Identity fields (name, avatar, role) are owned by the
/// out-of-scope identity layer and cannot be patched here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsPatch {
    /// New `games_played` value.
    pub games_played: Option<u32>,
    /// New `games_won` value.
    pub games_won: Option<u32>,
    /// New `total_points` value.
    pub total_points: Option<i64>,
}

/// Access to durable player records.
///
/// The engine reads players when snapshotting them into a session and
/// writes exactly once per participant per completion rollup.
pub trait PlayerDirectory: Send + Sync {
    /// Fetch one player by directory id.
    fn get(&self, id: String) -> BoxFuture<'static, StorageResult<Option<Player>>>;

    /// Apply a statistics patch to one player; fails with
    /// [`StorageError::NotFound`](crate::dao::storage::StorageError) when
    /// the player does not exist.
    fn update_stats(&self, id: String, patch: StatsPatch)
    -> BoxFuture<'static, StorageResult<()>>;

    /// All known players, used by the global leaderboard projection.
    fn list(&self) -> BoxFuture<'static, StorageResult<Vec<Player>>>;
}
