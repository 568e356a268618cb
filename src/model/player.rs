use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Role granted to a player by the identity layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerRole {
    /// Full administrative rights, including the optional turn override.
    Admin,
    /// May author topics and questions (workflow outside this crate).
    Editor,
    /// Regular participant.
    Player,
}

/// Durable player record owned by the Player Directory.
///
/// Statistics fields are only ever written by the completion rollup; the
/// identity layer creates the record on first login and maintains
/// `last_login_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    /// Opaque stable identifier issued by the identity layer.
    pub id: String,
    /// Name shown to other players.
    pub display_name: String,
    /// External avatar URL, when the identity provider supplied one.
    pub avatar_url: Option<String>,
    /// Role for authorization decisions.
    pub role: PlayerRole,
    /// Number of completed sessions this player took part in.
    pub games_played: u32,
    /// Number of completed sessions this player won (ties count).
    pub games_won: u32,
    /// Sum of session scores; session scores can be negative.
    pub total_points: i64,
    /// First-login timestamp.
    pub created_at: SystemTime,
    /// Most recent login timestamp.
    pub last_login_at: SystemTime,
}

impl Player {
    /// Holds the `games_won <= games_played` invariant; seed data is
    /// rejected when it does not.
    pub fn stats_consistent(&self) -> bool {
        self.games_won <= self.games_played
    }
}
