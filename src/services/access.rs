use crate::model::{GameSession, PlayerRole};

/// Policy switch resolving whether administrators may act on behalf of the
/// turn holder. Kept as one explicit flag instead of per-call special
/// cases; defaults to off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnPolicy {
    /// When true, a caller with the Admin role passes the turn check even
    /// when it is not their turn.
    pub admin_override: bool,
}

/// Identity attempting a turn-scoped action.
///
/// The role is only resolved (via the Player Directory) when the override
/// path could apply; `None` means "not looked up".
#[derive(Debug, Clone)]
pub struct Actor {
    /// Directory id declared by the caller.
    pub player_id: String,
    /// Directory role, when it was resolved.
    pub role: Option<PlayerRole>,
}

impl Actor {
    /// Actor without a resolved role.
    pub fn player(player_id: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            role: None,
        }
    }
}

/// Capability check for turn-scoped commands: the turn holder may always
/// act; anyone else only via the admin override. Pure so it can be tested
/// without any store.
pub fn may_act(policy: TurnPolicy, actor: &Actor, session: &GameSession) -> bool {
    if actor.player_id == session.current_turn_player_id {
        return true;
    }
    policy.admin_override && actor.role == Some(PlayerRole::Admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GameSession, Language, LifelineAllotment, Player, SessionPlayer};
    use std::time::SystemTime;

    fn session_with_turn(turn_holder: &str) -> GameSession {
        let players = ["alice", "bob"]
            .iter()
            .map(|id| {
                let player = Player {
                    id: (*id).into(),
                    display_name: (*id).into(),
                    avatar_url: None,
                    role: PlayerRole::Player,
                    games_played: 0,
                    games_won: 0,
                    total_points: 0,
                    created_at: SystemTime::now(),
                    last_login_at: SystemTime::now(),
                };
                SessionPlayer::snapshot_of(&player, LifelineAllotment::default())
            })
            .collect();

        let mut session = GameSession::new(
            "game".into(),
            Language::En,
            "alice".into(),
            players,
            Vec::new(),
        );
        session.current_turn_player_id = turn_holder.into();
        session
    }

    #[test]
    fn turn_holder_may_always_act() {
        let session = session_with_turn("bob");
        let actor = Actor::player("bob");
        assert!(may_act(TurnPolicy::default(), &actor, &session));
    }

    #[test]
    fn other_players_are_rejected() {
        let session = session_with_turn("bob");
        let actor = Actor::player("alice");
        assert!(!may_act(TurnPolicy::default(), &actor, &session));
    }

    #[test]
    fn admin_passes_only_when_override_is_enabled() {
        let session = session_with_turn("bob");
        let admin = Actor {
            player_id: "alice".into(),
            role: Some(PlayerRole::Admin),
        };

        assert!(!may_act(TurnPolicy::default(), &admin, &session));
        assert!(may_act(
            TurnPolicy {
                admin_override: true
            },
            &admin,
            &session
        ));
    }

    #[test]
    fn non_admin_roles_never_override() {
        let session = session_with_turn("bob");
        let editor = Actor {
            player_id: "alice".into(),
            role: Some(PlayerRole::Editor),
        };
        assert!(!may_act(
            TurnPolicy {
                admin_override: true
            },
            &editor,
            &session
        ));
    }
}
