/// Durable player records and roles.
pub mod player;
/// Immutable quiz questions and answers.
pub mod question;
/// The game session aggregate and its embedded records.
pub mod session;

pub use player::{Player, PlayerRole};
pub use question::{Answer, Language, Question};
pub use session::{
    GameSession, LifelineAllotment, LifelineKind, PlayerAnswer, SessionPlayer, SessionStatus,
};
