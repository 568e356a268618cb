//! Request, response, and stream payloads exposed over HTTP.

use std::time::SystemTime;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Leaderboard projections.
pub mod board;
/// Health endpoint payloads.
pub mod health;
/// Session lifecycle requests and outcomes.
pub mod session;

pub(crate) fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
