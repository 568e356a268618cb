//! Application-level configuration loading: scoring table, lifeline
//! defaults, turn policy, and seed file locations.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::model::LifelineAllotment;
use crate::services::{access::TurnPolicy, scoring::ScoreTable};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "QUIZ_ARENA_CONFIG_PATH";

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    score_table: ScoreTable,
    turn_policy: TurnPolicy,
    default_lifelines: LifelineAllotment,
    seeds: SeedPaths,
}

/// Optional seed files loaded into the in-memory collaborators at startup.
#[derive(Debug, Clone, Default)]
pub struct SeedPaths {
    /// JSON array of questions for the in-memory question bank.
    pub questions: Option<PathBuf>,
    /// JSON array of players for the in-memory player directory.
    pub players: Option<PathBuf>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// built-in defaults when the file is absent or malformed.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration");
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Difficulty → magnitude table used by answer grading.
    pub fn score_table(&self) -> &ScoreTable {
        &self.score_table
    }

    /// Turn-override policy applied by the capability check.
    pub fn turn_policy(&self) -> TurnPolicy {
        self.turn_policy
    }

    /// Lifeline counts granted when a creation request does not set its own.
    pub fn default_lifelines(&self) -> LifelineAllotment {
        self.default_lifelines
    }

    /// Seed file locations.
    pub fn seeds(&self) -> &SeedPaths {
        &self.seeds
    }
}

/// JSON representation of the configuration file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    score_magnitudes: Option<Vec<i64>>,
    #[serde(default)]
    admin_override: Option<bool>,
    #[serde(default)]
    lifelines: Option<RawLifelines>,
    #[serde(default)]
    seeds: Option<RawSeeds>,
}

#[derive(Debug, Deserialize)]
struct RawLifelines {
    #[serde(default)]
    external_helps: u32,
    #[serde(default)]
    fifty_fifties: u32,
    #[serde(default)]
    switches: u32,
}

#[derive(Debug, Deserialize)]
struct RawSeeds {
    #[serde(default)]
    questions: Option<PathBuf>,
    #[serde(default)]
    players: Option<PathBuf>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let score_table = match raw.score_magnitudes {
            Some(magnitudes) => match ScoreTable::from_magnitudes(magnitudes) {
                Ok(table) => table,
                Err(err) => {
                    warn!(error = %err, "rejecting configured score table; using default");
                    ScoreTable::default()
                }
            },
            None => ScoreTable::default(),
        };

        let turn_policy = TurnPolicy {
            admin_override: raw.admin_override.unwrap_or(false),
        };

        let default_lifelines = raw
            .lifelines
            .map(|lifelines| LifelineAllotment {
                external_helps: lifelines.external_helps,
                fifty_fifties: lifelines.fifty_fifties,
                switches: lifelines.switches,
            })
            .unwrap_or_default();

        let seeds = raw
            .seeds
            .map(|seeds| SeedPaths {
                questions: seeds.questions,
                players: seeds.players,
            })
            .unwrap_or_default();

        Self {
            score_table,
            turn_policy,
            default_lifelines,
            seeds,
        }
    }
}

#[cfg(test)]
impl AppConfig {
    /// Test-only constructor with an explicit turn policy.
    pub(crate) fn with_turn_policy(turn_policy: TurnPolicy) -> Self {
        Self {
            turn_policy,
            ..Self::default()
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_config_defaults_apply_when_fields_are_absent() {
        let raw: RawConfig = serde_json::from_str("{}").unwrap();
        let config: AppConfig = raw.into();

        assert_eq!(config.score_table(), &ScoreTable::default());
        assert!(!config.turn_policy().admin_override);
        assert_eq!(config.default_lifelines(), LifelineAllotment::default());
        assert!(config.seeds().questions.is_none());
    }

    #[test]
    fn invalid_score_table_falls_back_to_default() {
        let raw: RawConfig =
            serde_json::from_str(r#"{"score_magnitudes": [30, 10]}"#).unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.score_table(), &ScoreTable::default());
    }

    #[test]
    fn full_config_parses() {
        let raw: RawConfig = serde_json::from_str(
            r#"{
                "score_magnitudes": [5, 15, 45],
                "admin_override": true,
                "lifelines": {"external_helps": 1, "fifty_fifties": 2, "switches": 1},
                "seeds": {"questions": "config/questions.json"}
            }"#,
        )
        .unwrap();
        let config: AppConfig = raw.into();

        assert_eq!(config.score_table().magnitude(3), 45);
        assert!(config.turn_policy().admin_override);
        assert_eq!(config.default_lifelines().fifty_fifties, 2);
        assert_eq!(
            config.seeds().questions.as_deref(),
            Some(std::path::Path::new("config/questions.json"))
        );
    }
}
