//! Application-level configuration loading, including the game timings.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::game::clock::Millis;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TRIVIA_BUZZER_CONFIG_PATH";

/// Durations driving every timer of the session, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct GameTimings {
    /// Race window counted from the first buzz.
    pub race_window_ms: Millis,
    /// Delay between the start of a round and its prize reveal.
    pub spin_delay_ms: Millis,
    /// Duration of a hint vote.
    pub vote_window_ms: Millis,
    /// Length of the Hint mode question clock.
    pub hint_clock_ms: Millis,
    /// How long a silencer holds a buzzer down.
    pub silence_ms: Millis,
    /// Time a team has to answer a double-jeopardy offer.
    pub wager_window_ms: Millis,
    /// Length of the Hyper Focus clock.
    pub focus_clock_ms: Millis,
}

impl Default for GameTimings {
    fn default() -> Self {
        Self {
            race_window_ms: 3_500,
            spin_delay_ms: 4_000,
            vote_window_ms: 10_000,
            hint_clock_ms: 60_000,
            silence_ms: 1_500,
            wager_window_ms: 10_000,
            focus_clock_ms: 60_000,
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    timings: GameTimings,
}

impl AppConfig {
    /// Build a configuration around explicit timings.
    pub fn with_timings(timings: GameTimings) -> Self {
        Self { timings }
    }

    /// Load the application configuration from disk, falling back to the built-in timings.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        timings = ?app_config.timings,
                        "loaded game timings from config"
                    );
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

    /// Timer durations for the session.
    pub fn timings(&self) -> &GameTimings {
        &self.timings
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    timings: GameTimings,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            timings: value.timings,
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
    fn partial_timings_keep_the_remaining_defaults() {
        let raw: RawConfig =
            serde_json::from_str(r#"{"timings":{"race_window_ms":5000}}"#).unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.timings().race_window_ms, 5_000);
        assert_eq!(config.timings().vote_window_ms, 10_000);
        assert_eq!(config.timings().silence_ms, 1_500);
    }

    #[test]
    fn empty_file_uses_built_in_timings() {
        let raw: RawConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(*AppConfig::from(raw).timings(), GameTimings::default());
    }
}
