//! Application-level configuration loading, including the scoring rules.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "QUIZPIN_BACK_CONFIG_PATH";

/// Point interpolation bounds used by the scoring engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringRules {
    /// Floor awarded to a correct answer with no time remaining.
    pub min_points: u32,
    /// Ceiling awarded to a correct answer with full time remaining.
    pub max_points: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            min_points: 250,
            max_points: 1000,
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Scoring interpolation bounds.
    pub scoring: ScoringRules,
    /// Answering time given per question when a session is created.
    pub default_question_duration_seconds: u32,
    /// Grace period after the question deadline during which submissions are
    /// still accepted (scored at the floor).
    pub late_tolerance_ms: i64,
    /// How many PIN draws to attempt before giving up on finding a free one.
    pub pin_attempts: u32,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration");
                    config
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
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringRules::default(),
            default_question_duration_seconds: 20,
            late_tolerance_ms: 2_000,
            pin_attempts: 32,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    min_points: Option<u32>,
    max_points: Option<u32>,
    default_question_duration_seconds: Option<u32>,
    late_tolerance_ms: Option<i64>,
    pin_attempts: Option<u32>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            scoring: ScoringRules {
                min_points: raw.min_points.unwrap_or(defaults.scoring.min_points),
                max_points: raw.max_points.unwrap_or(defaults.scoring.max_points),
            },
            default_question_duration_seconds: raw
                .default_question_duration_seconds
                .unwrap_or(defaults.default_question_duration_seconds),
            late_tolerance_ms: raw.late_tolerance_ms.unwrap_or(defaults.late_tolerance_ms),
            pin_attempts: raw.pin_attempts.unwrap_or(defaults.pin_attempts),
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
    fn defaults_match_documented_rules() {
        let config = AppConfig::default();
        assert_eq!(config.scoring.min_points, 250);
        assert_eq!(config.scoring.max_points, 1000);
        assert_eq!(config.default_question_duration_seconds, 20);
    }

    #[test]
    fn partial_raw_config_keeps_defaults() {
        let raw: RawConfig = serde_json::from_str(r#"{"max_points": 500}"#).unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.scoring.max_points, 500);
        assert_eq!(config.scoring.min_points, 250);
        assert_eq!(config.pin_attempts, 32);
    }
}
