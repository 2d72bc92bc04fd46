//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory where gaze exports are written by default.
    pub export_dir: PathBuf,

    /// Sampling engine settings.
    pub engine: EngineConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Sampling engine parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sampling period used while tracking (ms).
    pub tracking_period_ms: u32,

    /// Sampling period applied on every `start_recording` (ms).
    pub recording_period_ms: u32,

    /// Recording stops by itself once a session runs longer than this (ms).
    pub max_session_ms: u32,

    /// Number of samples reserved in the gaze log when recording starts.
    pub log_capacity_hint: usize,

    /// Sleep between state checks while stopped (µs).
    pub idle_poll_us: u64,

    /// How the loop waits for the next tick.
    pub scheduler: SchedulerKind,
}

/// Deadline waiting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchedulerKind {
    /// Poll the clock until the deadline. Burns a core, sub-ms precise.
    BusySpin,
    /// Sleep until `spin_window_us` before the deadline, then spin.
    Hybrid { spin_window_us: u64 },
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "gazetrack_engine=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            export_dir: dirs_default_exports(),
            engine: EngineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tracking_period_ms: 1,
            recording_period_ms: 1,
            max_session_ms: 60_000,
            // ~10 s at 1 kHz
            log_capacity_hint: 10_000,
            idle_poll_us: 200,
            scheduler: SchedulerKind::BusySpin,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl EngineConfig {
    /// Reject settings the sampling loop cannot run with.
    pub fn validate(&self) -> crate::error::GazeResult<()> {
        if self.tracking_period_ms == 0 {
            return Err(crate::error::GazeError::InvalidSamplingPeriod {
                ms: self.tracking_period_ms,
            });
        }
        if self.recording_period_ms == 0 {
            return Err(crate::error::GazeError::InvalidSamplingPeriod {
                ms: self.recording_period_ms,
            });
        }
        if self.max_session_ms == 0 {
            return Err(crate::error::GazeError::config(
                "max_session_ms must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from `path`, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to `path`, creating parent directories.
    pub fn save_to(&self, config_path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("gazetrack").join("config.json")
}

/// Default export directory.
fn dirs_default_exports() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("gazetrack").join("exports")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_defaults_match_reference_timing() {
        let config = EngineConfig::default();
        assert_eq!(config.recording_period_ms, 1);
        assert_eq!(config.max_session_ms, 60_000);
        assert_eq!(config.log_capacity_hint, 10_000);
        assert_eq!(config.scheduler, SchedulerKind::BusySpin);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_period_is_rejected() {
        let config = EngineConfig {
            recording_period_ms: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(crate::error::GazeError::InvalidSamplingPeriod { ms: 0 })
        ));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let raw = r#"{ "engine": { "max_session_ms": 5000, "scheduler": { "kind": "hybrid", "spin_window_us": 300 } } }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.engine.max_session_ms, 5000);
        assert_eq!(config.engine.recording_period_ms, 1);
        assert_eq!(
            config.engine.scheduler,
            SchedulerKind::Hybrid {
                spin_window_us: 300
            }
        );
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.engine.tracking_period_ms, config.engine.tracking_period_ms);
        assert_eq!(parsed.export_dir, config.export_dir);
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = std::env::temp_dir().join("gazetrack_test_config_save");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("gazetrack").join("config.json");

        let mut config = AppConfig::default();
        config.engine.max_session_ms = 12_345;
        config.engine.scheduler = SchedulerKind::Hybrid {
            spin_window_us: 250,
        };
        config.logging.json = true;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.engine.max_session_ms, 12_345);
        assert_eq!(
            loaded.engine.scheduler,
            SchedulerKind::Hybrid {
                spin_window_us: 250
            }
        );
        assert!(loaded.logging.json);
        assert_eq!(loaded.export_dir, config.export_dir);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_falls_back_on_missing_or_bad_file() {
        let dir = std::env::temp_dir().join("gazetrack_test_config_bad");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let missing = AppConfig::load_from(&dir.join("absent.json"));
        assert_eq!(missing.engine.max_session_ms, 60_000);

        let bad = dir.join("config.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert_eq!(AppConfig::load_from(&bad).engine.max_session_ms, 60_000);

        std::fs::remove_dir_all(&dir).ok();
    }
}
