//! Configuration schema for simulation runs and event logging.
//!
//! Every field has a default, so an empty YAML document is a valid config.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(&'static str),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Simulation settings (`thirty sim`).
    #[serde(default)]
    pub sim: SimConfig,
    /// NDJSON event logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Simulation configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimConfig {
    /// Number of games to play.
    #[serde(default = "default_sim_games")]
    pub games: u32,
    /// Base seed; game `i` uses `seed + i`.
    #[serde(default)]
    pub seed: u64,
    /// Use the event-keyed dice stream instead of a ChaCha8 PRNG.
    ///
    /// Event-keyed games are reproducible from the game seed alone, even when
    /// the policy changes how many throws it uses.
    #[serde(default = "default_sim_deterministic_chance")]
    pub deterministic_chance: bool,
}

fn default_sim_games() -> u32 {
    1000
}

fn default_sim_deterministic_chance() -> bool {
    true
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            games: default_sim_games(),
            seed: 0,
            deterministic_chance: default_sim_deterministic_chance(),
        }
    }
}

/// Event logging configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Optional NDJSON file for per-round and per-game events.
    #[serde(default)]
    pub events_path: Option<String>,
    /// Flush the event log every N lines (0 disables periodic flushing).
    #[serde(default = "default_flush_every_lines")]
    pub flush_every_lines: u64,
}

fn default_flush_every_lines() -> u64 {
    100
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            events_path: None,
            flush_every_lines: default_flush_every_lines(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config = Self::parse_yaml(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse without validating, for callers that override fields first.
    pub fn parse_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document parses as null; treat it as all defaults.
        if yaml.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sim.games == 0 {
            return Err(ConfigError::Invalid("sim.games must be > 0"));
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_string() {
        let yaml = r#"
sim:
  games: 250
  seed: 42
  deterministic_chance: false

logging:
  events_path: "out/events.ndjson"
  flush_every_lines: 10
"#;

        let config = Config::from_yaml(yaml).expect("Failed to parse YAML");
        assert_eq!(config.sim.games, 250);
        assert_eq!(config.sim.seed, 42);
        assert!(!config.sim.deterministic_chance);
        assert_eq!(
            config.logging.events_path.as_deref(),
            Some("out/events.ndjson")
        );
        assert_eq!(config.logging.flush_every_lines, 10);
    }

    #[test]
    fn test_defaults_are_applied() {
        let config = Config::from_yaml("sim:\n  seed: 7\n").expect("Failed to parse YAML");
        assert_eq!(config.sim.seed, 7);
        assert_eq!(config.sim.games, 1000);
        assert!(config.sim.deterministic_chance);
        assert_eq!(config.logging, LoggingConfig::default());

        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.yaml");
        let mut config = Config::default();
        config.sim.games = 12;
        std::fs::write(&path, config.to_yaml().unwrap()).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_zero_games_rejected() {
        let err = Config::from_yaml("sim:\n  games: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_parse_defers_validation() {
        let mut config = Config::parse_yaml("sim:\n  games: 0\n").unwrap();
        assert!(config.validate().is_err());
        config.sim.games = 5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_yaml_fails() {
        let invalid_yaml = "this is not: valid: yaml: {{{}}}";
        let result = Config::from_yaml(invalid_yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Config::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
