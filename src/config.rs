use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domains::patrol::OptimizerSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub optimizer: OptimizerSettings,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub patrol: PatrolConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one JSON-lines event file per patrol path.
    pub event_dir: PathBuf,
    /// Root of the waypoint import sources; falls back to `PATROL_DATA_DIR`.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: Option<String>,
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolConfig {
    /// Speed used for time estimates when a request carries no speed limit.
    pub default_speed: f64,
}

impl Config {
    /// Read a plain TOML file.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("reading {}", path.as_ref().display()))?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Layer defaults, an optional TOML file and `PATROL__*` environment
    /// variables (e.g. `PATROL__OPTIMIZER__GRID_SIZE=20`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = config::Config::try_from(&Config::default())?;
        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix("PATROL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.optimizer.validate()?;
        if !(self.patrol.default_speed > 0.0) {
            anyhow::bail!("patrol.default_speed must be positive");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            optimizer: OptimizerSettings::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
            patrol: PatrolConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            event_dir: PathBuf::from("/tmp/patrol-fleet-events"),
            data_dir: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self { default_speed: 1.5 }
    }
}
