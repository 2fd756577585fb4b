use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::query::{Granularity, Timeframe};

pub(crate) const CONFIG_FILE: &str = "config.json";
pub(crate) const DB_FILE: &str = "spendlens.db";
pub(crate) const LOG_FILE: &str = "spendlens.log";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// User settings from `config.json`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) default_granularity: String,
    pub(crate) default_timeframe: String,
    /// Note searches shorter than this do not filter. 0 means any non-empty query.
    pub(crate) note_search_min_chars: usize,
    pub(crate) log_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_granularity: Granularity::default().as_str().into(),
            default_timeframe: Timeframe::default().as_str().into(),
            note_search_min_chars: 0,
            log_level: "info".into(),
            data_dir: None,
        }
    }
}

impl AppConfig {
    /// Read `path`; a missing file yields the defaults.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&data)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.default_granularity.parse::<Granularity>()?;
        let timeframe: Timeframe = self.default_timeframe.parse()?;
        if timeframe == Timeframe::Custom {
            anyhow::bail!("default_timeframe cannot be 'custom'");
        }
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            anyhow::bail!(
                "log_level '{}' must be one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            );
        }
        Ok(())
    }

    pub(crate) fn granularity(&self) -> Granularity {
        self.default_granularity.parse().unwrap_or_default()
    }

    pub(crate) fn timeframe(&self) -> Timeframe {
        self.default_timeframe.parse().unwrap_or_default()
    }
}

/// Where configuration, the database and the log file live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Paths {
    pub(crate) config_file: PathBuf,
    pub(crate) data_dir: PathBuf,
}

impl Paths {
    pub(crate) fn resolve() -> Result<Self> {
        let proj_dirs = directories::ProjectDirs::from("com", "spendlens", "SpendLens")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(Self {
            config_file: proj_dirs.config_dir().join(CONFIG_FILE),
            data_dir: proj_dirs.data_dir().to_path_buf(),
        })
    }

    /// Apply the config's `data_dir` override and make sure the directory exists.
    pub(crate) fn with_config(mut self, config: &AppConfig) -> Result<Self> {
        if let Some(dir) = &config.data_dir {
            self.data_dir = dir.clone();
        }
        std::fs::create_dir_all(&self.data_dir).with_context(|| {
            format!(
                "Failed to create data directory: {}",
                self.data_dir.display()
            )
        })?;
        Ok(self)
    }

    pub(crate) fn db_file(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }

    pub(crate) fn log_file(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
