//! `cotlab.toml` configuration.
//!
//! Every field has a default, so an empty file (or no file at all) gives the
//! stock layout: `commodities.db` next to a `raw_data/` directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "cotlab.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CotlabConfig {
    pub database: DatabaseConfig,
    pub ingest: IngestConfig,
    pub dashboard: DashboardConfig,
    pub prices: PricesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file; created on first use.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("commodities.db"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IngestConfig {
    /// Directory scanned for `COT_*.xls` / `COT_*.xlsx`.
    pub raw_data_dir: PathBuf,
    /// File names under `raw_data_dir` used when the scan finds nothing.
    pub default_files: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            raw_data_dir: PathBuf::from("raw_data"),
            default_files: vec![
                "COT_FutsOnly_2023.xls".into(),
                "COT_FutsOnly_2024.xls".into(),
                "COT_FutsOnly_2025.xls".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub bind: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8501".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PricesConfig {
    /// Window fetched by `fetch-prices` when no start date is given.
    pub lookback_days: u32,
    /// Pause between consecutive Yahoo requests.
    pub request_delay_ms: u64,
}

impl Default for PricesConfig {
    fn default() -> Self {
        Self {
            lookback_days: 365,
            request_delay_ms: 500,
        }
    }
}

impl CotlabConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// An explicit path must exist; otherwise `cotlab.toml` is used when
    /// present and defaults when not.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Serialize the config to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
