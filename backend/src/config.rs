//! Dashboard configuration.
//!
//! Settings come from a YAML file and are then overridden by environment
//! variables. The file is looked up in this order:
//!
//! 1. the path in `DASHBOARD_CONFIG`
//! 2. `./dashboard.yaml`
//! 3. `<platform config dir>/finance-dashboard/config.yaml`
//!
//! When none exists the defaults are used.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::domain::debounce::DEFAULT_SEARCH_DEBOUNCE;

pub const CONFIG_PATH_ENV: &str = "DASHBOARD_CONFIG";
pub const SOURCE_URL_ENV: &str = "DASHBOARD_SOURCE_URL";
pub const SOURCE_FILE_ENV: &str = "DASHBOARD_SOURCE_FILE";
pub const BIND_ADDR_ENV: &str = "DASHBOARD_BIND_ADDR";
pub const SEARCH_DEBOUNCE_ENV: &str = "DASHBOARD_SEARCH_DEBOUNCE_MS";

const LOCAL_CONFIG_FILE: &str = "dashboard.yaml";
const APP_CONFIG_DIR: &str = "finance-dashboard";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Where the transaction data comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Spreadsheet web app URL
    pub url: Option<String>,
    /// Local JSON file with the same payload; wins over `url`
    pub file: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            file: None,
            timeout_secs: 15,
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub bind_addr: SocketAddr,
    pub source: SourceConfig,
    pub search_debounce_ms: u64,
    /// Origin allowed by CORS; any origin when unset
    pub allowed_origin: Option<String>,
    /// Built front-end bundle served for non-API paths
    pub static_dir: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            source: SourceConfig::default(),
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE.as_millis() as u64,
            allowed_origin: None,
            static_dir: None,
        }
    }
}

impl DashboardConfig {
    /// Load the config file (if any) and apply environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::locate_file() {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                info!("No configuration file found, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn locate_file() -> Option<PathBuf> {
        if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(explicit));
        }
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_CONFIG_DIR).join("config.yaml"))
            .filter(|path| path.is_file())
    }

    /// Apply overrides from `lookup` (the process environment in production)
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(SOURCE_URL_ENV) {
            self.source.url = Some(url);
        }
        if let Some(file) = lookup(SOURCE_FILE_ENV) {
            self.source.file = Some(PathBuf::from(file));
        }
        if let Some(addr) = lookup(BIND_ADDR_ENV) {
            self.bind_addr = addr.parse().map_err(|_| ConfigError::InvalidValue {
                key: BIND_ADDR_ENV,
                value: addr.clone(),
            })?;
        }
        if let Some(ms) = lookup(SEARCH_DEBOUNCE_ENV) {
            self.search_debounce_ms = ms.parse().map_err(|_| ConfigError::InvalidValue {
                key: SEARCH_DEBOUNCE_ENV,
                value: ms.clone(),
            })?;
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}
