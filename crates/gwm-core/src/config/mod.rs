//! Configuration management for gw-manager
//!
//! The configuration is a YAML file listing the applications the operator
//! manages, the address of the local gateway agent, and the path of the
//! state database. It is loaded once per invocation and passed explicitly
//! to whatever needs it.

mod app;

pub use app::{AppConfig, GatewayAddress};

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Database file used when the config file doesn't name one
pub const DEFAULT_DB_PATH: &str = "manager.db";

/// Get the default configuration file path
pub fn default_config_path() -> PathBuf {
    PathBuf::from("./config.yml")
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Applications keyed by the name operators pass as `--app-name`
    #[serde(default)]
    pub apps: BTreeMap<String, AppConfig>,

    /// Local gateway agent address
    #[serde(default)]
    pub gateway_address: GatewayAddress,

    /// State database path
    #[serde(default)]
    pub db: Option<PathBuf>,
}

impl Config {
    /// Look up an application by name
    pub fn app(&self, name: &str) -> Result<&AppConfig, ConfigError> {
        self.apps
            .get(name)
            .ok_or_else(|| ConfigError::UnknownApp(name.to_string()))
    }

    /// State database path, falling back to [`DEFAULT_DB_PATH`]
    pub fn db_path(&self) -> PathBuf {
        match &self.db {
            Some(path) if !path.as_os_str().is_empty() => path.clone(),
            _ => PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

/// Load configuration from a YAML file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config: T = serde_yaml::from_str(&content)?;
    Ok(config)
}
