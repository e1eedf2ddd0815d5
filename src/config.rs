//! Service configuration.
//!
//! Values are layered: built-in defaults, then a YAML file, then `KENNEL_*`
//! environment variables, then command-line flags.
//!
//! ```yaml
//! server:
//!   addr: "0.0.0.0:8080"
//! storage:
//!   path: "data/kennel.db"   # omit for an in-memory database
//! views:
//!   dir: "views"             # omit to use the templates built into the binary
//! assets:
//!   dir: "assets"
//! ```

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_CONFIG_PATH: &str = "config/kennel.yaml";
pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub views: ViewsConfig,
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// SQLite database file. `None` keeps everything in memory.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewsConfig {
    /// Template directory overriding the built-in templates.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Directory served under `/assets/`.
    pub dir: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_yaml::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read config '{}': {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "invalid config '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

impl AppConfig {
    /// Load `path`, or [`DEFAULT_CONFIG_PATH`] if it exists, or the defaults.
    ///
    /// An explicitly given path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                if !default.is_file() {
                    debug!(path = DEFAULT_CONFIG_PATH, "No config file, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Apply `KENNEL_ADDR`, `KENNEL_DB_PATH`, `KENNEL_VIEWS_DIR` and
    /// `KENNEL_ASSETS_DIR` from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_lookup(|key| std::env::var(key).ok());
    }

    pub fn apply_lookup(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(addr) = set("KENNEL_ADDR") {
            self.server.addr = addr;
        }
        if let Some(db) = set("KENNEL_DB_PATH") {
            self.storage.path = Some(PathBuf::from(db));
        }
        if let Some(dir) = set("KENNEL_VIEWS_DIR") {
            self.views.dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = set("KENNEL_ASSETS_DIR") {
            self.assets.dir = Some(PathBuf::from(dir));
        }
    }
}
