//! Configuration file support
//!
//! Settings come from `reqcheck.toml` next to the manifest (or the file given
//! with `--config`). Every key is optional; command-line flags override it.

use crate::error::ConfigError;
use crate::registry::PYPI_API_URL;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the configuration file looked up next to the manifest
pub const CONFIG_FILE_NAME: &str = "reqcheck.toml";

/// Default manifest file name
pub const DEFAULT_MANIFEST: &str = "requirements.txt";

/// Default interpreter used to run the installer
pub const DEFAULT_PYTHON: &str = "python3";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONCURRENCY: usize = 8;

/// Tool settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Manifest path used when none is given on the command line
    pub manifest: PathBuf,
    /// Interpreter whose environment is inspected and installed into
    pub python: String,
    /// Base URL of the PyPI-compatible JSON API
    pub index_url: String,
    /// Per-request timeout for index lookups
    pub timeout_secs: u64,
    /// Maximum concurrent index lookups
    pub concurrency: usize,
    /// Extra arguments appended to the installer command
    pub pip_args: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            python: DEFAULT_PYTHON.to_string(),
            index_url: PYPI_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            concurrency: DEFAULT_CONCURRENCY,
            pip_args: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from `explicit`, or from `dir/reqcheck.toml` if present
    ///
    /// A missing implicit file yields the defaults; a missing explicit one is an error.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = dir.join(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    tracing::debug!("no {} in {}", CONFIG_FILE_NAME, dir.display());
                    return Ok(Self::default());
                }
                candidate
            }
        };

        tracing::debug!("loading settings from {}", path.display());
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            source: e,
        })?;
        Self::from_toml(&content, &path)
    }

    /// Parse and validate settings from TOML text; `path` is used in errors
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that parse but cannot be used
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::invalid_value(
                "concurrency",
                "must be at least 1",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "timeout_secs",
                "must be at least 1",
            ));
        }
        if !(self.index_url.starts_with("http://") || self.index_url.starts_with("https://")) {
            return Err(ConfigError::invalid_value(
                "index_url",
                format!("'{}' is not an http(s) URL", self.index_url),
            ));
        }
        if self.python.trim().is_empty() {
            return Err(ConfigError::invalid_value("python", "must not be empty"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
