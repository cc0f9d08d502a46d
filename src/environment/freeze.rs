//! Freeze file reader
//!
//! Handles the installer's freeze listing:
//! - `name==version` per line
//! - `#` comments and blank lines
//! - editable (`-e ...`) and direct-reference (`name @ url`) lines, which are skipped

use super::EnvironmentProbe;
use crate::domain::{InstalledPackages, Version};
use crate::error::EnvironmentError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static PINNED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[A-Za-z0-9][A-Za-z0-9._-]*)\s*===?\s*(?P<version>\S+)$").unwrap()
});

/// Probe backed by a freeze file on disk
#[derive(Debug, Clone)]
pub struct FreezeFileProbe {
    path: PathBuf,
}

impl FreezeFileProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EnvironmentProbe for FreezeFileProbe {
    fn installed(&self) -> Result<InstalledPackages, EnvironmentError> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| EnvironmentError::ReadError {
                path: self.path.clone(),
                source: e,
            })?;
        parse_freeze(&content, &self.path)
    }

    fn describe(&self) -> String {
        format!("freeze file {}", self.path.display())
    }
}

/// Parse freeze file content; `path` is only used in error messages
pub fn parse_freeze(content: &str, path: &Path) -> Result<InstalledPackages, EnvironmentError> {
    let mut installed = InstalledPackages::new();

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if trimmed.starts_with('-') || trimmed.contains(" @ ") {
            tracing::debug!("skipping unpinned freeze entry: {}", trimmed);
            continue;
        }

        let caps = PINNED_RE
            .captures(trimmed)
            .ok_or_else(|| EnvironmentError::FreezeParse {
                path: path.to_path_buf(),
                line: idx + 1,
                content: line.to_string(),
            })?;

        match Version::parse(&caps["version"]) {
            Ok(version) => installed.insert(&caps["name"], version),
            Err(e) => tracing::warn!("ignoring {}: {}", &caps["name"], e),
        }
    }

    Ok(installed)
}
