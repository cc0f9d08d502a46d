//! Installed package listing via `python -m pip list --format=json`

use super::EnvironmentProbe;
use crate::domain::{InstalledPackages, Version};
use crate::error::EnvironmentError;
use serde::Deserialize;
use std::process::Command;

/// Arguments passed to the interpreter to list installed packages
const LIST_ARGS: [&str; 5] = [
    "-m",
    "pip",
    "list",
    "--format=json",
    "--disable-pip-version-check",
];

/// One entry of the installer's JSON listing
#[derive(Debug, Deserialize)]
struct PipListEntry {
    name: String,
    version: String,
}

/// Probe that asks a Python interpreter's installer what is installed
#[derive(Debug, Clone)]
pub struct PipProbe {
    python: String,
}

impl PipProbe {
    /// Create a probe for the given interpreter executable
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }

    /// The command line this probe runs
    pub fn command_line(&self) -> String {
        std::iter::once(self.python.as_str())
            .chain(LIST_ARGS)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl EnvironmentProbe for PipProbe {
    fn installed(&self) -> Result<InstalledPackages, EnvironmentError> {
        let command = self.command_line();
        tracing::debug!("running {}", command);

        let output = Command::new(&self.python)
            .args(LIST_ARGS)
            .output()
            .map_err(|e| EnvironmentError::command_failed(&command, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EnvironmentError::command_failed(
                &command,
                format!("{}: {}", output.status, stderr.trim()),
            ));
        }

        parse_pip_list(&String::from_utf8_lossy(&output.stdout), &command)
    }

    fn describe(&self) -> String {
        format!("environment of {}", self.python)
    }
}

/// Parse the installer's JSON package listing
pub fn parse_pip_list(json: &str, command: &str) -> Result<InstalledPackages, EnvironmentError> {
    let entries: Vec<PipListEntry> = serde_json::from_str(json.trim())
        .map_err(|e| EnvironmentError::invalid_output(command, e.to_string()))?;

    let mut installed = InstalledPackages::new();
    for entry in entries {
        match Version::parse(&entry.version) {
            Ok(version) => installed.insert(entry.name, version),
            Err(e) => tracing::warn!("ignoring installed package {}: {}", entry.name, e),
        }
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pip_list() {
        let json = r#"[
            {"name": "appdirs", "version": "1.4.4"},
            {"name": "Pygments", "version": "2.17.2"},
            {"name": "toposort", "version": "1.10"}
        ]"#;
        let installed = parse_pip_list(json, "pip list").unwrap();
        assert_eq!(installed.len(), 3);
        assert_eq!(
            installed.version_of("pygments"),
            Some(&Version::parse("2.17.2").unwrap())
        );
    }

    #[test]
    fn test_parse_pip_list_extra_fields() {
        let json = r#"[{"name": "porcupine", "version": "2024.3.31", "editable_project_location": "/src"}]"#;
        let installed = parse_pip_list(json, "pip list").unwrap();
        assert!(installed.get("porcupine").is_some());
    }

    #[test]
    fn test_parse_pip_list_empty() {
        assert!(parse_pip_list("[]\n", "pip list").unwrap().is_empty());
    }

    #[test]
    fn test_parse_pip_list_skips_bad_versions() {
        let json = r#"[{"name": "odd", "version": "unknown"}, {"name": "requests", "version": "2.31.0"}]"#;
        let installed = parse_pip_list(json, "pip list").unwrap();
        assert_eq!(installed.len(), 1);
    }

    #[test]
    fn test_parse_pip_list_invalid_json() {
        let err = parse_pip_list("ERROR: No module named pip", "python3 -m pip list").unwrap_err();
        assert!(matches!(err, EnvironmentError::InvalidOutput { .. }));
    }

    #[test]
    fn test_command_line() {
        let probe = PipProbe::new("python3.11");
        assert_eq!(
            probe.command_line(),
            "python3.11 -m pip list --format=json --disable-pip-version-check"
        );
    }

    #[test]
    fn test_missing_interpreter() {
        let probe = PipProbe::new("/nonexistent/python");
        assert!(matches!(
            probe.installed(),
            Err(EnvironmentError::CommandFailed { .. })
        ));
    }
}
