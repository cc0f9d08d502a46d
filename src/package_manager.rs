//! Package manager integration for installing planned requirements
//!
//! This module provides:
//! - The `PackageManagerRunner` seam the installer drives
//! - Execution of `<python> -m pip install ...` for a whole plan

use crate::install::InstallPlan;
use serde::Serialize;
use std::path::Path;
use std::process::{Command, Output};

/// Arguments placed between the interpreter and the specifiers
const INSTALL_ARGS: [&str; 4] = ["-m", "pip", "install", "--disable-pip-version-check"];

/// Result of a package manager installation
#[derive(Debug, Clone, Serialize)]
pub struct InstallResult {
    /// The command that was executed
    pub command: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Standard output from the command
    pub stdout: String,
    /// Standard error from the command
    pub stderr: String,
}

impl InstallResult {
    /// Create a successful install result
    pub fn success(command: String, stdout: String, stderr: String) -> Self {
        Self {
            command,
            success: true,
            stdout,
            stderr,
        }
    }

    /// Create a failed install result
    pub fn failure(command: String, stdout: String, stderr: String) -> Self {
        Self {
            command,
            success: false,
            stdout,
            stderr,
        }
    }
}

/// Trait for running package manager install commands
pub trait PackageManagerRunner {
    /// Run one install command covering every action of `plan`
    fn run_install(&self, plan: &InstallPlan, working_dir: &Path) -> InstallResult;

    /// The command line `run_install` would execute for `plan`
    fn command_line(&self, plan: &InstallPlan) -> String;
}

/// Default package manager runner that executes the interpreter's installer
#[derive(Debug, Clone)]
pub struct SystemPackageManager {
    python: String,
    extra_args: Vec<String>,
}

impl SystemPackageManager {
    /// Create a runner for the given interpreter
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            extra_args: Vec::new(),
        }
    }

    /// Append installer arguments after the specifiers
    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }

    /// Full argv for installing `plan`, interpreter first
    fn build_command(&self, plan: &InstallPlan) -> Vec<String> {
        let mut command = vec![self.python.clone()];
        command.extend(INSTALL_ARGS.iter().map(|s| s.to_string()));
        command.extend(plan.specifiers());
        command.extend(self.extra_args.iter().cloned());
        command
    }

    /// Run a command and capture output
    fn run_command(&self, command: &[String], working_dir: &Path) -> std::io::Result<Output> {
        let Some((program, args)) = command.split_first() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Empty command",
            ));
        };

        Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .output()
    }
}

impl PackageManagerRunner for SystemPackageManager {
    fn run_install(&self, plan: &InstallPlan, working_dir: &Path) -> InstallResult {
        let command = self.build_command(plan);
        let command_str = command.join(" ");
        tracing::debug!("running {}", command_str);

        match self.run_command(&command, working_dir) {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();

                if output.status.success() {
                    InstallResult::success(command_str, stdout, stderr)
                } else {
                    InstallResult::failure(command_str, stdout, stderr)
                }
            }
            Err(e) => InstallResult::failure(
                command_str,
                String::new(),
                format!("Failed to execute command: {}", e),
            ),
        }
    }

    fn command_line(&self, plan: &InstallPlan) -> String {
        self.build_command(plan).join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Requirement, Version, VersionConstraint};
    use crate::install::InstallAction;

    fn plan() -> InstallPlan {
        let minimum = VersionConstraint::AtLeast(Version::parse("1.5").unwrap());
        InstallPlan::new(vec![
            InstallAction::Install {
                requirement: Requirement::new("requests", VersionConstraint::Any, 2),
            },
            InstallAction::Upgrade {
                requirement: Requirement::new("toposort", minimum, 4),
                from: Version::parse("1.4").unwrap(),
            },
        ])
    }

    #[test]
    fn test_install_result_success() {
        let result = InstallResult::success(
            "python3 -m pip install requests".to_string(),
            "done".to_string(),
            String::new(),
        );
        assert!(result.success);
        assert_eq!(result.command, "python3 -m pip install requests");
    }

    #[test]
    fn test_install_result_failure() {
        let result =
            InstallResult::failure("pip install".to_string(), String::new(), "error".to_string());
        assert!(!result.success);
        assert_eq!(result.stderr, "error");
    }

    #[test]
    fn test_build_command() {
        let pm = SystemPackageManager::new("python3");
        assert_eq!(
            pm.build_command(&plan()),
            vec![
                "python3",
                "-m",
                "pip",
                "install",
                "--disable-pip-version-check",
                "requests",
                "toposort>=1.5",
            ]
        );
    }

    #[test]
    fn test_build_command_with_extra_args() {
        let pm = SystemPackageManager::new("/opt/venv/bin/python")
            .with_extra_args(vec!["--user".into(), "--no-cache-dir".into()]);
        let command = pm.command_line(&plan());
        assert!(command.starts_with("/opt/venv/bin/python -m pip install"));
        assert!(command.ends_with("toposort>=1.5 --user --no-cache-dir"));
    }

    #[test]
    fn test_missing_interpreter_is_failure() {
        let temp_dir = tempfile::tempdir().unwrap();
        let pm = SystemPackageManager::new("/nonexistent/python");

        let result = pm.run_install(&plan(), temp_dir.path());
        assert!(!result.success);
        assert!(result.stderr.contains("Failed to execute command"));
    }
}
