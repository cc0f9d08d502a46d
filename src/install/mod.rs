//! Install planning and execution
//!
//! A plan holds one action per requirement the environment does not satisfy.
//! An empty plan means the environment is already in the declared state and
//! nothing is run, which keeps repeated installs side-effect free.

use crate::check::Checker;
use crate::domain::{CheckReport, Manifest, Requirement, RequirementStatus, Version};
use crate::environment::EnvironmentProbe;
use crate::error::EnvironmentError;
use crate::package_manager::{InstallResult, PackageManagerRunner};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// A single change needed to satisfy one requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InstallAction {
    /// Package is not installed
    Install { requirement: Requirement },
    /// Package is installed below the declared minimum
    Upgrade {
        requirement: Requirement,
        from: Version,
    },
}

impl InstallAction {
    pub fn requirement(&self) -> &Requirement {
        match self {
            InstallAction::Install { requirement } | InstallAction::Upgrade { requirement, .. } => {
                requirement
            }
        }
    }

    /// Specifier handed to the installer, same form as the manifest line
    pub fn specifier(&self) -> String {
        self.requirement().specifier()
    }
}

impl fmt::Display for InstallAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallAction::Install { requirement } => write!(f, "install {}", requirement),
            InstallAction::Upgrade { requirement, from } => {
                write!(f, "upgrade {} (from {})", requirement, from)
            }
        }
    }
}

/// The ordered set of actions needed to satisfy a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallPlan {
    pub actions: Vec<InstallAction>,
}

impl InstallPlan {
    pub fn new(actions: Vec<InstallAction>) -> Self {
        Self { actions }
    }

    /// Derive the plan from a check report, keeping manifest order
    pub fn from_report(report: &CheckReport) -> Self {
        let actions = report
            .checks
            .iter()
            .filter_map(|check| match &check.status {
                RequirementStatus::Satisfied { .. } => None,
                RequirementStatus::Missing => Some(InstallAction::Install {
                    requirement: check.requirement.clone(),
                }),
                RequirementStatus::Outdated { installed } => Some(InstallAction::Upgrade {
                    requirement: check.requirement.clone(),
                    from: installed.clone(),
                }),
            })
            .collect();
        Self { actions }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Installer specifiers for every action
    pub fn specifiers(&self) -> Vec<String> {
        self.actions.iter().map(InstallAction::specifier).collect()
    }
}

/// What happened when a plan was (or was not) executed
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InstallOutcome {
    /// Environment already satisfied, runner not invoked
    NothingToDo,
    /// Plan computed but not executed
    DryRun { command: String },
    /// Installer exited with an error
    Failed { result: InstallResult },
    /// Installer ran; `verification` is the re-check of the environment afterwards
    Completed {
        result: InstallResult,
        verification: CheckReport,
    },
}

/// Outcome of an install command
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub before: CheckReport,
    pub plan: InstallPlan,
    #[serde(flatten)]
    pub outcome: InstallOutcome,
}

impl InstallReport {
    /// Whether the environment ends (or would end) up satisfying the manifest
    pub fn is_success(&self) -> bool {
        match &self.outcome {
            InstallOutcome::NothingToDo | InstallOutcome::DryRun { .. } => true,
            InstallOutcome::Failed { .. } => false,
            InstallOutcome::Completed { verification, .. } => verification.is_satisfied(),
        }
    }

    /// Requirements still unsatisfied after a completed install
    pub fn still_unsatisfied(&self) -> Vec<&Requirement> {
        match &self.outcome {
            InstallOutcome::Completed { verification, .. } => verification
                .unsatisfied()
                .map(|check| &check.requirement)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Plans, runs and verifies installs through a package manager runner
pub struct Installer<R: PackageManagerRunner> {
    runner: R,
    checker: Checker,
    dry_run: bool,
}

impl<R: PackageManagerRunner> Installer<R> {
    pub fn new(runner: R, checker: Checker) -> Self {
        Self {
            runner,
            checker,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Bring the environment seen by `probe` in line with `manifest`
    pub fn install(
        &self,
        manifest: &Manifest,
        probe: &dyn EnvironmentProbe,
        working_dir: &Path,
    ) -> Result<InstallReport, EnvironmentError> {
        let before = self.checker.check(manifest, &probe.installed()?);
        let plan = InstallPlan::from_report(&before);

        let outcome = if plan.is_empty() {
            tracing::debug!("{} already satisfied", probe.describe());
            InstallOutcome::NothingToDo
        } else if self.dry_run {
            InstallOutcome::DryRun {
                command: self.runner.command_line(&plan),
            }
        } else {
            tracing::debug!("installing {} requirement(s)", plan.len());
            let result = self.runner.run_install(&plan, working_dir);
            if result.success {
                let verification = self.checker.check(manifest, &probe.installed()?);
                if !verification.is_satisfied() {
                    tracing::warn!(
                        "{} requirement(s) still unsatisfied after install",
                        verification.checks.len() - verification.satisfied_count()
                    );
                }
                InstallOutcome::Completed {
                    result,
                    verification,
                }
            } else {
                InstallOutcome::Failed { result }
            }
        };

        Ok(InstallReport {
            before,
            plan,
            outcome,
        })
    }
}
