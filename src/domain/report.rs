//! Result structures produced by the check and outdated workflows

use super::{Requirement, Version};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// How an installed environment measures up against one requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RequirementStatus {
    /// Installed and meets the constraint
    Satisfied { installed: Version },
    /// Not installed at all
    Missing,
    /// Installed below the declared minimum
    Outdated { installed: Version },
}

impl RequirementStatus {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, RequirementStatus::Satisfied { .. })
    }

    /// Installed version, if the package is present
    pub fn installed(&self) -> Option<&Version> {
        match self {
            RequirementStatus::Satisfied { installed } | RequirementStatus::Outdated { installed } => {
                Some(installed)
            }
            RequirementStatus::Missing => None,
        }
    }
}

impl fmt::Display for RequirementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequirementStatus::Satisfied { installed } => write!(f, "ok ({})", installed),
            RequirementStatus::Missing => write!(f, "missing"),
            RequirementStatus::Outdated { installed } => {
                write!(f, "too old ({} installed)", installed)
            }
        }
    }
}

/// A requirement paired with its status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementCheck {
    pub requirement: Requirement,
    #[serde(flatten)]
    pub status: RequirementStatus,
}

/// Outcome of checking a manifest against an environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Manifest that was checked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
    /// One entry per checked requirement, in manifest order
    pub checks: Vec<RequirementCheck>,
}

impl CheckReport {
    pub fn new(manifest: Option<PathBuf>) -> Self {
        Self {
            manifest,
            checks: Vec::new(),
        }
    }

    pub fn add(&mut self, requirement: Requirement, status: RequirementStatus) {
        self.checks.push(RequirementCheck {
            requirement,
            status,
        });
    }

    /// Returns true when every checked requirement is satisfied
    pub fn is_satisfied(&self) -> bool {
        self.checks.iter().all(|c| c.status.is_satisfied())
    }

    /// Checks that did not pass
    pub fn unsatisfied(&self) -> impl Iterator<Item = &RequirementCheck> {
        self.checks.iter().filter(|c| !c.status.is_satisfied())
    }

    pub fn satisfied_count(&self) -> usize {
        self.checks.iter().filter(|c| c.status.is_satisfied()).count()
    }

    pub fn missing_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.status == RequirementStatus::Missing)
            .count()
    }

    pub fn outdated_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| matches!(c.status, RequirementStatus::Outdated { .. }))
            .count()
    }
}

/// What the package index says about a requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndexStatus {
    /// The index has releases for the package
    Found {
        /// Newest eligible release
        latest: Version,
        /// Upload time of the newest eligible release
        #[serde(skip_serializing_if = "Option::is_none")]
        released_at: Option<DateTime<Utc>>,
        /// Newest release meets the constraint
        satisfiable: bool,
        /// The declared minimum itself was published
        minimum_published: bool,
    },
    /// The package exists but has no installable releases
    NoReleases,
    /// The lookup itself failed
    LookupFailed { message: String },
}

/// A requirement paired with what the index reports for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutdatedEntry {
    pub requirement: Requirement,
    #[serde(flatten)]
    pub status: IndexStatus,
}

impl OutdatedEntry {
    /// Returns true when no published release can meet the constraint
    pub fn is_unsatisfiable(&self) -> bool {
        match &self.status {
            IndexStatus::Found { satisfiable, .. } => !satisfiable,
            IndexStatus::NoReleases => true,
            IndexStatus::LookupFailed { .. } => false,
        }
    }

    /// Returns true when the newest release is past the declared minimum
    pub fn minimum_lags_latest(&self) -> bool {
        match (&self.status, self.requirement.minimum()) {
            (IndexStatus::Found { latest, .. }, Some(minimum)) => latest > minimum,
            _ => false,
        }
    }
}

/// Outcome of querying the index for every requirement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutdatedReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
    pub entries: Vec<OutdatedEntry>,
}

impl OutdatedReport {
    pub fn new(manifest: Option<PathBuf>) -> Self {
        Self {
            manifest,
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, requirement: Requirement, status: IndexStatus) {
        self.entries.push(OutdatedEntry {
            requirement,
            status,
        });
    }

    pub fn has_unsatisfiable(&self) -> bool {
        self.entries.iter().any(OutdatedEntry::is_unsatisfiable)
    }

    pub fn lookup_failures(&self) -> impl Iterator<Item = &OutdatedEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, IndexStatus::LookupFailed { .. }))
    }
}
