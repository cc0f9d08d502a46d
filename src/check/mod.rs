//! Constraint checking against an installed environment
//!
//! This module provides:
//! - Package filter configuration from CLI args
//! - The checker that assigns every requirement a status

mod filter;

pub use filter::PackageFilter;

use crate::domain::{CheckReport, InstalledPackages, Manifest, RequirementStatus};

/// Decides whether each requirement holds in an environment
pub struct Checker {
    filter: PackageFilter,
}

impl Checker {
    /// Create a new Checker with the given filter
    pub fn new(filter: PackageFilter) -> Self {
        Self { filter }
    }

    /// Check every selected requirement of `manifest` against `installed`
    pub fn check(&self, manifest: &Manifest, installed: &InstalledPackages) -> CheckReport {
        let mut report = CheckReport::new(manifest.path.clone());

        for requirement in self.filter.select(manifest.requirements()) {
            let status = match installed.version_of(&requirement.name) {
                None => RequirementStatus::Missing,
                Some(version) if requirement.is_satisfied_by(version) => {
                    RequirementStatus::Satisfied {
                        installed: version.clone(),
                    }
                }
                Some(version) => RequirementStatus::Outdated {
                    installed: version.clone(),
                },
            };
            tracing::debug!("{}: {}", requirement.specifier(), status);
            report.add(requirement.clone(), status);
        }

        report
    }
}

impl Default for Checker {
    fn default() -> Self {
        Self::new(PackageFilter::new())
    }
}
