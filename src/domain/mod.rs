//! Core domain models for reqcheck
//!
//! This module contains the fundamental types used throughout the application:
//! - Versions and their ordering
//! - Requirements and version constraints
//! - The parsed manifest with its original lines
//! - Installed environment snapshots
//! - Check and outdated reports

mod installed;
mod manifest;
mod report;
mod requirement;
mod version;

pub use installed::{InstalledPackage, InstalledPackages};
pub use manifest::{LineKind, Manifest, ManifestLine};
pub use report::{
    CheckReport, IndexStatus, OutdatedEntry, OutdatedReport, RequirementCheck, RequirementStatus,
};
pub use requirement::{normalize_name, Requirement, VersionConstraint};
pub use version::{PreRelease, Version};
