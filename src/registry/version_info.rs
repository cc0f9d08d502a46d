//! Version information from registry
//!
//! This module provides the VersionInfo struct that represents
//! a published release with its upload date.

use crate::domain::Version;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

/// Information about a package release from the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    /// The released version
    pub version: Version,
    /// When the first file of this release was uploaded
    pub released_at: DateTime<Utc>,
}

impl VersionInfo {
    /// Create a new VersionInfo
    pub fn new(version: Version, released_at: DateTime<Utc>) -> Self {
        Self {
            version,
            released_at,
        }
    }

    /// Check if this release is a pre-release (alpha, beta, rc, dev)
    pub fn is_prerelease(&self) -> bool {
        self.version.is_prerelease()
    }
}

impl Ord for VersionInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version
            .cmp(&other.version)
            .then_with(|| self.released_at.cmp(&other.released_at))
    }
}

impl PartialOrd for VersionInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
