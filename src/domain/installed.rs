//! Snapshot of the packages present in an installed environment

use super::{normalize_name, Version};
use serde::Serialize;
use std::collections::BTreeMap;

/// An installed package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledPackage {
    /// Name as reported by the installer
    pub name: String,
    /// Installed version
    pub version: Version,
}

/// Installed packages keyed by normalized name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledPackages {
    packages: BTreeMap<String, InstalledPackage>,
}

impl InstalledPackages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a package; a later entry for the same normalized name replaces the earlier one
    pub fn insert(&mut self, name: impl Into<String>, version: Version) {
        let name = name.into();
        self.packages
            .insert(normalize_name(&name), InstalledPackage { name, version });
    }

    /// Look up a package by any spelling of its name
    pub fn get(&self, name: &str) -> Option<&InstalledPackage> {
        self.packages.get(&normalize_name(name))
    }

    /// Installed version of a package, if present
    pub fn version_of(&self, name: &str) -> Option<&Version> {
        self.get(name).map(|pkg| &pkg.version)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Packages ordered by normalized name
    pub fn iter(&self) -> impl Iterator<Item = &InstalledPackage> {
        self.packages.values()
    }
}

impl<N: Into<String>> FromIterator<(N, Version)> for InstalledPackages {
    fn from_iter<T: IntoIterator<Item = (N, Version)>>(iter: T) -> Self {
        let mut installed = InstalledPackages::new();
        for (name, version) in iter {
            installed.insert(name, version);
        }
        installed
    }
}
