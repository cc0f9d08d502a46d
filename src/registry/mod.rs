//! Registry adapters for fetching package version information
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - PyPI JSON API adapter
//! - Release information with upload dates

mod client;
mod pypi;
mod version_info;

pub use client::{HttpClient, DEFAULT_TIMEOUT};
pub use pypi::{PyPIAdapter, PYPI_API_URL};
pub use version_info::VersionInfo;

use crate::error::RegistryError;
use async_trait::async_trait;

/// Trait for registry adapters
#[async_trait]
pub trait RegistryAdapter: Send + Sync {
    /// Get the registry name
    fn registry_name(&self) -> &'static str;

    /// Fetch published releases for a package, oldest first
    async fn fetch_versions(&self, package: &str) -> Result<Vec<VersionInfo>, RegistryError>;
}
