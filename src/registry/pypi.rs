//! PyPI JSON API adapter
//!
//! Fetches package release information from a PyPI-compatible index.
//! API endpoint: {index_url}/{package}/json

use crate::domain::Version;
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryAdapter, VersionInfo};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// PyPI API base URL
pub const PYPI_API_URL: &str = "https://pypi.org/pypi";

/// PyPI adapter
pub struct PyPIAdapter {
    client: HttpClient,
    index_url: String,
}

/// PyPI package metadata response
#[derive(Debug, Deserialize)]
struct PyPIResponse {
    /// Release files keyed by version
    releases: HashMap<String, Vec<ReleaseFile>>,
}

/// Release file information
#[derive(Debug, Deserialize)]
struct ReleaseFile {
    /// Upload time for the release file
    upload_time_iso_8601: Option<String>,
    /// Whether the file was withdrawn by its maintainers
    #[serde(default)]
    yanked: bool,
}

impl PyPIAdapter {
    /// Create a new PyPI adapter for the public index
    pub fn new(client: HttpClient) -> Self {
        Self::with_index_url(client, PYPI_API_URL)
    }

    /// Create an adapter for another PyPI-compatible JSON API
    pub fn with_index_url(client: HttpClient, index_url: impl Into<String>) -> Self {
        Self {
            client,
            index_url: index_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the URL for a package
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}/json", self.index_url, package)
    }
}

/// Earliest upload time among the files that were not yanked
fn first_upload(files: &[ReleaseFile]) -> Option<DateTime<Utc>> {
    files
        .iter()
        .filter(|file| !file.yanked)
        .filter_map(|file| file.upload_time_iso_8601.as_deref())
        .filter_map(|time| time.parse::<DateTime<Utc>>().ok())
        .min()
}

#[async_trait]
impl RegistryAdapter for PyPIAdapter {
    fn registry_name(&self) -> &'static str {
        "PyPI"
    }

    async fn fetch_versions(&self, package: &str) -> Result<Vec<VersionInfo>, RegistryError> {
        let url = self.build_url(package);
        tracing::debug!("GET {}", url);
        let response: PyPIResponse = self
            .client
            .get_json(&url, package, self.registry_name())
            .await?;

        let mut versions: Vec<VersionInfo> = response
            .releases
            .into_iter()
            .filter_map(|(raw, files)| {
                let released_at = first_upload(&files)?;
                match Version::parse(&raw) {
                    Ok(version) => Some(VersionInfo::new(version, released_at)),
                    Err(e) => {
                        tracing::debug!("{}: skipping release: {}", package, e);
                        None
                    }
                }
            })
            .collect();

        versions.sort();

        Ok(versions)
    }
}
