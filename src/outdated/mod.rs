//! Index lookups for declared minimums
//!
//! This module provides:
//! - `ReleaseJudge`, deciding what the index's releases mean for one requirement
//! - `OutdatedLookup`, querying the registry for every selected requirement

use crate::check::PackageFilter;
use crate::domain::{IndexStatus, Manifest, OutdatedReport, Requirement};
use crate::progress::Progress;
use crate::registry::{RegistryAdapter, VersionInfo};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Decides latest release and satisfiability for a requirement
#[derive(Debug, Clone, Default)]
pub struct ReleaseJudge {
    /// Consider pre-releases even when the minimum is a final release
    include_prereleases: bool,
}

impl ReleaseJudge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prereleases(mut self, include: bool) -> Self {
        self.include_prereleases = include;
        self
    }

    /// Judge a requirement given the releases the index publishes
    pub fn judge(&self, requirement: &Requirement, releases: &[VersionInfo]) -> IndexStatus {
        // Pre-releases count only when asked for, when the minimum itself is one,
        // or when the package has published nothing else
        let allow_pre = self.include_prereleases
            || requirement.minimum().is_some_and(|m| m.is_prerelease());

        let stable = releases
            .iter()
            .filter(|release| allow_pre || !release.is_prerelease())
            .max();
        let Some(latest) = stable.or_else(|| releases.iter().max()) else {
            return IndexStatus::NoReleases;
        };

        let minimum_published = match requirement.minimum() {
            Some(minimum) => releases.iter().any(|release| &release.version == minimum),
            None => true,
        };

        IndexStatus::Found {
            latest: latest.version.clone(),
            released_at: Some(latest.released_at),
            satisfiable: requirement.is_satisfied_by(&latest.version),
            minimum_published,
        }
    }
}

/// Registry lookups for every selected requirement of a manifest
pub struct OutdatedLookup {
    adapter: Arc<dyn RegistryAdapter>,
    judge: ReleaseJudge,
    filter: PackageFilter,
    semaphore: Arc<Semaphore>,
}

impl OutdatedLookup {
    /// Create a lookup allowing at most `concurrency` requests in flight
    pub fn new(
        adapter: Arc<dyn RegistryAdapter>,
        judge: ReleaseJudge,
        filter: PackageFilter,
        concurrency: usize,
    ) -> Self {
        Self {
            adapter,
            judge,
            filter,
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    /// Query the registry for each requirement; failures are recorded per entry
    pub async fn run(&self, manifest: &Manifest, progress: &mut Progress) -> OutdatedReport {
        let requirements: Vec<Requirement> = self
            .filter
            .select(manifest.requirements())
            .cloned()
            .collect();

        progress.start(requirements.len() as u64, "Querying index");

        let mut tasks = Vec::with_capacity(requirements.len());
        for requirement in &requirements {
            let adapter = Arc::clone(&self.adapter);
            let semaphore = Arc::clone(&self.semaphore);
            let name = requirement.name.clone();
            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                adapter.fetch_versions(&name).await
            }));
        }

        let mut report = OutdatedReport::new(manifest.path.clone());
        for (requirement, task) in requirements.into_iter().zip(tasks) {
            progress.set_message(&requirement.name);
            let status = match task.await {
                Ok(Ok(releases)) => self.judge.judge(&requirement, &releases),
                Ok(Err(e)) => {
                    tracing::warn!("{}", e);
                    IndexStatus::LookupFailed {
                        message: e.to_string(),
                    }
                }
                Err(e) => IndexStatus::LookupFailed {
                    message: format!("lookup task failed: {}", e),
                },
            };
            tracing::debug!("{}: {:?}", requirement.name, status);
            report.add(requirement, status);
            progress.inc();
        }
        progress.finish_and_clear();

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Version, VersionConstraint};
    use crate::error::RegistryError;
    use crate::parser::parse_manifest;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::HashMap;

    fn releases(versions: &[&str]) -> Vec<VersionInfo> {
        let start = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
        versions
            .iter()
            .enumerate()
            .map(|(i, v)| {
                VersionInfo::new(Version::parse(v).unwrap(), start + Duration::days(i as i64))
            })
            .collect()
    }

    fn at_least(name: &str, minimum: &str) -> Requirement {
        Requirement::new(
            name,
            VersionConstraint::AtLeast(Version::parse(minimum).unwrap()),
            1,
        )
    }

    #[test]
    fn test_judge_latest_satisfies_minimum() {
        let status = ReleaseJudge::new().judge(
            &at_least("toposort", "1.5"),
            &releases(&["1.4", "1.5", "1.6", "1.10"]),
        );
        match status {
            IndexStatus::Found {
                latest,
                satisfiable,
                minimum_published,
                ..
            } => {
                assert_eq!(latest.as_str(), "1.10");
                assert!(satisfiable);
                assert!(minimum_published);
            }
            other => panic!("unexpected status: {:?}", other),
        }
    }

    #[test]
    fn test_judge_minimum_above_every_release() {
        let status =
            ReleaseJudge::new().judge(&at_least("toposort", "9.0"), &releases(&["1.5", "1.6"]));
        assert!(matches!(
            status,
            IndexStatus::Found {
                satisfiable: false,
                minimum_published: false,
                ..
            }
        ));
    }

    #[test]
    fn test_judge_minimum_not_published_but_satisfiable() {
        // appdirs never released a bare "1.3" but 1.3.0 compares equal
        let status = ReleaseJudge::new().judge(
            &at_least("appdirs", "1.3"),
            &releases(&["1.3.0", "1.4.4"]),
        );
        assert!(matches!(
            status,
            IndexStatus::Found {
                satisfiable: true,
                minimum_published: true,
                ..
            }
        ));

        let status = ReleaseJudge::new().judge(
            &at_least("appdirs", "1.3.5"),
            &releases(&["1.3.0", "1.4.4"]),
        );
        assert!(matches!(
            status,
            IndexStatus::Found {
                satisfiable: true,
                minimum_published: false,
                ..
            }
        ));
    }

    #[test]
    fn test_judge_ignores_prereleases_by_default() {
        let requirement = Requirement::new("pygments", VersionConstraint::Any, 1);
        let available = releases(&["2.2", "2.3rc1"]);

        let status = ReleaseJudge::new().judge(&requirement, &available);
        assert!(matches!(status, IndexStatus::Found { ref latest, .. } if latest.as_str() == "2.2"));

        let status = ReleaseJudge::new()
            .with_prereleases(true)
            .judge(&requirement, &available);
        assert!(
            matches!(status, IndexStatus::Found { ref latest, .. } if latest.as_str() == "2.3rc1")
        );
    }

    #[test]
    fn test_judge_prerelease_minimum_allows_prereleases() {
        let status =
            ReleaseJudge::new().judge(&at_least("pygments", "2.3b1"), &releases(&["2.2", "2.3rc1"]));
        assert!(matches!(
            status,
            IndexStatus::Found { satisfiable: true, .. }
        ));
    }

    #[test]
    fn test_judge_no_releases() {
        let requirement = Requirement::new("ghost", VersionConstraint::Any, 1);
        assert_eq!(
            ReleaseJudge::new().judge(&requirement, &[]),
            IndexStatus::NoReleases
        );
    }

    #[test]
    fn test_judge_only_prereleases_published() {
        let requirement = Requirement::new("fresh", VersionConstraint::Any, 1);
        let status = ReleaseJudge::new().judge(&requirement, &releases(&["0.9a1", "1.0b1"]));
        match status {
            IndexStatus::Found {
                ref latest,
                satisfiable,
                ..
            } => {
                assert_eq!(latest.as_str(), "1.0b1");
                assert!(satisfiable);
            }
            ref other => panic!("unexpected status: {:?}", other),
        }

        let entry = crate::domain::OutdatedEntry {
            requirement,
            status,
        };
        assert!(!entry.is_unsatisfiable());
    }

    /// In-memory registry for testing
    struct StaticRegistry {
        packages: HashMap<String, Vec<VersionInfo>>,
    }

    #[async_trait]
    impl RegistryAdapter for StaticRegistry {
        fn registry_name(&self) -> &'static str {
            "static"
        }

        async fn fetch_versions(&self, package: &str) -> Result<Vec<VersionInfo>, RegistryError> {
            self.packages
                .get(package)
                .cloned()
                .ok_or_else(|| RegistryError::package_not_found(package, "static"))
        }
    }

    #[tokio::test]
    async fn test_lookup_keeps_manifest_order_and_records_failures() {
        let mut packages = HashMap::new();
        packages.insert("toposort".to_string(), releases(&["1.5", "1.10"]));
        packages.insert("appdirs".to_string(), releases(&["1.4.4"]));
        let lookup = OutdatedLookup::new(
            Arc::new(StaticRegistry { packages }),
            ReleaseJudge::new(),
            PackageFilter::new(),
            2,
        );

        let manifest = parse_manifest("toposort>=1.5\nunknown-pkg\nappdirs>=1.3\n").unwrap();
        let report = lookup.run(&manifest, &mut Progress::disabled()).await;

        let names: Vec<_> = report
            .entries
            .iter()
            .map(|e| e.requirement.name.as_str())
            .collect();
        assert_eq!(names, vec!["toposort", "unknown-pkg", "appdirs"]);
        assert_eq!(report.lookup_failures().count(), 1);
        assert!(!report.has_unsatisfiable());
        assert!(report.entries[0].minimum_lags_latest());
    }

    #[tokio::test]
    async fn test_lookup_applies_filter() {
        let lookup = OutdatedLookup::new(
            Arc::new(StaticRegistry {
                packages: HashMap::new(),
            }),
            ReleaseJudge::new(),
            PackageFilter::new().with_exclude(vec!["requests".into()]),
            1,
        );
        let manifest = parse_manifest("requests\n").unwrap();
        let report = lookup.run(&manifest, &mut Progress::disabled()).await;
        assert!(report.entries.is_empty());
    }
}
