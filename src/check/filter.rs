//! Package filter configuration
//!
//! This module provides the PackageFilter struct that encapsulates
//! the `--only` / `--exclude` selection shared by every command.

use crate::domain::{normalize_name, Requirement};

/// Which requirements a command should look at
#[derive(Debug, Clone, Default)]
pub struct PackageFilter {
    /// Packages to leave out (normalized)
    pub exclude: Vec<String>,
    /// If non-empty, only these packages (normalized)
    pub only: Vec<String>,
}

impl PackageFilter {
    /// Create a filter that selects everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Set packages to exclude
    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude.iter().map(|n| normalize_name(n)).collect();
        self
    }

    /// Set packages to include (only list)
    pub fn with_only(mut self, only: Vec<String>) -> Self {
        self.only = only.iter().map(|n| normalize_name(n)).collect();
        self
    }

    /// Check if a package should be processed
    pub fn should_process(&self, name: &str) -> bool {
        let name = normalize_name(name);
        if !self.only.is_empty() {
            return self.only.contains(&name);
        }
        !self.exclude.contains(&name)
    }

    /// Select the requirements this filter lets through
    pub fn select<'a>(
        &'a self,
        requirements: &'a [Requirement],
    ) -> impl Iterator<Item = &'a Requirement> + 'a {
        requirements.iter().filter(move |req| {
            let keep = self.should_process(&req.name);
            if !keep {
                tracing::debug!("{} filtered out", req.name);
            }
            keep
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VersionConstraint;

    #[test]
    fn test_new_filter_processes_everything() {
        let filter = PackageFilter::new();
        assert!(filter.should_process("requests"));
        assert!(filter.should_process("anything"));
    }

    #[test]
    fn test_exclude() {
        let filter = PackageFilter::new().with_exclude(vec!["Pygments".into()]);
        assert!(!filter.should_process("pygments"));
        assert!(filter.should_process("toposort"));
    }

    #[test]
    fn test_only_takes_precedence() {
        let filter = PackageFilter::new()
            .with_only(vec!["toposort".into()])
            .with_exclude(vec!["toposort".into()]);
        assert!(filter.should_process("toposort"));
        assert!(!filter.should_process("requests"));
    }

    #[test]
    fn test_normalized_comparison() {
        let filter = PackageFilter::new().with_only(vec!["typing_extensions".into()]);
        assert!(filter.should_process("Typing-Extensions"));
    }

    #[test]
    fn test_select() {
        let requirements = vec![
            Requirement::new("appdirs", VersionConstraint::Any, 1),
            Requirement::new("requests", VersionConstraint::Any, 2),
        ];
        let filter = PackageFilter::new().with_exclude(vec!["requests".into()]);
        let selected: Vec<_> = filter.select(&requirements).map(|r| r.name.as_str()).collect();
        assert_eq!(selected, vec!["appdirs"]);
    }
}
