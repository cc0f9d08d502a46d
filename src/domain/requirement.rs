//! Requirement records declared in a manifest

use super::Version;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static SEPARATOR_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_.]+").unwrap());

/// Normalize a package name for comparison
///
/// Names are case-insensitive and treat runs of `-`, `_` and `.` as a single
/// `-`, so `Foo_Bar`, `foo.bar` and `foo--bar` all name the same package.
pub fn normalize_name(name: &str) -> String {
    SEPARATOR_RUN_RE
        .replace_all(&name.to_ascii_lowercase(), "-")
        .into_owned()
}

/// Version constraint attached to a requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "minimum", rename_all = "snake_case")]
pub enum VersionConstraint {
    /// Bare package name, any version accepted
    Any,
    /// `>=` minimum, inclusive
    AtLeast(Version),
}

impl VersionConstraint {
    /// Returns true if `version` meets this constraint
    pub fn is_satisfied_by(&self, version: &Version) -> bool {
        match self {
            VersionConstraint::Any => true,
            VersionConstraint::AtLeast(minimum) => version >= minimum,
        }
    }

    /// The declared minimum, if any
    pub fn minimum(&self) -> Option<&Version> {
        match self {
            VersionConstraint::Any => None,
            VersionConstraint::AtLeast(minimum) => Some(minimum),
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionConstraint::Any => Ok(()),
            VersionConstraint::AtLeast(minimum) => write!(f, ">={}", minimum),
        }
    }
}

/// A single package requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Package name as written in the manifest
    pub name: String,
    /// Name used for lookups (see [`normalize_name`])
    pub normalized_name: String,
    /// Version constraint
    pub constraint: VersionConstraint,
    /// 1-based line number in the manifest
    pub line: usize,
    /// Comment block directly above the requirement, one entry per line
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rationale: Vec<String>,
    /// Comment after the specifier on the same line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_comment: Option<String>,
}

impl Requirement {
    /// Creates a new requirement
    pub fn new(name: impl Into<String>, constraint: VersionConstraint, line: usize) -> Self {
        let name = name.into();
        Self {
            normalized_name: normalize_name(&name),
            name,
            constraint,
            line,
            rationale: Vec::new(),
            inline_comment: None,
        }
    }

    /// Attaches the rationale comment block (builder pattern)
    pub fn with_rationale(mut self, rationale: Vec<String>) -> Self {
        self.rationale = rationale;
        self
    }

    /// Attaches an inline comment (builder pattern)
    pub fn with_inline_comment(mut self, comment: impl Into<String>) -> Self {
        self.inline_comment = Some(comment.into());
        self
    }

    /// Returns true if `version` meets this requirement's constraint
    pub fn is_satisfied_by(&self, version: &Version) -> bool {
        self.constraint.is_satisfied_by(version)
    }

    /// The declared minimum version, if any
    pub fn minimum(&self) -> Option<&Version> {
        self.constraint.minimum()
    }

    /// The installer specifier for this requirement (`name` or `name>=X.Y`)
    pub fn specifier(&self) -> String {
        format!("{}{}", self.name, self.constraint)
    }

    /// Returns true if this requirement names the given package
    pub fn matches_name(&self, name: &str) -> bool {
        self.normalized_name == normalize_name(name)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.specifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_least(version: &str) -> VersionConstraint {
        VersionConstraint::AtLeast(Version::parse(version).unwrap())
    }

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Pygments"), "pygments");
        assert_eq!(normalize_name("foo_bar"), "foo-bar");
        assert_eq!(normalize_name("Foo.Bar"), "foo-bar");
        assert_eq!(normalize_name("foo-_.bar"), "foo-bar");
    }

    #[test]
    fn test_minimum_is_inclusive() {
        let req = Requirement::new("toposort", at_least("1.5"), 1);
        assert!(!req.is_satisfied_by(&v("1.4")));
        assert!(req.is_satisfied_by(&v("1.5")));
        assert!(req.is_satisfied_by(&v("1.5.0")));
        assert!(req.is_satisfied_by(&v("1.6")));
    }

    #[test]
    fn test_prerelease_of_minimum_does_not_satisfy() {
        let req = Requirement::new("toposort", at_least("1.5"), 1);
        assert!(!req.is_satisfied_by(&v("1.5rc1")));
    }

    #[test]
    fn test_any_accepts_everything() {
        let req = Requirement::new("requests", VersionConstraint::Any, 1);
        assert!(req.is_satisfied_by(&v("0.1")));
        assert!(req.is_satisfied_by(&v("2.0a1")));
        assert!(req.minimum().is_none());
    }

    #[test]
    fn test_specifier() {
        assert_eq!(
            Requirement::new("appdirs", at_least("1.3"), 1).specifier(),
            "appdirs>=1.3"
        );
        assert_eq!(
            Requirement::new("requests", VersionConstraint::Any, 2).specifier(),
            "requests"
        );
    }

    #[test]
    fn test_matches_name() {
        let req = Requirement::new("Pygments", at_least("2.2"), 3);
        assert!(req.matches_name("pygments"));
        assert!(req.matches_name("PYGMENTS"));
        assert!(!req.matches_name("pygment"));
    }

    #[test]
    fn test_builders() {
        let req = Requirement::new("appdirs", at_least("1.3"), 2)
            .with_rationale(vec!["needed for user_log_dir".into()])
            .with_inline_comment("keep");
        assert_eq!(req.rationale, vec!["needed for user_log_dir"]);
        assert_eq!(req.inline_comment.as_deref(), Some("keep"));
    }

    #[test]
    fn test_serde_constraint() {
        let json = serde_json::to_string(&at_least("1.5")).unwrap();
        assert_eq!(json, r#"{"kind":"at_least","minimum":"1.5"}"#);
        let json = serde_json::to_string(&VersionConstraint::Any).unwrap();
        assert_eq!(json, r#"{"kind":"any"}"#);
    }
}
