//! JSON output formatter for machine processing
//!
//! Every document carries an `ok` flag matching the exit status, a
//! `summary` object with counts, and the report itself.

use crate::domain::{CheckReport, OutdatedReport};
use crate::error::LineError;
use crate::install::{InstallOutcome, InstallReport};
use crate::output::{OutputFormatter, Verbosity};
use crate::parser::LintReport;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Installer output is included only in verbose mode
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    fn write_json<T: Serialize>(value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

#[derive(Serialize)]
struct JsonLint<'a> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    manifest: Option<&'a Path>,
    requirements: usize,
    errors: Vec<JsonLineError<'a>>,
}

#[derive(Serialize)]
struct JsonLineError<'a> {
    line: usize,
    content: &'a str,
    message: String,
}

impl<'a> From<&'a LineError> for JsonLineError<'a> {
    fn from(error: &'a LineError) -> Self {
        Self {
            line: error.line,
            content: &error.content,
            message: error.kind.to_string(),
        }
    }
}

#[derive(Serialize)]
struct JsonCheckSummary {
    total: usize,
    satisfied: usize,
    missing: usize,
    outdated: usize,
}

impl From<&CheckReport> for JsonCheckSummary {
    fn from(report: &CheckReport) -> Self {
        Self {
            total: report.checks.len(),
            satisfied: report.satisfied_count(),
            missing: report.missing_count(),
            outdated: report.outdated_count(),
        }
    }
}

#[derive(Serialize)]
struct JsonCheck<'a> {
    ok: bool,
    summary: JsonCheckSummary,
    #[serde(flatten)]
    report: &'a CheckReport,
}

#[derive(Serialize)]
struct JsonInstall<'a> {
    ok: bool,
    dry_run: bool,
    specifiers: Vec<String>,
    #[serde(flatten)]
    report: &'a InstallReport,
}

#[derive(Serialize)]
struct JsonOutdatedSummary {
    total: usize,
    behind_latest: usize,
    unsatisfiable: usize,
    lookup_failures: usize,
}

#[derive(Serialize)]
struct JsonOutdated<'a> {
    ok: bool,
    summary: JsonOutdatedSummary,
    #[serde(flatten)]
    report: &'a OutdatedReport,
}

impl OutputFormatter for JsonFormatter {
    fn format_lint(&self, report: &LintReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonLint {
            ok: report.is_clean(),
            manifest: report.path.as_deref(),
            requirements: report.requirement_count,
            errors: report.errors.iter().map(JsonLineError::from).collect(),
        };
        Self::write_json(&output, writer)
    }

    fn format_check(&self, report: &CheckReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonCheck {
            ok: report.is_satisfied(),
            summary: JsonCheckSummary::from(report),
            report,
        };
        Self::write_json(&output, writer)
    }

    fn format_install(
        &self,
        report: &InstallReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let output = JsonInstall {
            ok: report.is_success(),
            dry_run: matches!(report.outcome, InstallOutcome::DryRun { .. }),
            specifiers: report.plan.specifiers(),
            report,
        };

        if self.verbosity == Verbosity::Verbose {
            return Self::write_json(&output, writer);
        }

        // Installer output is noisy; drop it unless asked for
        let mut value = serde_json::to_value(&output).map_err(std::io::Error::other)?;
        if let Some(result) = value.get_mut("result").and_then(|r| r.as_object_mut()) {
            result.remove("stdout");
        }
        Self::write_json(&value, writer)
    }

    fn format_outdated(
        &self,
        report: &OutdatedReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let lookup_failures = report.lookup_failures().count();
        let output = JsonOutdated {
            ok: !report.has_unsatisfiable() && lookup_failures == 0,
            summary: JsonOutdatedSummary {
                total: report.entries.len(),
                behind_latest: report
                    .entries
                    .iter()
                    .filter(|e| e.minimum_lags_latest())
                    .count(),
                unsatisfiable: report
                    .entries
                    .iter()
                    .filter(|e| e.is_unsatisfiable())
                    .count(),
                lookup_failures,
            },
            report,
        };
        Self::write_json(&output, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Checker;
    use crate::domain::{IndexStatus, InstalledPackages, Requirement, Version, VersionConstraint};
    use crate::install::InstallPlan;
    use crate::package_manager::InstallResult;
    use crate::parser::{lint, parse_manifest};
    use serde_json::Value;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn to_json(f: impl FnOnce(&JsonFormatter, &mut Vec<u8>) -> std::io::Result<()>) -> Value {
        let formatter = JsonFormatter::new(Verbosity::Normal);
        let mut out = Vec::new();
        f(&formatter, &mut out).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    fn check_report() -> CheckReport {
        let manifest = parse_manifest("appdirs>=1.3\ntoposort>=1.5\nrequests\n")
            .unwrap()
            .with_path("requirements.txt");
        let installed: InstalledPackages = [("appdirs", v("1.4.4")), ("toposort", v("1.4"))]
            .into_iter()
            .collect();
        Checker::default().check(&manifest, &installed)
    }

    #[test]
    fn test_lint_json() {
        let json = to_json(|f, w| f.format_lint(&lint("requests\npygments>2.2\n"), w));
        assert_eq!(json["ok"], false);
        assert_eq!(json["requirements"], 1);
        assert_eq!(json["errors"][0]["line"], 2);
        assert_eq!(json["errors"][0]["content"], "pygments>2.2");
        assert!(json["errors"][0]["message"]
            .as_str()
            .unwrap()
            .contains(">"));
        assert!(json.get("manifest").is_none());
    }

    #[test]
    fn test_check_json() {
        let json = to_json(|f, w| f.format_check(&check_report(), w));
        assert_eq!(json["ok"], false);
        assert_eq!(json["manifest"], "requirements.txt");
        assert_eq!(json["summary"]["total"], 3);
        assert_eq!(json["summary"]["satisfied"], 1);
        assert_eq!(json["summary"]["missing"], 1);
        assert_eq!(json["summary"]["outdated"], 1);

        let checks = json["checks"].as_array().unwrap();
        assert_eq!(checks[0]["requirement"]["name"], "appdirs");
        assert_eq!(checks[0]["status"], "satisfied");
        assert_eq!(checks[0]["installed"], "1.4.4");
        assert_eq!(checks[1]["status"], "outdated");
        assert_eq!(checks[1]["requirement"]["constraint"]["minimum"], "1.5");
        assert_eq!(checks[2]["status"], "missing");
    }

    #[test]
    fn test_install_dry_run_json() {
        let before = check_report();
        let report = InstallReport {
            plan: InstallPlan::from_report(&before),
            before,
            outcome: InstallOutcome::DryRun {
                command: "python3 -m pip install toposort>=1.5 requests".to_string(),
            },
        };
        let json = to_json(|f, w| f.format_install(&report, w));
        assert_eq!(json["ok"], true);
        assert_eq!(json["dry_run"], true);
        assert_eq!(json["outcome"], "dry_run");
        assert_eq!(
            json["specifiers"],
            serde_json::json!(["toposort>=1.5", "requests"])
        );
        assert_eq!(json["plan"]["actions"][0]["action"], "upgrade");
        assert_eq!(json["plan"]["actions"][0]["from"], "1.4");
    }

    #[test]
    fn test_install_failure_json_omits_stdout() {
        let before = check_report();
        let report = InstallReport {
            plan: InstallPlan::from_report(&before),
            before,
            outcome: InstallOutcome::Failed {
                result: InstallResult::failure(
                    "python3 -m pip install".to_string(),
                    "Collecting toposort".to_string(),
                    "ERROR: boom".to_string(),
                ),
            },
        };
        let json = to_json(|f, w| f.format_install(&report, w));
        assert_eq!(json["ok"], false);
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["result"]["stderr"], "ERROR: boom");
        assert!(json["result"].get("stdout").is_none());
    }

    #[test]
    fn test_outdated_json() {
        let mut report = OutdatedReport::new(None);
        report.add(
            Requirement::new("toposort", VersionConstraint::AtLeast(v("1.5")), 1),
            IndexStatus::Found {
                latest: v("1.10"),
                released_at: None,
                satisfiable: true,
                minimum_published: true,
            },
        );
        report.add(
            Requirement::new("ghost", VersionConstraint::Any, 2),
            IndexStatus::NoReleases,
        );

        let json = to_json(|f, w| f.format_outdated(&report, w));
        assert_eq!(json["ok"], false);
        assert_eq!(json["summary"]["behind_latest"], 1);
        assert_eq!(json["summary"]["unsatisfiable"], 1);
        assert_eq!(json["entries"][0]["status"], "found");
        assert_eq!(json["entries"][0]["latest"], "1.10");
        assert!(json["entries"][0].get("released_at").is_none());
        assert_eq!(json["entries"][1]["status"], "no_releases");
    }
}
