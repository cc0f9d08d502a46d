//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Aligned per-requirement lines with colored status
//! - Version change type between a minimum and the latest release (major/minor/patch)
//! - Summary lines with counts

use crate::domain::{
    CheckReport, IndexStatus, OutdatedEntry, OutdatedReport, Requirement, RequirementStatus,
    Version,
};
use crate::install::{InstallAction, InstallOutcome, InstallReport};
use crate::output::{OutputFormatter, Verbosity};
use crate::parser::LintReport;
use colored::{ColoredString, Colorize};
use std::io::Write;
use std::path::Path;

/// Minimum width of the name column
const MIN_NAME_WIDTH: usize = 16;

/// Semantic version change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChangeType {
    /// First release segment changed
    Major,
    /// Second release segment changed
    Minor,
    /// Anything smaller
    Patch,
}

impl VersionChangeType {
    /// Determine the change type between two versions
    pub fn from_versions(old: &Version, new: &Version) -> Self {
        if old.segment(0) != new.segment(0) {
            VersionChangeType::Major
        } else if old.segment(1) != new.segment(1) {
            VersionChangeType::Minor
        } else {
            VersionChangeType::Patch
        }
    }

    /// Get the display label with color
    pub fn colored_label(&self) -> String {
        match self {
            VersionChangeType::Major => "major".red().bold().to_string(),
            VersionChangeType::Minor => "minor".yellow().to_string(),
            VersionChangeType::Patch => "patch".green().to_string(),
        }
    }

    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            VersionChangeType::Major => "major",
            VersionChangeType::Minor => "minor",
            VersionChangeType::Patch => "patch",
        }
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    verbosity: Verbosity,
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self::with_color(verbosity, true)
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    /// Apply `style` only when colors are enabled
    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn path_label(path: Option<&Path>) -> String {
        path.map(|p| p.display().to_string())
            .unwrap_or_else(|| "<manifest>".to_string())
    }

    fn name_width<'a>(requirements: impl Iterator<Item = &'a Requirement>) -> usize {
        requirements
            .map(|r| r.name.len())
            .max()
            .unwrap_or(0)
            .max(MIN_NAME_WIDTH)
    }

    fn header(&self, path: Option<&Path>, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            writer,
            "{}",
            self.paint(&Self::path_label(path), |s| s.bold())
        )
    }

    fn write_rationale(
        &self,
        requirement: &Requirement,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if self.verbosity != Verbosity::Verbose {
            return Ok(());
        }
        for line in &requirement.rationale {
            writeln!(writer, "      {}", self.paint(&format!("# {}", line), |s| s.dimmed()))?;
        }
        Ok(())
    }

    fn status_label(&self, status: &RequirementStatus) -> String {
        match status {
            RequirementStatus::Satisfied { installed } => format!(
                "{} {}",
                self.paint("ok", |s| s.green()),
                installed
            ),
            RequirementStatus::Missing => self.paint("missing", |s| s.red().bold()),
            RequirementStatus::Outdated { installed } => format!(
                "{} {}",
                self.paint("outdated", |s| s.yellow().bold()),
                installed
            ),
        }
    }

    fn check_summary(&self, report: &CheckReport) -> String {
        let satisfied = report.satisfied_count();
        let missing = report.missing_count();
        let outdated = report.outdated_count();
        if report.is_satisfied() {
            self.paint(
                &format!("All {} requirement(s) satisfied", satisfied),
                |s| s.green(),
            )
        } else {
            format!(
                "{} satisfied, {} missing, {} outdated",
                satisfied,
                self.paint(&missing.to_string(), |s| s.red()),
                self.paint(&outdated.to_string(), |s| s.yellow())
            )
        }
    }

    fn action_line(
        &self,
        action: &InstallAction,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let requirement = action.requirement();
        match action {
            InstallAction::Install { .. } => writeln!(
                writer,
                "  {} {:width$} {}",
                self.paint("+", |s| s.green()),
                requirement.name,
                requirement.constraint,
                width = width
            ),
            InstallAction::Upgrade { from, .. } => writeln!(
                writer,
                "  {} {:width$} {} {} {}",
                self.paint("↑", |s| s.yellow()),
                requirement.name,
                self.paint(from.as_str(), |s| s.dimmed()),
                self.paint("→", |s| s.dimmed()),
                requirement.constraint,
                width = width
            ),
        }
    }

    fn outdated_line(
        &self,
        entry: &OutdatedEntry,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let requirement = &entry.requirement;
        let declared = requirement
            .minimum()
            .map(|m| format!(">={}", m))
            .unwrap_or_else(|| "any".to_string());

        match &entry.status {
            IndexStatus::Found {
                latest,
                released_at,
                satisfiable,
                minimum_published,
            } => {
                let change = requirement
                    .minimum()
                    .filter(|minimum| latest > *minimum)
                    .map(|minimum| {
                        let change = VersionChangeType::from_versions(minimum, latest);
                        if self.color {
                            format!(" [{}]", change.colored_label())
                        } else {
                            format!(" [{}]", change.label())
                        }
                    })
                    .unwrap_or_default();
                let date = released_at
                    .map(|d| {
                        self.paint(&format!(" ({})", d.format("%Y/%m/%d")), |s| s.dimmed())
                    })
                    .unwrap_or_default();
                let mut notes = Vec::new();
                if !satisfiable {
                    notes.push(self.paint("unsatisfiable", |s| s.red().bold()));
                } else if !minimum_published {
                    notes.push(self.paint("minimum never released", |s| s.yellow()));
                }
                let notes = if notes.is_empty() {
                    String::new()
                } else {
                    format!(" {}", notes.join(", "))
                };

                writeln!(
                    writer,
                    "  {:width$} {:10} {} {}{}{}{}",
                    requirement.name,
                    declared,
                    self.paint("→", |s| s.dimmed()),
                    self.paint(latest.as_str(), |s| s.bright_white().bold()),
                    change,
                    date,
                    notes,
                    width = width
                )
            }
            IndexStatus::NoReleases => writeln!(
                writer,
                "  {:width$} {:10} {}",
                requirement.name,
                declared,
                self.paint("no installable releases", |s| s.red().bold()),
                width = width
            ),
            IndexStatus::LookupFailed { message } => writeln!(
                writer,
                "  {:width$} {:10} {}",
                requirement.name,
                declared,
                self.paint(&format!("lookup failed: {}", message), |s| s.red()),
                width = width
            ),
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format_lint(&self, report: &LintReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let path = Self::path_label(report.path.as_deref());

        if self.verbosity != Verbosity::Quiet {
            for error in &report.errors {
                writeln!(
                    writer,
                    "{}:{}: {}",
                    path,
                    error.line,
                    self.paint(&error.kind.to_string(), |s| s.red())
                )?;
                writeln!(writer, "    {}", self.paint(&error.content, |s| s.dimmed()))?;
            }
        }

        if report.is_clean() {
            writeln!(
                writer,
                "{} {}: {} requirement(s), no problems",
                self.paint("✓", |s| s.green()),
                path,
                report.requirement_count
            )
        } else {
            writeln!(
                writer,
                "{} {}: {} problem(s)",
                self.paint("✗", |s| s.red()),
                path,
                report.errors.len()
            )
        }
    }

    fn format_check(&self, report: &CheckReport, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity != Verbosity::Quiet {
            self.header(report.manifest.as_deref(), writer)?;
            let width = Self::name_width(report.checks.iter().map(|c| &c.requirement));
            for check in &report.checks {
                writeln!(
                    writer,
                    "  {:width$} {:10} {}",
                    check.requirement.name,
                    check.requirement.constraint.to_string(),
                    self.status_label(&check.status),
                    width = width
                )?;
                self.write_rationale(&check.requirement, writer)?;
            }
            writeln!(writer)?;
        }
        writeln!(writer, "{}", self.check_summary(report))
    }

    fn format_install(
        &self,
        report: &InstallReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if let InstallOutcome::NothingToDo = report.outcome {
            return writeln!(
                writer,
                "{}",
                self.paint(
                    &format!(
                        "Nothing to do: all {} requirement(s) satisfied",
                        report.before.checks.len()
                    ),
                    |s| s.green()
                )
            );
        }

        if self.verbosity != Verbosity::Quiet {
            self.header(report.before.manifest.as_deref(), writer)?;
            let width = Self::name_width(report.plan.actions.iter().map(|a| a.requirement()));
            for action in &report.plan.actions {
                self.action_line(action, width, writer)?;
            }
            writeln!(writer)?;
        }

        match &report.outcome {
            InstallOutcome::NothingToDo => Ok(()),
            InstallOutcome::DryRun { command } => {
                writeln!(
                    writer,
                    "{} would run: {}",
                    self.paint("(dry-run)", |s| s.cyan()),
                    command
                )
            }
            InstallOutcome::Failed { result } => {
                writeln!(
                    writer,
                    "{} {}",
                    self.paint("Install failed:", |s| s.red().bold()),
                    result.command
                )?;
                for line in result.stderr.lines().filter(|l| !l.trim().is_empty()) {
                    writeln!(writer, "  {}", line)?;
                }
                Ok(())
            }
            InstallOutcome::Completed { result, .. } => {
                if self.verbosity == Verbosity::Verbose {
                    for line in result.stdout.lines() {
                        writeln!(writer, "  {}", self.paint(line, |s| s.dimmed()))?;
                    }
                }
                let unsatisfied = report.still_unsatisfied();
                if unsatisfied.is_empty() {
                    writeln!(
                        writer,
                        "{}",
                        self.paint(
                            &format!("Installed {} requirement(s)", report.plan.len()),
                            |s| s.green()
                        )
                    )
                } else {
                    let names: Vec<String> = unsatisfied.iter().map(|r| r.specifier()).collect();
                    writeln!(
                        writer,
                        "{} {}",
                        self.paint("Still unsatisfied after install:", |s| s.red().bold()),
                        names.join(", ")
                    )
                }
            }
        }
    }

    fn format_outdated(
        &self,
        report: &OutdatedReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if self.verbosity != Verbosity::Quiet {
            self.header(report.manifest.as_deref(), writer)?;
            let width = Self::name_width(report.entries.iter().map(|e| &e.requirement));
            for entry in &report.entries {
                self.outdated_line(entry, width, writer)?;
                self.write_rationale(&entry.requirement, writer)?;
            }
            writeln!(writer)?;
        }

        let lagging = report
            .entries
            .iter()
            .filter(|e| e.minimum_lags_latest())
            .count();
        let unsatisfiable = report
            .entries
            .iter()
            .filter(|e| e.is_unsatisfiable())
            .count();
        let failed = report.lookup_failures().count();

        let mut parts = vec![format!("{} checked", report.entries.len())];
        parts.push(format!("{} behind latest", lagging));
        if unsatisfiable > 0 {
            parts.push(self.paint(&format!("{} unsatisfiable", unsatisfiable), |s| s.red()));
        }
        if failed > 0 {
            parts.push(self.paint(&format!("{} lookup(s) failed", failed), |s| s.red()));
        }
        writeln!(writer, "{}", parts.join(", "))
    }
}
