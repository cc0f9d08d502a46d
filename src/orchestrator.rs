//! Command orchestrator coordinating one reqcheck invocation
//!
//! This module provides:
//! - Workflow coordination: settings → manifest → environment → command stage
//! - Settings resolution (CLI flag > config file > default)
//! - Exit code selection for every command report

use crate::check::{Checker, PackageFilter};
use crate::cli::{CliArgs, Command, EnvironmentArgs, FilterArgs};
use crate::config::Settings;
use crate::domain::{CheckReport, InstalledPackages, Manifest, OutdatedReport};
use crate::environment::{EnvironmentProbe, FreezeFileProbe, PipProbe};
use crate::error::{AppError, EnvironmentError};
use crate::install::{InstallReport, Installer};
use crate::outdated::{OutdatedLookup, ReleaseJudge};
use crate::output::OutputFormatter;
use crate::package_manager::SystemPackageManager;
use crate::parser::{lint_file, read_manifest, LintReport};
use crate::progress::Progress;
use crate::registry::{HttpClient, PyPIAdapter};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything went as declared
pub const EXIT_SUCCESS: u8 = 0;
/// Requirements unsatisfied, install failed or a minimum cannot be met
pub const EXIT_UNSATISFIED: u8 = 1;
/// Invalid input or an environment / registry failure
pub const EXIT_ERROR: u8 = 2;

/// Report produced by one command
#[derive(Debug, Clone)]
pub enum CommandReport {
    Lint(LintReport),
    Check(CheckReport),
    Install(InstallReport),
    Outdated(OutdatedReport),
}

impl CommandReport {
    /// Process exit code for this report
    pub fn exit_code(&self) -> u8 {
        match self {
            CommandReport::Lint(report) if report.is_clean() => EXIT_SUCCESS,
            CommandReport::Lint(_) => EXIT_ERROR,
            CommandReport::Check(report) if report.is_satisfied() => EXIT_SUCCESS,
            CommandReport::Check(_) => EXIT_UNSATISFIED,
            CommandReport::Install(report) if report.is_success() => EXIT_SUCCESS,
            CommandReport::Install(_) => EXIT_UNSATISFIED,
            CommandReport::Outdated(report) if report.lookup_failures().next().is_some() => {
                EXIT_ERROR
            }
            CommandReport::Outdated(report) if report.has_unsatisfiable() => EXIT_UNSATISFIED,
            CommandReport::Outdated(_) => EXIT_SUCCESS,
        }
    }

    /// Write the report with the given formatter
    pub fn write(
        &self,
        formatter: &dyn OutputFormatter,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        match self {
            CommandReport::Lint(report) => formatter.format_lint(report, writer),
            CommandReport::Check(report) => formatter.format_check(report, writer),
            CommandReport::Install(report) => formatter.format_install(report, writer),
            CommandReport::Outdated(report) => formatter.format_outdated(report, writer),
        }
    }
}

/// Orchestrator for a single command
pub struct Orchestrator {
    /// CLI arguments for configuration
    args: CliArgs,
    /// Settings loaded from the config file (or defaults)
    settings: Settings,
}

impl Orchestrator {
    /// Create an orchestrator, loading settings next to the manifest
    pub fn new(args: CliArgs) -> Result<Self, AppError> {
        let config_dir = args
            .command
            .manifest_path()
            .map(parent_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let settings = Settings::load(args.config.as_deref(), &config_dir)?;
        Ok(Self::with_settings(args, settings))
    }

    /// Create an orchestrator with explicit settings (for testing)
    pub fn with_settings(args: CliArgs, settings: Settings) -> Self {
        Self { args, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Manifest path: CLI argument, else the configured one
    pub fn manifest_path(&self) -> PathBuf {
        self.args
            .command
            .manifest_path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.settings.manifest.clone())
    }

    /// Run the selected command
    pub async fn run(&self) -> Result<CommandReport, AppError> {
        tracing::debug!("reqcheck {} {}", self.args.command.name(), self.manifest_path().display());

        match &self.args.command {
            Command::Lint { .. } => Ok(CommandReport::Lint(lint_file(&self.manifest_path())?)),
            Command::Check { filter, env, .. } => {
                Ok(CommandReport::Check(self.check(filter, env)?))
            }
            Command::Install {
                filter,
                env,
                dry_run,
                ..
            } => Ok(CommandReport::Install(self.install(filter, env, *dry_run)?)),
            Command::Outdated {
                filter,
                pre,
                index_url,
                ..
            } => Ok(CommandReport::Outdated(
                self.outdated(filter, *pre, index_url.as_deref()).await?,
            )),
        }
    }

    fn load_manifest(&self) -> Result<Manifest, AppError> {
        let manifest = read_manifest(&self.manifest_path())?;
        tracing::debug!(
            "{}: {} requirement(s)",
            manifest.display_path(),
            manifest.len()
        );
        Ok(manifest)
    }

    fn check(&self, filter: &FilterArgs, env: &EnvironmentArgs) -> Result<CheckReport, AppError> {
        let manifest = self.load_manifest()?;
        let probe = self.probe(env);
        let installed = self.snapshot(probe.as_ref())?;
        Ok(Checker::new(build_filter(filter)).check(&manifest, &installed))
    }

    fn install(
        &self,
        filter: &FilterArgs,
        env: &EnvironmentArgs,
        dry_run: bool,
    ) -> Result<InstallReport, AppError> {
        let manifest = self.load_manifest()?;
        let probe = self.probe(env);
        let runner = SystemPackageManager::new(self.python(env))
            .with_extra_args(self.settings.pip_args.clone());
        let installer =
            Installer::new(runner, Checker::new(build_filter(filter))).with_dry_run(dry_run);

        let mut progress = Progress::new(self.args.show_progress() && !dry_run);
        progress.spinner("Installing requirements");
        let report = installer.install(&manifest, probe.as_ref(), &parent_dir(&self.manifest_path()));
        progress.finish_and_clear();
        Ok(report?)
    }

    async fn outdated(
        &self,
        filter: &FilterArgs,
        pre: bool,
        index_url: Option<&str>,
    ) -> Result<OutdatedReport, AppError> {
        let manifest = self.load_manifest()?;
        let index_url = index_url.unwrap_or(&self.settings.index_url);
        tracing::debug!("querying {}", index_url);

        let client = HttpClient::with_timeout(self.settings.timeout())?;
        let lookup = OutdatedLookup::new(
            Arc::new(PyPIAdapter::with_index_url(client, index_url)),
            ReleaseJudge::new().with_prereleases(pre),
            build_filter(filter),
            self.settings.concurrency,
        );

        let mut progress = Progress::new(self.args.show_progress());
        Ok(lookup.run(&manifest, &mut progress).await)
    }

    /// Interpreter: CLI flag, else the configured one
    fn python(&self, env: &EnvironmentArgs) -> String {
        env.python
            .clone()
            .unwrap_or_else(|| self.settings.python.clone())
    }

    /// Probe reading a freeze file when given, otherwise asking pip
    fn probe(&self, env: &EnvironmentArgs) -> Box<dyn EnvironmentProbe> {
        match &env.freeze {
            Some(path) => Box::new(FreezeFileProbe::new(path)),
            None => Box::new(PipProbe::new(self.python(env))),
        }
    }

    fn snapshot(&self, probe: &dyn EnvironmentProbe) -> Result<InstalledPackages, EnvironmentError> {
        let mut progress = Progress::new(self.args.show_progress());
        progress.spinner(&format!("Reading {}", probe.describe()));
        let installed = probe.installed();
        progress.finish_and_clear();

        let installed = installed?;
        tracing::debug!("{}: {} package(s)", probe.describe(), installed.len());
        Ok(installed)
    }
}

/// Build a PackageFilter from CLI arguments
fn build_filter(args: &FilterArgs) -> PackageFilter {
    let mut filter = PackageFilter::new();
    if !args.exclude.is_empty() {
        filter = filter.with_exclude(args.exclude.clone());
    }
    if !args.only.is_empty() {
        filter = filter.with_only(args.only.clone());
    }
    filter
}

/// Directory holding `path`, `.` for bare file names
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
