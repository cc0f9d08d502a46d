//! CLI argument parsing module for reqcheck

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Requirements manifest linter, checker and installer
#[derive(Parser, Debug, Clone)]
#[command(
    name = "reqcheck",
    version,
    about = "Requirements manifest linter, checker and installer"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    // Output options
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output (also honoured: NO_COLOR)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (default: reqcheck.toml next to the manifest)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Validate every line of the manifest
    Lint {
        #[command(flatten)]
        manifest: ManifestArgs,
    },

    /// Check the manifest against the installed environment
    Check {
        #[command(flatten)]
        manifest: ManifestArgs,
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        env: EnvironmentArgs,
    },

    /// Install or upgrade whatever the environment is missing
    Install {
        #[command(flatten)]
        manifest: ManifestArgs,
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        env: EnvironmentArgs,

        /// Show the install plan without running the installer
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Compare declared minimums with the package index
    Outdated {
        #[command(flatten)]
        manifest: ManifestArgs,
        #[command(flatten)]
        filter: FilterArgs,

        /// Consider pre-releases when picking the latest release
        #[arg(long)]
        pre: bool,

        /// Base URL of a PyPI-compatible JSON API
        #[arg(long, value_name = "URL")]
        index_url: Option<String>,
    },
}

/// Manifest selection
#[derive(Args, Debug, Clone, Default)]
pub struct ManifestArgs {
    /// Manifest file (default: the configured manifest, requirements.txt)
    #[arg(value_name = "MANIFEST")]
    pub path: Option<PathBuf>,
}

/// Package filters
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only consider specific packages (can be specified multiple times)
    #[arg(long, action = ArgAction::Append, value_name = "NAME")]
    pub only: Vec<String>,

    /// Exclude specific packages (can be specified multiple times)
    #[arg(long, action = ArgAction::Append, value_name = "NAME")]
    pub exclude: Vec<String>,
}

/// Where the installed environment is read from
#[derive(Args, Debug, Clone, Default)]
pub struct EnvironmentArgs {
    /// Read installed packages from a freeze file instead of running pip
    #[arg(long, value_name = "FILE")]
    pub freeze: Option<PathBuf>,

    /// Python interpreter whose environment is used
    #[arg(long, value_name = "EXE")]
    pub python: Option<String>,
}

impl Command {
    /// The manifest path given on the command line, if any
    pub fn manifest_path(&self) -> Option<&Path> {
        let args = match self {
            Command::Lint { manifest }
            | Command::Check { manifest, .. }
            | Command::Install { manifest, .. }
            | Command::Outdated { manifest, .. } => manifest,
        };
        args.path.as_deref()
    }

    /// Subcommand name as typed
    pub fn name(&self) -> &'static str {
        match self {
            Command::Lint { .. } => "lint",
            Command::Check { .. } => "check",
            Command::Install { .. } => "install",
            Command::Outdated { .. } => "outdated",
        }
    }
}

impl CliArgs {
    /// Whether colored output is allowed
    pub fn use_color(&self) -> bool {
        !self.no_color && !matches!(std::env::var_os("NO_COLOR"), Some(v) if !v.is_empty())
    }

    /// Whether progress indicators may be drawn
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }
}
