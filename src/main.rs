//! reqcheck - Requirements manifest linter, checker and installer CLI tool
//!
//! Subcommands:
//! - lint: validate every manifest line
//! - check: compare declared minimums with an installed environment
//! - install: install or upgrade what is missing, then verify
//! - outdated: compare declared minimums with the package index

use clap::Parser;
use reqcheck::cli::CliArgs;
use reqcheck::error::{AppError, ManifestError};
use reqcheck::orchestrator::{Orchestrator, EXIT_ERROR};
use reqcheck::output::{create_formatter, OutputConfig};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    if !args.use_color() {
        colored::control::set_override(false);
    }

    // Run the main logic and handle errors
    match run(args).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            report_error(&e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Logs go to stderr so stdout stays clean for reports; RUST_LOG wins over --verbose
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "reqcheck=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<u8> {
    let output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet, args.use_color());

    let orchestrator = Orchestrator::new(args)?;
    let report = orchestrator.run().await?;

    let formatter = create_formatter(&output_config);
    let mut stdout = io::stdout().lock();
    report.write(formatter.as_ref(), &mut stdout)?;
    stdout.flush()?;

    Ok(report.exit_code())
}

/// Print an error on stderr, listing every bad line for invalid manifests
fn report_error(error: &anyhow::Error) {
    eprintln!("Error: {}", error);

    if let Some(AppError::Manifest(ManifestError::Invalid { path, errors })) =
        error.downcast_ref::<AppError>()
    {
        for line_error in errors {
            eprintln!("  {}:{}: {}", path.display(), line_error.line, line_error.kind);
        }
    }
}
