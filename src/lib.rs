//! reqcheck - Requirements manifest linter, checker and installer library
//!
//! This library provides the core functionality for working with
//! `requirements.txt`-style dependency manifests:
//! - Parsing and linting (`name` or `name>=X.Y` per line, `#` comments)
//! - Checking declared minimums against an installed environment
//! - Planning and running idempotent installs
//! - Comparing declared minimums with the package index

pub mod check;
pub mod cli;
pub mod config;
pub mod domain;
pub mod environment;
pub mod error;
pub mod install;
pub mod orchestrator;
pub mod outdated;
pub mod output;
pub mod package_manager;
pub mod parser;
pub mod progress;
pub mod registry;
