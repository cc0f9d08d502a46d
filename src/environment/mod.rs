//! Installed environment inspection
//!
//! This module provides:
//! - The `EnvironmentProbe` seam used by check and install
//! - A probe reading `name==version` freeze files
//! - A probe asking the interpreter's installer for its package list

mod freeze;
mod pip;

pub use freeze::{parse_freeze, FreezeFileProbe};
pub use pip::{parse_pip_list, PipProbe};

use crate::domain::InstalledPackages;
use crate::error::EnvironmentError;

/// Source of truth for what is installed
pub trait EnvironmentProbe {
    /// Snapshot the installed packages
    fn installed(&self) -> Result<InstalledPackages, EnvironmentError>;

    /// Human-readable description used in logs and reports
    fn describe(&self) -> String;
}
