//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: Issues with reading or validating the requirements manifest
//! - EnvironmentError: Issues with inspecting the installed environment
//! - RegistryError: Issues with package index communication
//! - ConfigError: Issues with the configuration file or CLI values

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Installed environment related errors
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    /// Package index related errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A version string that does not follow the package index's versioning scheme
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid version '{value}'")]
pub struct VersionParseError {
    pub value: String,
}

impl VersionParseError {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// The ways a single manifest line can be malformed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineErrorKind {
    /// Package name contains characters outside `[A-Za-z0-9._-]` or is empty
    InvalidName(String),
    /// A comparison operator other than `>=`
    UnsupportedOperator(String),
    /// The text after `>=` is not a version
    InvalidVersion(String),
    /// `name>=` with nothing after the operator
    MissingVersion,
    /// Syntax the manifest format does not allow (extras, markers, URLs, options)
    UnsupportedSyntax(String),
    /// The same package was already declared on an earlier line
    DuplicateRequirement { name: String, first_line: usize },
}

impl fmt::Display for LineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineErrorKind::InvalidName(name) if name.is_empty() => {
                write!(f, "missing package name")
            }
            LineErrorKind::InvalidName(name) => write!(f, "invalid package name '{}'", name),
            LineErrorKind::UnsupportedOperator(op) => {
                write!(f, "unsupported operator '{}' (only '>=' is allowed)", op)
            }
            LineErrorKind::InvalidVersion(version) => write!(f, "invalid version '{}'", version),
            LineErrorKind::MissingVersion => write!(f, "missing version after '>='"),
            LineErrorKind::UnsupportedSyntax(what) => write!(f, "unsupported syntax: {}", what),
            LineErrorKind::DuplicateRequirement { name, first_line } => {
                write!(f, "'{}' is already required on line {}", name, first_line)
            }
        }
    }
}

/// A malformed manifest line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct LineError {
    /// 1-based line number
    pub line: usize,
    /// The offending line as written
    pub content: String,
    /// What is wrong with it
    pub kind: LineErrorKind,
}

impl LineError {
    pub fn new(line: usize, content: impl Into<String>, kind: LineErrorKind) -> Self {
        Self {
            line,
            content: content.into(),
            kind,
        }
    }
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One or more lines failed validation
    #[error("invalid manifest {}: {} error(s)", .path.display(), .errors.len())]
    Invalid {
        path: PathBuf,
        errors: Vec<LineError>,
    },
}

/// Errors related to inspecting the installed environment
#[derive(Error, Debug)]
pub enum EnvironmentError {
    /// The interpreter or installer could not be started or exited non-zero
    #[error("command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    /// The installer printed something that is not the expected listing
    #[error("unexpected output from '{command}': {message}")]
    InvalidOutput { command: String, message: String },

    /// Failed to read a freeze file
    #[error("failed to read freeze file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A freeze file line is not `name==version`
    #[error("invalid freeze file {path} at line {line}: '{content}'")]
    FreezeParse {
        path: PathBuf,
        line: usize,
        content: String,
    },
}

/// Errors related to package index communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not found in registry
    #[error("package '{package}' not found in {registry} registry")]
    PackageNotFound { package: String, registry: String },

    /// Network request failed
    #[error("failed to fetch package '{package}' from {registry}: {message}")]
    NetworkError {
        package: String,
        registry: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {registry} registry")]
    RateLimitExceeded { registry: String },

    /// Invalid response from registry
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{package}' from {registry}")]
    Timeout { package: String, registry: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicitly requested config file is missing
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read the config file
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or schema error
    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A value is syntactically fine but unusable
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new Invalid error from collected line errors
    pub fn invalid(path: impl Into<PathBuf>, errors: Vec<LineError>) -> Self {
        ManifestError::Invalid {
            path: path.into(),
            errors,
        }
    }

    /// Line-level errors carried by this error, if any
    pub fn line_errors(&self) -> &[LineError] {
        match self {
            ManifestError::Invalid { errors, .. } => errors,
            _ => &[],
        }
    }
}

impl EnvironmentError {
    /// Creates a new CommandFailed error
    pub fn command_failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        EnvironmentError::CommandFailed {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidOutput error
    pub fn invalid_output(command: impl Into<String>, message: impl Into<String>) -> Self {
        EnvironmentError::InvalidOutput {
            command: command.into(),
            message: message.into(),
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            registry: registry.into(),
        }
    }
}

impl ConfigError {
    /// Creates a new InvalidValue error
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_error_not_found() {
        let err = ManifestError::not_found("/path/to/requirements.txt");
        let msg = format!("{}", err);
        assert!(msg.contains("manifest file not found"));
        assert!(msg.contains("requirements.txt"));
    }

    #[test]
    fn test_manifest_error_invalid_counts_lines() {
        let errors = vec![
            LineError::new(2, "foo==1.0", LineErrorKind::UnsupportedOperator("==".into())),
            LineError::new(5, "bar>=", LineErrorKind::MissingVersion),
        ];
        let err = ManifestError::invalid("requirements.txt", errors);
        assert_eq!(err.to_string(), "invalid manifest requirements.txt: 2 error(s)");
        assert_eq!(err.line_errors().len(), 2);
    }

    #[test]
    fn test_line_error_display() {
        let err = LineError::new(3, "toposort==1.5", LineErrorKind::UnsupportedOperator("==".into()));
        assert_eq!(
            err.to_string(),
            "line 3: unsupported operator '==' (only '>=' is allowed)"
        );

        let err = LineError::new(1, ">=1.0", LineErrorKind::InvalidName(String::new()));
        assert_eq!(err.to_string(), "line 1: missing package name");
    }

    #[test]
    fn test_duplicate_requirement_display() {
        let kind = LineErrorKind::DuplicateRequirement {
            name: "Pygments".into(),
            first_line: 4,
        };
        assert_eq!(kind.to_string(), "'Pygments' is already required on line 4");
    }

    #[test]
    fn test_environment_error_command_failed() {
        let err = EnvironmentError::command_failed("python3 -m pip list", "exit status 1");
        let msg = err.to_string();
        assert!(msg.contains("python3 -m pip list"));
        assert!(msg.contains("exit status 1"));
    }

    #[test]
    fn test_registry_error_package_not_found() {
        let err = RegistryError::package_not_found("nonexistent-package", "PyPI");
        let msg = format!("{}", err);
        assert!(msg.contains("package 'nonexistent-package' not found"));
        assert!(msg.contains("PyPI"));
    }

    #[test]
    fn test_registry_error_timeout() {
        let err = RegistryError::timeout("toposort", "PyPI");
        assert!(err.to_string().contains("timeout"));
        assert!(err.to_string().contains("toposort"));
    }

    #[test]
    fn test_config_error_invalid_value() {
        let err = ConfigError::invalid_value("concurrency", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid value for 'concurrency': must be at least 1"
        );
    }

    #[test]
    fn test_app_error_from_manifest_error() {
        let app_err: AppError = ManifestError::not_found("/path").into();
        assert!(app_err.to_string().contains("manifest file not found"));
    }

    #[test]
    fn test_app_error_from_environment_error() {
        let app_err: AppError = EnvironmentError::invalid_output("pip", "not json").into();
        assert!(app_err.to_string().contains("unexpected output"));
    }

    #[test]
    fn test_version_parse_error_display() {
        assert_eq!(
            VersionParseError::new("abc").to_string(),
            "invalid version 'abc'"
        );
    }
}
