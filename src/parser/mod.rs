//! Requirements manifest parser
//!
//! This module provides:
//! - Line-level parsing of the manifest grammar
//! - Whole-manifest parsing with rationale comment attachment
//! - Linting that reports every malformed line instead of stopping at the first

mod line;

pub use line::{parse_line, ParsedLine};

use crate::domain::{LineKind, Manifest, Requirement};
use crate::error::{LineError, LineErrorKind, ManifestError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Result of linting a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    /// Manifest that was linted
    pub path: Option<PathBuf>,
    /// Number of well-formed requirement lines
    pub requirement_count: usize,
    /// Every malformed line, in line order
    pub errors: Vec<LineError>,
}

impl LintReport {
    /// Returns true if no line failed validation
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse manifest text, collecting every line error
pub fn parse_manifest(content: &str) -> Result<Manifest, Vec<LineError>> {
    let (manifest, errors) = scan(content);
    if errors.is_empty() {
        Ok(manifest)
    } else {
        Err(errors)
    }
}

/// Lint manifest text
pub fn lint(content: &str) -> LintReport {
    let (manifest, errors) = scan(content);
    LintReport {
        path: None,
        requirement_count: manifest.len(),
        errors,
    }
}

/// Read and parse a manifest file
pub fn read_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let content = read_manifest_text(path)?;
    parse_manifest(&content)
        .map(|manifest| manifest.with_path(path))
        .map_err(|errors| ManifestError::invalid(path, errors))
}

/// Read and lint a manifest file
pub fn lint_file(path: &Path) -> Result<LintReport, ManifestError> {
    let content = read_manifest_text(path)?;
    let mut report = lint(&content);
    report.path = Some(path.to_path_buf());
    Ok(report)
}

fn read_manifest_text(path: &Path) -> Result<String, ManifestError> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ManifestError::not_found(path)
        } else {
            ManifestError::read_error(path, e)
        }
    })
}

/// Walk every line, building the manifest and collecting errors
fn scan(content: &str) -> (Manifest, Vec<LineError>) {
    let mut manifest = Manifest::new();
    let content = match content.strip_prefix('\u{feff}') {
        Some(rest) => {
            manifest.set_bom(true);
            rest
        }
        None => content,
    };

    let mut errors = Vec::new();
    let mut rationale: Vec<String> = Vec::new();
    let mut first_seen: HashMap<String, usize> = HashMap::new();

    for (idx, terminated) in content.split_inclusive('\n').enumerate() {
        let line_no = idx + 1;
        let (raw, ending) = split_ending(terminated);

        match parse_line(raw, line_no) {
            Ok(ParsedLine::Blank) => {
                rationale.clear();
                manifest.push_line(raw, ending, LineKind::Blank);
            }
            Ok(ParsedLine::Comment(text)) => {
                rationale.push(text.clone());
                manifest.push_line(raw, ending, LineKind::Comment(text));
            }
            Ok(ParsedLine::Requirement {
                name,
                constraint,
                inline_comment,
            }) => {
                let mut requirement = Requirement::new(name, constraint, line_no)
                    .with_rationale(std::mem::take(&mut rationale));
                if let Some(comment) = inline_comment {
                    requirement = requirement.with_inline_comment(comment);
                }

                if let Some(&first_line) = first_seen.get(&requirement.normalized_name) {
                    errors.push(LineError::new(
                        line_no,
                        raw,
                        LineErrorKind::DuplicateRequirement {
                            name: requirement.name.clone(),
                            first_line,
                        },
                    ));
                    continue;
                }

                first_seen.insert(requirement.normalized_name.clone(), line_no);
                manifest.push_requirement(raw, ending, requirement);
            }
            Err(error) => {
                tracing::debug!("line {} rejected: {}", line_no, error.kind);
                rationale.clear();
                errors.push(error);
            }
        }
    }

    (manifest, errors)
}

/// Split a line from its `\n` or `\r\n` terminator
fn split_ending(line: &str) -> (&str, &str) {
    if let Some(raw) = line.strip_suffix("\r\n") {
        (raw, "\r\n")
    } else if let Some(raw) = line.strip_suffix('\n') {
        (raw, "\n")
    } else {
        (line, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Version, VersionConstraint};

    const PORCUPINE: &str = "\
# appdirs 1.3.0 added user_log_dir
appdirs>=1.3
requests

# pygments 2.2 fixed the Tcl lexer
# (older versions crash on some files)
pygments>=2.2
toposort>=1.5
";

    #[test]
    fn test_parse_reference_manifest() {
        let manifest = parse_manifest(PORCUPINE).unwrap();
        let names: Vec<_> = manifest
            .requirements()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["appdirs", "requests", "pygments", "toposort"]);

        let toposort = manifest.get("toposort").unwrap();
        assert_eq!(
            toposort.constraint,
            VersionConstraint::AtLeast(Version::parse("1.5").unwrap())
        );
        assert_eq!(toposort.line, 8);
    }

    #[test]
    fn test_rationale_attachment() {
        let manifest = parse_manifest(PORCUPINE).unwrap();
        assert_eq!(
            manifest.get("appdirs").unwrap().rationale,
            vec!["appdirs 1.3.0 added user_log_dir"]
        );
        // Comment block belongs to the first requirement after it only
        assert!(manifest.get("requests").unwrap().rationale.is_empty());
        assert_eq!(manifest.get("pygments").unwrap().rationale.len(), 2);
        assert!(manifest.get("toposort").unwrap().rationale.is_empty());
    }

    #[test]
    fn test_blank_line_detaches_comment() {
        let manifest = parse_manifest("# orphan\n\nrequests\n").unwrap();
        assert!(manifest.get("requests").unwrap().rationale.is_empty());
    }

    #[test]
    fn test_render_roundtrip_preserves_text() {
        let manifest = parse_manifest(PORCUPINE).unwrap();
        assert_eq!(manifest.render(), PORCUPINE);

        let crlf = "# note\r\nrequests\r\n";
        assert_eq!(parse_manifest(crlf).unwrap().render(), crlf);
    }

    #[test]
    fn test_render_roundtrip_mixed_line_endings() {
        for content in [
            "# note\r\nrequests\n",
            "requests\n\r\ntoposort>=1.5",
            "appdirs>=1.3\r\n\n# trailing\r\n",
        ] {
            let manifest = parse_manifest(content).unwrap();
            assert_eq!(manifest.render(), content);
        }
    }

    #[test]
    fn test_render_roundtrip_keeps_bom() {
        let content = "\u{feff}requests\n";
        let manifest = parse_manifest(content).unwrap();
        assert_eq!(manifest.requirements()[0].line, 1);
        assert_eq!(manifest.render(), content);
    }

    #[test]
    fn test_empty_manifest() {
        let manifest = parse_manifest("").unwrap();
        assert!(manifest.is_empty());
        let manifest = parse_manifest("# only comments\n\n").unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_bom_is_ignored() {
        let manifest = parse_manifest("\u{feff}requests\n").unwrap();
        assert_eq!(manifest.requirements()[0].name, "requests");
    }

    #[test]
    fn test_collects_all_errors() {
        let errors = parse_manifest("toposort==1.5\nrequests\npygments>=\n").unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].line, 1);
        assert_eq!(errors[1].line, 3);
    }

    #[test]
    fn test_duplicate_requirement() {
        let errors = parse_manifest("Pygments>=2.2\nrequests\npygments\n").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].kind,
            LineErrorKind::DuplicateRequirement {
                name: "pygments".into(),
                first_line: 1
            }
        );
        assert_eq!(errors[0].line, 3);
    }

    #[test]
    fn test_lint_counts() {
        let report = lint("appdirs>=1.3\nbad==1\nrequests\n");
        assert!(!report.is_clean());
        assert_eq!(report.requirement_count, 2);
        assert_eq!(report.errors.len(), 1);

        assert!(lint(PORCUPINE).is_clean());
    }

    #[test]
    fn test_read_manifest_not_found() {
        let err = read_manifest(Path::new("/nonexistent/requirements.txt")).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[test]
    fn test_read_manifest_sets_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requirements.txt");
        std::fs::write(&path, PORCUPINE).unwrap();

        let manifest = read_manifest(&path).unwrap();
        assert_eq!(manifest.path.as_deref(), Some(path.as_path()));
        assert_eq!(manifest.len(), 4);
    }

    #[test]
    fn test_read_manifest_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requirements.txt");
        std::fs::write(&path, "toposort<2\n").unwrap();

        let err = read_manifest(&path).unwrap_err();
        assert_eq!(err.line_errors().len(), 1);
    }
}
