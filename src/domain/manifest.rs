//! Parsed requirements manifest that keeps every source line

use super::Requirement;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What a manifest line holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LineKind {
    /// Whitespace only
    Blank,
    /// `#` comment, text after the marker
    Comment(String),
    /// Index into [`Manifest::requirements`]
    Requirement(usize),
}

/// A manifest line, its original text and terminator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestLine {
    pub raw: String,
    /// `"\n"`, `"\r\n"`, or empty for an unterminated last line
    #[serde(skip)]
    pub ending: String,
    pub kind: LineKind,
}

/// A requirements manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    /// Where the manifest was read from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    lines: Vec<ManifestLine>,
    requirements: Vec<Requirement>,
    #[serde(skip)]
    bom: bool,
}

impl Manifest {
    /// Creates an empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source path (builder pattern)
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub(crate) fn set_bom(&mut self, bom: bool) {
        self.bom = bom;
    }

    pub(crate) fn push_line(&mut self, raw: impl Into<String>, ending: &str, kind: LineKind) {
        self.lines.push(ManifestLine {
            raw: raw.into(),
            ending: ending.to_string(),
            kind,
        });
    }

    pub(crate) fn push_requirement(
        &mut self,
        raw: impl Into<String>,
        ending: &str,
        requirement: Requirement,
    ) {
        let index = self.requirements.len();
        self.requirements.push(requirement);
        self.push_line(raw, ending, LineKind::Requirement(index));
    }

    /// Requirements in declaration order
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// All lines, including comments and blanks
    pub fn lines(&self) -> &[ManifestLine] {
        &self.lines
    }

    /// Find a requirement by package name (normalization-insensitive)
    pub fn get(&self, name: &str) -> Option<&Requirement> {
        self.requirements.iter().find(|req| req.matches_name(name))
    }

    /// Number of requirements
    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    /// Returns true if the manifest declares no requirements
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Path used in messages, with a placeholder when unknown
    pub fn display_path(&self) -> String {
        self.path
            .as_deref()
            .map(Path::display)
            .map(|p| p.to_string())
            .unwrap_or_else(|| "<manifest>".to_string())
    }

    /// Render the manifest back to text with its original lines and line endings
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.bom {
            out.push('\u{feff}');
        }
        for line in &self.lines {
            out.push_str(&line.raw);
            out.push_str(&line.ending);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VersionConstraint;

    fn sample() -> Manifest {
        let mut manifest = Manifest::new().with_path("requirements.txt");
        manifest.push_line("# comment", "\n", LineKind::Comment("comment".into()));
        manifest.push_requirement(
            "Pygments",
            "\r\n",
            Requirement::new("Pygments", VersionConstraint::Any, 2),
        );
        manifest.push_line("", "", LineKind::Blank);
        manifest
    }

    #[test]
    fn test_lookup_is_normalized() {
        let manifest = sample();
        assert!(manifest.get("pygments").is_some());
        assert!(manifest.get("requests").is_none());
    }

    #[test]
    fn test_counts() {
        let manifest = sample();
        assert_eq!(manifest.len(), 1);
        assert!(!manifest.is_empty());
        assert_eq!(manifest.lines().len(), 3);
        assert!(Manifest::new().is_empty());
    }

    #[test]
    fn test_render_keeps_each_line_ending() {
        assert_eq!(sample().render(), "# comment\nPygments\r\n");
    }

    #[test]
    fn test_render_with_bom() {
        let mut manifest = sample();
        manifest.set_bom(true);
        assert_eq!(manifest.render(), "\u{feff}# comment\nPygments\r\n");
    }

    #[test]
    fn test_display_path() {
        assert_eq!(sample().display_path(), "requirements.txt");
        assert_eq!(Manifest::new().display_path(), "<manifest>");
    }
}
