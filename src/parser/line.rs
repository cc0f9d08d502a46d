//! Single-line requirement grammar
//!
//! Accepted forms:
//! - blank line
//! - `# comment`
//! - `name`
//! - `name>=1.2` (whitespace around `>=` allowed)
//! - either requirement form followed by ` # inline comment`

use crate::domain::{Version, VersionConstraint};
use crate::error::{LineError, LineErrorKind};
use regex::Regex;
use std::sync::LazyLock;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?$").unwrap());

/// Comparison operators the installer understands, longest first
const OPERATORS: [&str; 8] = ["===", "==", ">=", "<=", "!=", "~=", ">", "<"];

/// Characters that end a package name
const NAME_TERMINATORS: &str = "<>=!~;[@,";

/// A successfully parsed manifest line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Blank,
    Comment(String),
    Requirement {
        name: String,
        constraint: VersionConstraint,
        inline_comment: Option<String>,
    },
}

/// Parse one manifest line; `line` is the 1-based line number used in errors
pub fn parse_line(text: &str, line: usize) -> Result<ParsedLine, LineError> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Ok(ParsedLine::Blank);
    }

    if let Some(comment) = trimmed.strip_prefix('#') {
        return Ok(ParsedLine::Comment(comment_text(comment)));
    }

    let error = |kind: LineErrorKind| LineError::new(line, text, kind);
    let (body, inline_comment) = split_inline_comment(trimmed);

    if body.starts_with('-') {
        return Err(error(LineErrorKind::UnsupportedSyntax(
            "installer options".to_string(),
        )));
    }

    let name_end = body
        .find(|c: char| c.is_whitespace() || NAME_TERMINATORS.contains(c))
        .unwrap_or(body.len());
    let (name, rest) = body.split_at(name_end);

    if !NAME_RE.is_match(name) {
        return Err(error(LineErrorKind::InvalidName(name.to_string())));
    }

    let rest = rest.trim_start();
    if rest.is_empty() {
        return Ok(ParsedLine::Requirement {
            name: name.to_string(),
            constraint: VersionConstraint::Any,
            inline_comment,
        });
    }

    match rest.chars().next() {
        Some('[') => {
            return Err(error(LineErrorKind::UnsupportedSyntax("extras".to_string())));
        }
        Some(';') => {
            return Err(error(LineErrorKind::UnsupportedSyntax(
                "environment markers".to_string(),
            )));
        }
        Some('@') => {
            return Err(error(LineErrorKind::UnsupportedSyntax(
                "direct references".to_string(),
            )));
        }
        _ => {}
    }

    let Some(operator) = OPERATORS.iter().find(|op| rest.starts_with(**op)) else {
        return Err(error(LineErrorKind::UnsupportedSyntax(format!(
            "unexpected text '{}'",
            rest
        ))));
    };

    if *operator != ">=" {
        return Err(error(LineErrorKind::UnsupportedOperator(operator.to_string())));
    }

    let version_text = rest[operator.len()..].trim();
    if version_text.is_empty() {
        return Err(error(LineErrorKind::MissingVersion));
    }
    if version_text.contains(',') {
        return Err(error(LineErrorKind::UnsupportedSyntax(
            "multiple version constraints".to_string(),
        )));
    }
    if version_text.contains(';') {
        return Err(error(LineErrorKind::UnsupportedSyntax(
            "environment markers".to_string(),
        )));
    }

    let version = Version::parse(version_text)
        .map_err(|_| error(LineErrorKind::InvalidVersion(version_text.to_string())))?;

    Ok(ParsedLine::Requirement {
        name: name.to_string(),
        constraint: VersionConstraint::AtLeast(version),
        inline_comment,
    })
}

/// Comment text without the marker and its first space
fn comment_text(after_marker: &str) -> String {
    after_marker
        .strip_prefix(' ')
        .unwrap_or(after_marker)
        .trim_end()
        .to_string()
}

/// Split `body  # comment`; a `#` only starts a comment after whitespace
fn split_inline_comment(line: &str) -> (&str, Option<String>) {
    let mut previous_is_space = false;
    for (idx, c) in line.char_indices() {
        if c == '#' && previous_is_space {
            return (line[..idx].trim_end(), Some(comment_text(&line[idx + 1..])));
        }
        previous_is_space = c.is_whitespace();
    }
    (line, None)
}
