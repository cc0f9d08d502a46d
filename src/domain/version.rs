//! Release version type for the package index's versioning scheme
//!
//! Handles version strings like:
//! - Release: `1.5`, `2.28.0`
//! - Pre-release: `1.5a1`, `2.0b2`, `3.0rc1`
//! - Epoch: `1!2.0`
//! - Post-release: `1.5.post1`, `1.5-1`, `1.5r1`
//! - Development: `1.5.dev0`
//! - Local label: `2.0.0+cu118`

use crate::error::VersionParseError;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)^v?
        (?:(?P<epoch>\d+)!)?
        (?P<release>\d+(?:\.\d+)*)
        (?:[-_.]?(?P<pre_kind>alpha|a|beta|b|preview|pre|rc|c)[-_.]?(?P<pre_num>\d+)?)?
        (?:-(?P<post_implicit>\d+)|[-_.]?(?P<post_tag>post|rev|r)[-_.]?(?P<post>\d+)?)?
        (?:[-_.]?(?P<dev_tag>dev)[-_.]?(?P<dev>\d+)?)?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?$",
    )
    .unwrap()
});

/// Pre-release phase, ordered alpha < beta < release candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreRelease {
    Alpha,
    Beta,
    Rc,
}

impl PreRelease {
    fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "a" | "alpha" => PreRelease::Alpha,
            "b" | "beta" => PreRelease::Beta,
            _ => PreRelease::Rc,
        }
    }
}

/// Where a version sits relative to its own release segment
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    /// `1.0.dev0`: before every pre-release of 1.0
    DevOnly,
    Pre(PreRelease, u64),
    Final,
}

/// A parsed package version
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreRelease, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<String>,
}

impl Version {
    /// Parse a version string
    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        let trimmed = input.trim();
        let caps = VERSION_RE
            .captures(trimmed)
            .ok_or_else(|| VersionParseError::new(input))?;

        let release = caps["release"]
            .split('.')
            .map(|part| part.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| VersionParseError::new(input))?;

        let number = |name: &str| -> Result<Option<u64>, VersionParseError> {
            caps.name(name)
                .map(|m| m.as_str().parse::<u64>())
                .transpose()
                .map_err(|_| VersionParseError::new(input))
        };

        let pre = match caps.name("pre_kind") {
            Some(kind) => Some((
                PreRelease::from_tag(kind.as_str()),
                number("pre_num")?.unwrap_or(0),
            )),
            None => None,
        };

        // `post` and `dev` may appear without a number
        let post = match (caps.name("post_tag"), number("post_implicit")?) {
            (_, Some(n)) => Some(n),
            (Some(_), None) => Some(number("post")?.unwrap_or(0)),
            (None, None) => None,
        };
        let dev = match caps.name("dev_tag") {
            Some(_) => Some(number("dev")?.unwrap_or(0)),
            None => None,
        };

        Ok(Self {
            raw: trimmed.to_string(),
            epoch: number("epoch")?.unwrap_or(0),
            release,
            pre,
            post,
            dev,
            local: caps.name("local").map(|m| m.as_str().to_ascii_lowercase()),
        })
    }

    /// The version as originally written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Epoch, zero when not written
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Numeric release segments (`[2, 28, 0]` for `2.28.0`)
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// Release segment at `index`, zero when absent
    pub fn segment(&self, index: usize) -> u64 {
        self.release.get(index).copied().unwrap_or(0)
    }

    /// Returns true for alpha, beta, release-candidate and development versions
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    fn phase(&self) -> Phase {
        match (self.pre, self.post, self.dev) {
            (Some((kind, n)), _, _) => Phase::Pre(kind, n),
            (None, None, Some(_)) => Phase::DevOnly,
            _ => Phase::Final,
        }
    }

    fn compare_release(&self, other: &Self) -> Ordering {
        let len = self.release.len().max(other.release.len());
        (0..len)
            .map(|i| self.segment(i).cmp(&other.segment(i)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }

    /// Local labels compare segment by segment; numeric segments compare as
    /// numbers and sort after alphanumeric ones
    fn compare_local(&self, other: &Self) -> Ordering {
        match (&self.local, &other.local) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => {
                let mut left = a.split(['.', '-', '_']).map(LocalSegment::from);
                let mut right = b.split(['.', '-', '_']).map(LocalSegment::from);
                loop {
                    match (left.next(), right.next()) {
                        (None, None) => return Ordering::Equal,
                        (None, Some(_)) => return Ordering::Less,
                        (Some(_), None) => return Ordering::Greater,
                        (Some(l), Some(r)) => match l.cmp(&r) {
                            Ordering::Equal => continue,
                            ord => return ord,
                        },
                    }
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum LocalSegment<'a> {
    Text(&'a str),
    Number(u64),
}

impl<'a> From<&'a str> for LocalSegment<'a> {
    fn from(segment: &'a str) -> Self {
        match segment.parse::<u64>() {
            Ok(n) => LocalSegment::Number(n),
            Err(_) => LocalSegment::Text(segment),
        }
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        // A version without a dev tag sorts after the same version with one
        let dev_key = |v: &Version| match v.dev {
            Some(n) => (0u8, n),
            None => (1u8, 0),
        };

        self.epoch
            .cmp(&other.epoch)
            .then_with(|| self.compare_release(other))
            .then_with(|| self.phase().cmp(&other.phase()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| dev_key(self).cmp(&dev_key(other)))
            .then_with(|| self.compare_local(other))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Version::parse(&raw).map_err(serde::de::Error::custom)
    }
}
