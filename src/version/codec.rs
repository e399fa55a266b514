//! Punctuation-delimited, base-36 version ordering
//!
//! A version such as `1.7.10-4` or `3.0.a` is cut on every ASCII punctuation
//! character and each token is read as a base-36 integer. Two versions are
//! compared token by token starting from the *last* token, so the rightmost
//! written segment is the most significant one. Manifests in the wild are
//! ordered by this rule; it must not be flipped to a left-to-right scan.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::VersionParseError;

const RADIX: u32 = 36;

/// A parsed manifest version
///
/// Equality follows the ordering: `1.0` and `1.0.0` are equal because missing
/// tokens count as zero.
#[derive(Debug, Clone)]
pub struct ManifestVersion {
    raw: String,
    tokens: Vec<u64>,
}

impl ManifestVersion {
    pub fn parse(version: &str) -> Result<Self, VersionParseError> {
        let mut segments: Vec<&str> = version.split(|c: char| c.is_ascii_punctuation()).collect();

        // A version ending in punctuation ("1.0.") has no trailing token
        while segments.len() > 1 && segments.last().is_some_and(|s| s.is_empty()) {
            segments.pop();
        }

        let tokens = segments
            .into_iter()
            .enumerate()
            .map(|(position, segment)| {
                if segment.is_empty() {
                    return Err(VersionParseError::EmptySegment {
                        version: version.to_string(),
                        position,
                    });
                }
                u64::from_str_radix(segment, RADIX).map_err(|_| {
                    VersionParseError::InvalidSegment {
                        version: version.to_string(),
                        segment: segment.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: version.to_string(),
            tokens,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[u64] {
        &self.tokens
    }

    fn token(&self, index: usize) -> u64 {
        self.tokens.get(index).copied().unwrap_or(0)
    }
}

impl FromStr for ManifestVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ManifestVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Ord for ManifestVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.tokens.len().max(other.tokens.len());
        (0..len)
            .rev()
            .map(|i| self.token(i).cmp(&other.token(i)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for ManifestVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ManifestVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ManifestVersion {}

/// Compare two optional version strings
///
/// An absent version is older than any present one; two absent versions are
/// equal. Only a malformed token in a present version is an error.
pub fn compare_versions(a: Option<&str>, b: Option<&str>) -> Result<Ordering, VersionParseError> {
    match (a, b) {
        (None, None) => Ok(Ordering::Equal),
        (None, Some(_)) => Ok(Ordering::Less),
        (Some(_), None) => Ok(Ordering::Greater),
        (Some(a), Some(b)) => Ok(ManifestVersion::parse(a)?.cmp(&ManifestVersion::parse(b)?)),
    }
}

/// [`compare_versions`] as -1, 0 or 1
pub fn compare_version_sign(a: Option<&str>, b: Option<&str>) -> Result<i32, VersionParseError> {
    compare_versions(a, b).map(|ordering| ordering as i32)
}
