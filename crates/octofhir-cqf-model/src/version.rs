//! Dotted version ordering
//!
//! Versions are dot-separated non-negative integers (`1`, `1.0`, `4.0.1`). Segment
//! counts may differ; the shorter version is zero-padded before comparison, so
//! `1.0` and `1.0.0` are equal. An absent version sorts above every concrete one.

use octofhir_cqf_diagnostics::{ErrorCode, CQF0102};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Version parse error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("Invalid version '{version}': segment '{segment}' is not a non-negative integer")]
    InvalidSegment { version: String, segment: String },
}

impl VersionError {
    pub fn code(&self) -> ErrorCode {
        CQF0102
    }
}

/// A parsed dotted version
#[derive(Debug, Clone)]
pub struct Version {
    segments: SmallVec<[u64; 4]>,
}

impl Version {
    /// Parse a dotted version string
    pub fn parse(version: &str) -> Result<Self, VersionError> {
        let segments = version
            .split('.')
            .map(|segment| {
                segment
                    .parse::<u64>()
                    .map_err(|_| VersionError::InvalidSegment {
                        version: version.to_string(),
                        segment: segment.to_string(),
                    })
            })
            .collect::<Result<SmallVec<[u64; 4]>, _>>()?;

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[u64] {
        &self.segments
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let left = self.segments.get(i).copied().unwrap_or(0);
            let right = other.segments.get(i).copied().unwrap_or(0);
            match left.cmp(&right) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
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

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
            first = false;
        }
        Ok(())
    }
}

/// Compare two optional version strings, treating `None` as the newest version.
pub fn compare_versions(left: Option<&str>, right: Option<&str>) -> Result<Ordering, VersionError> {
    match (left, right) {
        (None, None) => Ok(Ordering::Equal),
        (Some(_), None) => Ok(Ordering::Less),
        (None, Some(_)) => Ok(Ordering::Greater),
        (Some(left), Some(right)) => Ok(Version::parse(left)?.cmp(&Version::parse(right)?)),
    }
}

/// `true` when `candidate` sorts strictly after `current`
pub fn is_newer(candidate: Option<&str>, current: Option<&str>) -> Result<bool, VersionError> {
    Ok(compare_versions(candidate, current)? == Ordering::Greater)
}
