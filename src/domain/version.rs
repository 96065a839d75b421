use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ReleasePostError, Result, VersionRole};

/// `major.minor.patch`, optional `-prerelease` (dot separated alphanumeric/hyphen
/// identifiers) and optional `+build` suffix.
const VERSION_PATTERN: &str = r"^([0-9]+)\.([0-9]+)\.([0-9]+)(?:-([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?(?:\+([0-9A-Za-z-]+))?$";

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VERSION_PATTERN).expect("version pattern compiles"))
}

/// Semantic version of a release.
///
/// Fields are private: a parsed version never changes, derived versions are new values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    prerelease: Option<String>,
    build: Option<String>,
}

impl Version {
    /// Create a plain `major.minor.patch` version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    /// Parse a release version string.
    ///
    /// Accepts exactly the grammar of [`validate_format`]. Build metadata is kept
    /// but not validated beyond the grammar.
    ///
    /// # Example
    /// ```
    /// # use release_post::domain::Version;
    /// let v = Version::parse("6.8.0-beta.1").unwrap();
    /// assert_eq!(v.minor(), 8);
    /// assert_eq!(v.prerelease(), Some("beta.1"));
    /// assert!(Version::parse("6.8").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let captures = version_regex().captures(raw).ok_or_else(|| {
            ReleasePostError::invalid_version(
                VersionRole::Unspecified,
                raw,
                "expected MAJOR.MINOR.PATCH with optional -prerelease and +build",
            )
        })?;

        let number = |index: usize| -> Result<u64> {
            captures[index].parse::<u64>().map_err(|_| {
                ReleasePostError::invalid_version(
                    VersionRole::Unspecified,
                    raw,
                    format!("component '{}' is out of range", &captures[index]),
                )
            })
        };

        Ok(Version {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            prerelease: captures.get(4).map(|m| m.as_str().to_string()),
            build: captures.get(5).map(|m| m.as_str().to_string()),
        })
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn prerelease(&self) -> Option<&str> {
        self.prerelease.as_deref()
    }

    pub fn build(&self) -> Option<&str> {
        self.build.as_deref()
    }

    /// Last release of the previous minor line, e.g. `6.8.1-rc.1` -> `6.7.0`.
    ///
    /// A `.0` minor has no previous minor line in the same major; that is
    /// reported as an invalid previous version rather than guessed.
    pub fn derive_previous(&self) -> Result<Version> {
        if self.minor == 0 {
            return Err(ReleasePostError::invalid_version(
                VersionRole::Previous,
                self.to_string(),
                "cannot derive a previous minor release from a .0 minor line; pass --previousVersion",
            ));
        }

        Ok(Version::new(self.major, self.minor - 1, 0))
    }

    /// Semantic-version precedence check (`self < other`).
    ///
    /// Returns `None` when either side cannot be expressed as a strict semver
    /// version (e.g. numeric prerelease identifiers with leading zeros).
    pub fn is_older_than(&self, other: &Version) -> Option<bool> {
        let ours = semver::Version::parse(&self.to_string()).ok()?;
        let theirs = semver::Version::parse(&other.to_string()).ok()?;
        Some(ours < theirs)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = ReleasePostError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

/// Strict pre-flight format check; same grammar as [`Version::parse`].
pub fn validate_format(raw: &str) -> bool {
    Version::parse(raw).is_ok()
}

/// The pair of releases a post compares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    pub current: Version,
    pub previous: Version,
}

impl VersionRange {
    /// Resolve both ends of a release range.
    ///
    /// The previous version is taken from `previous` when given, otherwise derived
    /// from `current`. Errors name which of the two versions was rejected.
    pub fn resolve(current: &str, previous: Option<&str>) -> Result<Self> {
        let current_version =
            Version::parse(current).map_err(|e| e.with_role(VersionRole::Current))?;

        let previous_version = match previous {
            Some(raw) => Version::parse(raw).map_err(|e| e.with_role(VersionRole::Previous))?,
            None => current_version.derive_previous()?,
        };

        // Derived versions go through the same gate as user input.
        let previous_raw = previous_version.to_string();
        if !validate_format(&previous_raw) {
            return Err(ReleasePostError::invalid_version(
                VersionRole::Previous,
                previous_raw,
                "resolved previous version does not match the version grammar",
            ));
        }

        Ok(VersionRange {
            current: current_version,
            previous: previous_version,
        })
    }
}
