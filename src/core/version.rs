//! Release version parsing.
//!
//! Addon releases are tagged `X.Y.Z` or `X.Y.Z-<pre>` (e.g. `2.0.0-er4`,
//! `1.2.3-rc1`). Bundle directories are keyed by the base form so every
//! pre-release of the same release lands in the same place.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

pub const DEFAULT_TAG_PREFIX: &str = "v";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    inner: semver::Version,
}

impl Version {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let raw = trimmed.strip_prefix('v').unwrap_or(trimmed);

        let inner = semver::Version::parse(raw).map_err(|e| {
            Error::validation_invalid_argument(
                "version",
                format!("Invalid version '{}': {}", input, e),
                Some(input.to_string()),
                Some(vec!["2.0.0".to_string(), "2.0.0-er4".to_string()]),
            )
        })?;

        if !inner.build.is_empty() {
            return Err(Error::validation_invalid_argument(
                "version",
                format!("Build metadata is not supported in release versions: '{}'", input),
                Some(input.to_string()),
                None,
            ));
        }

        Ok(Self { inner })
    }

    /// `X.Y.Z` without any pre-release suffix.
    pub fn base(&self) -> String {
        format!(
            "{}.{}.{}",
            self.inner.major, self.inner.minor, self.inner.patch
        )
    }

    /// Git tag the addon bundle sources are published under.
    pub fn tag_name(&self, prefix: Option<&str>) -> String {
        format!("{}{}", prefix.unwrap_or(DEFAULT_TAG_PREFIX), self)
    }

    pub fn is_pre_release(&self) -> bool {
        !self.inner.pre.is_empty()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
