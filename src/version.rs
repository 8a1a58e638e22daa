//! Entity schema versioning

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::descriptor::VersionInfo;
use crate::error::{Result, SchemaError};

/// Version record of an entity schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Version string (e.g., "1.0.0")
    pub value: String,
    /// Versions this one extends; `None` rather than empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<Vec<String>>,
    /// Change notes
    pub changelog: String,
}

impl Version {
    /// Shape declared version info into a version record.
    ///
    /// Value and changelog are copied verbatim. An empty `extends`
    /// collection becomes `None`; otherwise input order is kept.
    pub fn resolve(info: &VersionInfo) -> Self {
        let extends = if info.extends.is_empty() {
            None
        } else {
            Some(info.extends.clone())
        };

        Self {
            value: info.value.clone(),
            extends,
            changelog: info.changelog.clone(),
        }
    }

    /// Parse the value as a semantic version (leading 'v' allowed)
    pub fn semver(&self) -> Result<semver::Version> {
        parse_semver(&self.value)
    }

    /// Check that the value and every extended version are semantic versions
    pub fn validate_semver(&self) -> Result<()> {
        self.semver()?;
        for extended in self.extends.iter().flatten() {
            parse_semver(extended)?;
        }
        Ok(())
    }
}

fn parse_semver(value: &str) -> Result<semver::Version> {
    let trimmed = value.strip_prefix('v').unwrap_or(value);
    semver::Version::parse(trimmed)
        .map_err(|e| SchemaError::InvalidVersion(format!("'{}': {}", value, e)))
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
