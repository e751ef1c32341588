//! Stored objects, listing modes and deletion records

use crate::AssetKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One entry of a bucket listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub key: String,
    /// Present in all-versions listings only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    /// Delete markers appear in all-versions listings next to real versions
    #[serde(default)]
    pub is_delete_marker: bool,
}

impl StoredObject {
    /// An entry from a current-objects listing
    #[must_use]
    pub fn current(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: None,
            is_delete_marker: false,
        }
    }

    /// An object version from an all-versions listing
    #[must_use]
    pub fn version(key: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: Some(version_id.into()),
            is_delete_marker: false,
        }
    }

    /// A delete marker from an all-versions listing
    #[must_use]
    pub fn delete_marker(key: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: Some(version_id.into()),
            is_delete_marker: true,
        }
    }
}

/// A stored object selected for removal
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeletionRecord {
    pub bucket: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    pub kind: AssetKind,
    #[serde(default)]
    pub is_delete_marker: bool,
}

impl DeletionRecord {
    #[must_use]
    pub fn new(bucket: impl Into<String>, object: StoredObject, kind: AssetKind) -> Self {
        Self {
            bucket: bucket.into(),
            key: object.key,
            version_id: object.version_id,
            kind,
            is_delete_marker: object.is_delete_marker,
        }
    }
}

impl fmt::Display for DeletionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)?;
        if let Some(version_id) = &self.version_id {
            write!(f, " ({version_id})")?;
        }
        Ok(())
    }
}

/// Configured listing policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingMode {
    /// Current objects only; deletes by key
    Current,
    /// Every version and delete marker; deletes by version id
    #[default]
    Versions,
    /// Decide per bucket from its versioning status
    Auto,
}

impl ListingMode {
    /// Pick the listing for a bucket.
    ///
    /// `versioning` is only consulted in [`ListingMode::Auto`]; callers may
    /// pass `None` for the forced modes.
    #[must_use]
    pub fn resolve(self, versioning: Option<VersioningStatus>) -> ListingKind {
        match self {
            Self::Current => ListingKind::Current,
            Self::Versions => ListingKind::AllVersions,
            Self::Auto => match versioning {
                Some(VersioningStatus::Enabled | VersioningStatus::Suspended) => {
                    ListingKind::AllVersions
                }
                Some(VersioningStatus::Unversioned) | None => ListingKind::Current,
            },
        }
    }

    #[must_use]
    pub fn needs_versioning_status(self) -> bool {
        matches!(self, Self::Auto)
    }
}

impl fmt::Display for ListingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Current => "current",
            Self::Versions => "versions",
            Self::Auto => "auto",
        })
    }
}

impl FromStr for ListingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current" => Ok(Self::Current),
            "versions" => Ok(Self::Versions),
            "auto" => Ok(Self::Auto),
            other => Err(format!(
                "unknown listing mode '{other}' (expected current, versions or auto)"
            )),
        }
    }
}

impl clap::ValueEnum for ListingMode {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Current, Self::Versions, Self::Auto]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Current => clap::builder::PossibleValue::new("current"),
            Self::Versions => clap::builder::PossibleValue::new("versions"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
        })
    }
}

/// Listing actually used for one bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    Current,
    AllVersions,
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Current => "current objects",
            Self::AllVersions => "all versions",
        })
    }
}

/// Bucket versioning configuration as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersioningStatus {
    Enabled,
    Suspended,
    /// Versioning was never turned on
    Unversioned,
}
