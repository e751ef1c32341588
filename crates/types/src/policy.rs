//! Deletion policy: which unreferenced objects may go, and whether they do

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a removable asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Packaged code bundle
    Bundle,
    /// Declarative template
    Template,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bundle => "bundle",
            Self::Template => "template",
        })
    }
}

/// File-type filter applied to unreferenced objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPolicy {
    pub bundle_extension: String,
    pub template_extension: String,
    /// Also remove unreferenced templates
    pub remove_templates: bool,
}

impl Default for AssetPolicy {
    fn default() -> Self {
        Self {
            bundle_extension: ".zip".to_string(),
            template_extension: ".json".to_string(),
            remove_templates: false,
        }
    }
}

impl AssetPolicy {
    #[must_use]
    pub fn with_templates(mut self, remove_templates: bool) -> Self {
        self.remove_templates = remove_templates;
        self
    }

    /// Kind of asset this key is, if the policy allows removing it.
    ///
    /// Anything that is neither a bundle nor an enabled template is left
    /// alone.
    #[must_use]
    pub fn classify(&self, key: &str) -> Option<AssetKind> {
        if key.ends_with(&self.bundle_extension) {
            Some(AssetKind::Bundle)
        } else if self.remove_templates && key.ends_with(&self.template_extension) {
            Some(AssetKind::Template)
        } else {
            None
        }
    }
}

/// Destructive-action gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Compute and report only
    #[default]
    DryRun,
    /// Issue delete calls
    Confirmed,
}

impl RunMode {
    #[must_use]
    pub fn from_confirmation(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::DryRun
        }
    }

    #[must_use]
    pub fn is_confirmed(self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DryRun => "dry run",
            Self::Confirmed => "confirmed",
        })
    }
}
