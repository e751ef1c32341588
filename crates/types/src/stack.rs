//! Deployment (stack) type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider-side lifecycle status of a stack.
///
/// Kept as an open string so that statuses added by the provider later can
/// still be named in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackStatus(String);

impl StackStatus {
    pub const CREATE_COMPLETE: &'static str = "CREATE_COMPLETE";
    pub const UPDATE_COMPLETE: &'static str = "UPDATE_COMPLETE";

    #[must_use]
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Statuses of stacks that were created or updated successfully.
    #[must_use]
    pub fn settled() -> Vec<Self> {
        vec![
            Self::new(Self::CREATE_COMPLETE),
            Self::new(Self::UPDATE_COMPLETE),
        ]
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StackStatus {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One entry of the stack listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSummary {
    /// Stack name, used to fetch the template
    pub name: String,
    /// Status reported by the listing
    pub status: StackStatus,
}

impl StackSummary {
    #[must_use]
    pub fn new(name: impl Into<String>, status: impl Into<StackStatus>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
        }
    }
}

/// Run-scoped values the extractor resolves placeholders against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountContext {
    /// Caller account identifier (from the one-time identity lookup)
    pub account_id: String,
    /// Target region
    pub region: String,
}

impl AccountContext {
    #[must_use]
    pub fn new(account_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            region: region.into(),
        }
    }
}
