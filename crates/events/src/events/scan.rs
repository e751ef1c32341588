use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a listed stack contributed no references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackSkipReason {
    /// Template body was empty or could not be parsed
    UnreadableTemplate,
    /// Template does not declare the bootstrap marker parameter
    NoBootstrapMarker,
}

impl fmt::Display for StackSkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UnreadableTemplate => "template missing or unreadable",
            Self::NoBootstrapMarker => "no bootstrap marker parameter",
        })
    }
}

/// Stack scanning and reference extraction events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScanEvent {
    /// Caller identity resolved
    IdentityResolved { account_id: String, region: String },

    /// Stack listing starting
    Started {
        region: String,
        statuses: Vec<String>,
    },

    /// Stack passed over
    StackSkipped {
        stack: String,
        reason: StackSkipReason,
    },

    /// A tracked resource had no usable code location
    ResourceSkipped {
        stack: String,
        logical_id: String,
        resource_type: String,
    },

    /// Bootstrap stack scanned
    StackScanned { stack: String, assets: usize },

    /// All stacks scanned; the in-use index is complete
    Completed {
        stacks_scanned: usize,
        bootstrap_stacks: usize,
        buckets: usize,
        references: usize,
    },
}
