use serde::{Deserialize, Serialize};
use stackgc_types::{DeletionRecord, ListingKind, RunMode};

/// Bucket listing and deletion events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReconcileEvent {
    /// Reconciliation starting
    Started { buckets: usize, run_mode: RunMode },

    /// Listing one bucket
    BucketStarted { bucket: String, listing: ListingKind },

    /// Object selected for removal
    ObjectRemovable {
        record: DeletionRecord,
        run_mode: RunMode,
    },

    /// Delete call succeeded
    ObjectDeleted { record: DeletionRecord },

    /// Bucket finished
    BucketCompleted {
        bucket: String,
        listed: usize,
        kept: usize,
        removable: usize,
        deleted: usize,
    },

    /// All buckets finished
    Completed {
        removable: usize,
        deleted: usize,
        run_mode: RunMode,
        duration_ms: u64,
    },
}
