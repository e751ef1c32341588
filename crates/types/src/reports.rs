//! Report type definitions for the gc operation

use crate::{DeletionRecord, ListingKind, RunMode};
use serde::{Deserialize, Serialize};

/// Removable records kept on a bucket report; the rest are only streamed
/// as events.
pub const REMOVABLE_SAMPLE_LIMIT: usize = 100;

/// Outcome of reconciling one bucket
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BucketReport {
    pub bucket: String,
    /// Listing used for this bucket
    pub listing: ListingKind,
    /// Entries returned by the listing
    pub objects_listed: usize,
    /// Entries skipped because a stack references their key
    pub objects_kept: usize,
    /// Entries selected for removal
    pub removable: usize,
    /// The first removable entries, at most [`REMOVABLE_SAMPLE_LIMIT`]
    pub sample: Vec<DeletionRecord>,
    /// Delete calls that succeeded (zero on a dry run)
    pub deleted: usize,
}

impl BucketReport {
    #[must_use]
    pub fn new(bucket: impl Into<String>, listing: ListingKind) -> Self {
        Self {
            bucket: bucket.into(),
            listing,
            objects_listed: 0,
            objects_kept: 0,
            removable: 0,
            sample: Vec::new(),
            deleted: 0,
        }
    }

    /// Count a removable entry, keeping it only while the sample has room
    pub fn record_removable(&mut self, record: DeletionRecord) {
        self.removable += 1;
        if self.sample.len() < REMOVABLE_SAMPLE_LIMIT {
            self.sample.push(record);
        }
    }

    /// Whether some removable entries were counted but not sampled
    #[must_use]
    pub fn is_sample_truncated(&self) -> bool {
        self.removable > self.sample.len()
    }
}

/// Garbage collection report
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GcReport {
    pub run_mode: RunMode,
    pub region: String,
    pub account_id: String,
    /// Settled stacks returned by the listing
    pub stacks_scanned: usize,
    /// Stacks that carry the bootstrap marker
    pub bootstrap_stacks: usize,
    /// Distinct (bucket, key) pairs still in use
    pub referenced_assets: usize,
    pub buckets: Vec<BucketReport>,
    /// Total execution time
    pub duration_ms: u64,
}

impl GcReport {
    /// Total assets identified as removable, whatever the run mode
    #[must_use]
    pub fn removable_count(&self) -> usize {
        self.buckets.iter().map(|b| b.removable).sum()
    }

    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.buckets.iter().map(|b| b.deleted).sum()
    }

    /// Sampled removable records across buckets
    pub fn sample(&self) -> impl Iterator<Item = &DeletionRecord> {
        self.buckets.iter().flat_map(|b| b.sample.iter())
    }

    /// Removable records counted beyond the per-bucket samples
    #[must_use]
    pub fn unsampled_count(&self) -> usize {
        self.removable_count() - self.sample().count()
    }
}
