#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Reconciliation engine for stackgc
//!
//! The run is strictly phased. [`scan`] lists settled stacks and folds the
//! references of every bootstrap stack into an in-use index; only then does
//! [`reconcile`] list each referenced bucket and select the unreferenced
//! bundles (and, when asked, templates) for removal. [`gc`] drives both and
//! returns the report.

mod context;
pub mod extract;
mod gc;
pub mod reconcile;
pub mod scan;

pub use context::{OpsContextBuilder, OpsCtx};
pub use extract::{extract_references, resolve_placeholders, Extraction, TRACKED_KINDS};
pub use gc::gc;
pub use reconcile::{classify, reconcile_bucket, Decision};
pub use scan::{collect_references, scan_stacks, ScanOutcome, ScannedStack};

use stackgc_errors::{Error, OpsError};
use stackgc_types::GcReport;

/// Render a report for `--json` output
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn report_to_json(report: &GcReport) -> Result<String, Error> {
    serde_json::to_string_pretty(report).map_err(|e| {
        OpsError::SerializationError {
            message: e.to_string(),
        }
        .into()
    })
}
