//! Structured logging integration for events
//!
//! Every event received by the CLI is also written through `tracing` with
//! the metadata envelope as structured fields, so a `--debug` log file
//! carries the full run history keyed by the run id.

use stackgc_events::{
    AppEvent, EventMessage, GeneralEvent, ReconcileEvent, ScanEvent, StackSkipReason,
};
use tracing::{debug, error, info, warn};

/// Log an event with structured fields at the level its domain assigns
#[allow(clippy::too_many_lines)]
pub fn log_event_with_tracing(message: &EventMessage) {
    let event = &message.event;
    let meta = &message.meta;

    match event {
        AppEvent::Scan(scan_event) => match scan_event {
            ScanEvent::IdentityResolved { account_id, region } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    account_id = %account_id,
                    region = %region,
                    "Caller identity resolved"
                );
            }
            ScanEvent::Started { region, statuses } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    region = %region,
                    statuses = ?statuses,
                    "Stack scan started"
                );
            }
            ScanEvent::StackSkipped {
                stack,
                reason: reason @ StackSkipReason::UnreadableTemplate,
            } => {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    stack = %stack,
                    reason = %reason,
                    "Stack skipped"
                );
            }
            ScanEvent::StackSkipped { stack, reason } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    stack = %stack,
                    reason = %reason,
                    "Stack skipped"
                );
            }
            ScanEvent::ResourceSkipped {
                stack,
                logical_id,
                resource_type,
            } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    stack = %stack,
                    logical_id = %logical_id,
                    resource_type = %resource_type,
                    "Resource without a usable code location"
                );
            }
            ScanEvent::StackScanned { stack, assets } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    stack = %stack,
                    assets = assets,
                    "Stack scanned"
                );
            }
            ScanEvent::Completed {
                stacks_scanned,
                bootstrap_stacks,
                buckets,
                references,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    stacks_scanned = stacks_scanned,
                    bootstrap_stacks = bootstrap_stacks,
                    buckets = buckets,
                    references = references,
                    "Stack scan completed"
                );
            }
        },

        AppEvent::Reconcile(reconcile_event) => match reconcile_event {
            ReconcileEvent::Started { buckets, run_mode } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    buckets = buckets,
                    run_mode = %run_mode,
                    "Reconciliation started"
                );
            }
            ReconcileEvent::BucketStarted { bucket, listing } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    bucket = %bucket,
                    listing = %listing,
                    "Bucket listing started"
                );
            }
            ReconcileEvent::ObjectRemovable { record, run_mode } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    bucket = %record.bucket,
                    key = %record.key,
                    version_id = ?record.version_id,
                    kind = %record.kind,
                    delete_marker = record.is_delete_marker,
                    run_mode = %run_mode,
                    "Object removable"
                );
            }
            ReconcileEvent::ObjectDeleted { record } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    bucket = %record.bucket,
                    key = %record.key,
                    version_id = ?record.version_id,
                    "Object deleted"
                );
            }
            ReconcileEvent::BucketCompleted {
                bucket,
                listed,
                kept,
                removable,
                deleted,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    bucket = %bucket,
                    listed = listed,
                    kept = kept,
                    removable = removable,
                    deleted = deleted,
                    "Bucket completed"
                );
            }
            ReconcileEvent::Completed {
                removable,
                deleted,
                run_mode,
                duration_ms,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    removable = removable,
                    deleted = deleted,
                    run_mode = %run_mode,
                    duration_ms = duration_ms,
                    "Reconciliation completed"
                );
            }
        },

        AppEvent::General(general_event) => match general_event {
            GeneralEvent::OperationStarted { operation } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    operation = %operation,
                    "Operation started"
                );
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    operation = %operation,
                    success = success,
                    "Operation completed"
                );
            }
            GeneralEvent::OperationFailed { operation, failure } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    operation = %operation,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Operation failed"
                );
            }
            GeneralEvent::Warning { message, context } => {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    message = %message,
                    context = ?context,
                    "Warning"
                );
            }
            GeneralEvent::DebugLog { message, context } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    message = %message,
                    context = ?context,
                    "Debug log"
                );
            }
        },
    }
}
