//! Garbage collection of unreferenced staging assets

use crate::reconcile::reconcile_bucket;
use crate::scan::collect_references;
use crate::OpsCtx;
use stackgc_errors::Error;
use stackgc_events::{AppEvent, EventEmitter, FailureContext, ReconcileEvent, ScanEvent};
use stackgc_types::{AccountContext, GcReport};
use std::time::Instant;

const OPERATION: &str = "gc";

/// Scan every settled stack, then reconcile each referenced bucket.
///
/// In a dry run the deletion set is computed and reported but no delete
/// call is issued.
///
/// # Errors
///
/// Returns an error if the identity lookup or any provider call fails.
pub async fn gc(ctx: &OpsCtx) -> Result<GcReport, Error> {
    ctx.emit_operation_started(OPERATION);

    match run(ctx).await {
        Ok(report) => {
            ctx.emit_operation_completed(OPERATION, true);
            Ok(report)
        }
        Err(e) => {
            ctx.emit_operation_failed(OPERATION, FailureContext::from_error(&e));
            Err(e)
        }
    }
}

async fn run(ctx: &OpsCtx) -> Result<GcReport, Error> {
    let start = Instant::now();

    let account_id = ctx.identity.account_id().await?;
    let account = AccountContext::new(account_id, ctx.region.as_str());
    ctx.emit(AppEvent::Scan(ScanEvent::IdentityResolved {
        account_id: account.account_id.clone(),
        region: account.region.clone(),
    }));

    // The index must be complete before the first bucket is listed
    let scan = collect_references(ctx, &account).await?;
    if scan.bootstrap_stacks == 0 {
        ctx.emit_warning_with_context(
            "no bootstrap stacks found, nothing to reconcile",
            format!("{} stack(s) scanned in {}", scan.stacks_scanned, account.region),
        );
    }

    ctx.emit(AppEvent::Reconcile(ReconcileEvent::Started {
        buckets: scan.index.bucket_count(),
        run_mode: ctx.run_mode,
    }));

    let mut buckets = Vec::with_capacity(scan.index.bucket_count());
    for (bucket, keep) in scan.index.buckets() {
        buckets.push(reconcile_bucket(ctx, bucket, keep).await?);
    }

    let report = GcReport {
        run_mode: ctx.run_mode,
        region: account.region,
        account_id: account.account_id,
        stacks_scanned: scan.stacks_scanned,
        bootstrap_stacks: scan.bootstrap_stacks,
        referenced_assets: scan.index.reference_count(),
        buckets,
        duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
    };

    ctx.emit(AppEvent::Reconcile(ReconcileEvent::Completed {
        removable: report.removable_count(),
        deleted: report.deleted_count(),
        run_mode: report.run_mode,
        duration_ms: report.duration_ms,
    }));

    Ok(report)
}
