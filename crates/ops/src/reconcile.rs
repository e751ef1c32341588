//! Bucket reconciliation against the in-use index

use crate::OpsCtx;
use futures::TryStreamExt;
use stackgc_cloud::list_bucket;
use stackgc_errors::Error;
use stackgc_events::{AppEvent, EventEmitter, ReconcileEvent};
use stackgc_types::{AssetKind, AssetPolicy, BucketReport, DeletionRecord, StoredObject};
use std::collections::{BTreeMap, BTreeSet};

/// What happens to one listed object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// A stack references the key
    Referenced,
    /// Not a managed asset type
    Ignored,
    Removable(AssetKind),
}

/// Decide the fate of `key` in a bucket whose referenced keys are `keep`.
///
/// Membership wins over type: a referenced key is never removable.
#[must_use]
pub fn classify(key: &str, keep: &BTreeSet<String>, policy: &AssetPolicy) -> Decision {
    if keep.contains(key) {
        return Decision::Referenced;
    }
    policy
        .classify(key)
        .map_or(Decision::Ignored, Decision::Removable)
}

/// List `bucket`, select unreferenced assets and, in a confirmed run,
/// delete them one at a time.
///
/// # Errors
///
/// Returns an error if the versioning lookup, a listing page or a delete
/// call fails. The run stops at the first failure.
pub async fn reconcile_bucket(
    ctx: &OpsCtx,
    bucket: &str,
    keep: &BTreeSet<String>,
) -> Result<BucketReport, Error> {
    let mode = ctx.config.gc.listing_mode;
    let versioning = if mode.needs_versioning_status() {
        Some(ctx.store.bucket_versioning(bucket).await?)
    } else {
        None
    };
    let listing = mode.resolve(versioning);
    let policy = ctx.asset_policy();
    tracing::debug!(
        bucket,
        mode = %mode,
        versioning = ?versioning,
        listing = %listing,
        keep = keep.len(),
        "reconciling bucket"
    );

    ctx.emit(AppEvent::Reconcile(ReconcileEvent::BucketStarted {
        bucket: bucket.to_string(),
        listing,
    }));

    let mut report = BucketReport::new(bucket, listing);
    let mut objects = list_bucket(ctx.store.as_ref(), bucket, listing);

    while let Some(object) = objects.try_next().await? {
        report.objects_listed += 1;

        let kind = match classify(&object.key, keep, &policy) {
            Decision::Referenced => {
                report.objects_kept += 1;
                ctx.emit_debug_with_context(
                    "kept referenced object",
                    object_context(bucket, &object),
                );
                continue;
            }
            Decision::Ignored => {
                ctx.emit_debug_with_context(
                    "ignored object outside the managed asset types",
                    object_context(bucket, &object),
                );
                continue;
            }
            Decision::Removable(kind) => kind,
        };

        let record = DeletionRecord::new(bucket, object, kind);
        ctx.emit(AppEvent::Reconcile(ReconcileEvent::ObjectRemovable {
            record: record.clone(),
            run_mode: ctx.run_mode,
        }));

        if ctx.run_mode.is_confirmed() {
            ctx.store
                .delete_object(bucket, &record.key, record.version_id.as_deref())
                .await?;
            report.deleted += 1;
            ctx.emit(AppEvent::Reconcile(ReconcileEvent::ObjectDeleted {
                record: record.clone(),
            }));
        }

        report.record_removable(record);
    }

    ctx.emit(AppEvent::Reconcile(ReconcileEvent::BucketCompleted {
        bucket: bucket.to_string(),
        listed: report.objects_listed,
        kept: report.objects_kept,
        removable: report.removable,
        deleted: report.deleted,
    }));

    Ok(report)
}

fn object_context(bucket: &str, object: &StoredObject) -> BTreeMap<String, String> {
    let mut context = BTreeMap::new();
    context.insert("bucket".to_string(), bucket.to_string());
    context.insert("key".to_string(), object.key.clone());
    if let Some(version_id) = &object.version_id {
        context.insert("version_id".to_string(), version_id.clone());
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Deletion set for a batch of listed objects
    fn plan<I>(
        bucket: &str,
        objects: I,
        keep: &BTreeSet<String>,
        policy: &AssetPolicy,
    ) -> Vec<DeletionRecord>
    where
        I: IntoIterator<Item = StoredObject>,
    {
        objects
            .into_iter()
            .filter_map(|object| match classify(&object.key, keep, policy) {
                Decision::Removable(kind) => Some(DeletionRecord::new(bucket, object, kind)),
                Decision::Referenced | Decision::Ignored => None,
            })
            .collect()
    }

    fn keep(keys: &[&str]) -> BTreeSet<String> {
        keys.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn referenced_keys_win_over_type() {
        let policy = AssetPolicy::default().with_templates(true);
        let keep = keep(&["a.zip", "t.json", "notes.txt"]);
        assert_eq!(classify("a.zip", &keep, &policy), Decision::Referenced);
        assert_eq!(classify("t.json", &keep, &policy), Decision::Referenced);
        assert_eq!(classify("notes.txt", &keep, &policy), Decision::Referenced);
        assert_eq!(
            classify("b.zip", &keep, &policy),
            Decision::Removable(AssetKind::Bundle)
        );
        assert_eq!(classify("other.txt", &keep, &policy), Decision::Ignored);
    }

    #[test]
    fn templates_need_the_flag() {
        let keep = BTreeSet::new();
        assert_eq!(
            classify("t.json", &keep, &AssetPolicy::default()),
            Decision::Ignored
        );
        assert_eq!(
            classify("t.json", &keep, &AssetPolicy::default().with_templates(true)),
            Decision::Removable(AssetKind::Template)
        );
    }

    #[test]
    fn plan_keeps_versions_and_markers_apart() {
        let objects = vec![
            StoredObject::version("old.zip", "v2"),
            StoredObject::delete_marker("old.zip", "v3"),
            StoredObject::version("live.zip", "v1"),
        ];
        let records = plan("b", objects, &keep(&["live.zip"]), &AssetPolicy::default());
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.key == "old.zip"));
        assert!(records.iter().any(|r| r.is_delete_marker));
    }

    fn key_strategy() -> impl Strategy<Value = String> {
        ("[a-d]{1,2}", prop::sample::select(vec![".zip", ".json", ".txt"]))
            .prop_map(|(stem, ext)| format!("{stem}{ext}"))
    }

    proptest! {
        #[test]
        fn referenced_keys_never_planned(
            keys in prop::collection::vec(key_strategy(), 0..40),
            kept in prop::collection::btree_set(key_strategy(), 0..10),
            templates in any::<bool>(),
        ) {
            let policy = AssetPolicy::default().with_templates(templates);
            let objects = keys.into_iter().map(StoredObject::current);
            for record in plan("b", objects, &kept, &policy) {
                prop_assert!(!kept.contains(&record.key));
                prop_assert!(templates || !record.key.ends_with(".json"));
                prop_assert!(!record.key.ends_with(".txt"));
            }
        }

        #[test]
        fn plan_is_order_independent(
            keys in prop::collection::vec(key_strategy(), 0..40),
            kept in prop::collection::btree_set(key_strategy(), 0..10),
        ) {
            let policy = AssetPolicy::default().with_templates(true);
            let forward: BTreeSet<_> =
                plan("b", keys.iter().cloned().map(StoredObject::current), &kept, &policy)
                    .into_iter()
                    .collect();
            let reversed: BTreeSet<_> =
                plan("b", keys.iter().rev().cloned().map(StoredObject::current), &kept, &policy)
                    .into_iter()
                    .collect();
            prop_assert_eq!(forward, reversed);
        }
    }
}
