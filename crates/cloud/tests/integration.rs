//! Integration tests for the provider seams

use futures::TryStreamExt;
use stackgc_cloud::{list_bucket, list_stacks, MemoryCloud, ObjectStore, StackSource};
use stackgc_types::{ListingKind, StackStatus, VersioningStatus};

#[tokio::test]
async fn stack_listing_filters_by_status_across_pages() {
    let cloud = MemoryCloud::default()
        .with_page_size(2)
        .with_stack("one", "CREATE_COMPLETE", Some("{}"))
        .with_stack("two", "ROLLBACK_COMPLETE", None)
        .with_stack("three", "UPDATE_COMPLETE", None)
        .with_stack("four", "CREATE_COMPLETE", None)
        .with_stack("five", "UPDATE_IN_PROGRESS", None);

    let statuses = StackStatus::settled();
    let source: &dyn StackSource = &cloud;
    let names: Vec<String> = list_stacks(source, &statuses)
        .map_ok(|summary| summary.name)
        .try_collect()
        .await
        .unwrap();

    assert_eq!(names, vec!["one", "three", "four"]);
    assert_eq!(cloud.list_calls(), 2);
}

#[tokio::test]
async fn unknown_stack_template_is_an_error() {
    let cloud = MemoryCloud::default().with_stack("one", "CREATE_COMPLETE", None);
    assert_eq!(cloud.get_template("one").await.unwrap(), None);
    assert!(cloud.get_template("missing").await.is_err());
}

#[tokio::test]
async fn current_listing_hides_deleted_keys() {
    let cloud = MemoryCloud::default()
        .with_page_size(1)
        .with_bucket("assets", VersioningStatus::Enabled)
        .with_object("assets", "a.zip")
        .with_object("assets", "b.zip")
        .with_object("assets", "c.zip");

    cloud.delete_object("assets", "b.zip", None).await.unwrap();

    let keys: Vec<String> = list_bucket(&cloud, "assets", ListingKind::Current)
        .map_ok(|object| object.key)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(keys, vec!["a.zip", "c.zip"]);

    let versions: Vec<_> = list_bucket(&cloud, "assets", ListingKind::AllVersions)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(versions.len(), 4);
    assert_eq!(versions.iter().filter(|v| v.is_delete_marker).count(), 1);
}

#[tokio::test]
async fn missing_bucket_fails_listing() {
    let cloud = MemoryCloud::default();
    let result: Result<Vec<_>, _> = list_bucket(&cloud, "nope", ListingKind::Current)
        .try_collect()
        .await;
    assert!(result.is_err());
    assert!(cloud.bucket_versioning("nope").await.is_err());
}
