//! In-process provider for development and tests

use crate::{IdentityProvider, ObjectStore, Page, StackSource, VersionMarker};
use stackgc_errors::{CloudError, Error};
use stackgc_types::{StackStatus, StackSummary, StoredObject, VersioningStatus};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

const NULL_VERSION: &str = "null";

/// A delete call as the provider received it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteCall {
    pub bucket: String,
    pub key: String,
    pub version_id: Option<String>,
}

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    version_id: String,
    is_delete_marker: bool,
}

#[derive(Debug, Clone)]
struct MemoryBucket {
    versioning: VersioningStatus,
    /// Oldest first
    entries: Vec<Entry>,
    next_version: usize,
}

impl MemoryBucket {
    fn new(versioning: VersioningStatus) -> Self {
        Self {
            versioning,
            entries: Vec::new(),
            next_version: 1,
        }
    }

    fn put(&mut self, key: &str, is_delete_marker: bool) {
        let version_id = if self.versioning == VersioningStatus::Enabled {
            let id = format!("v{}", self.next_version);
            self.next_version += 1;
            id
        } else {
            self.entries
                .retain(|entry| !(entry.key == key && entry.version_id == NULL_VERSION));
            NULL_VERSION.to_string()
        };
        self.entries.push(Entry {
            key: key.to_string(),
            version_id,
            is_delete_marker,
        });
    }

    /// Keys whose newest entry is a real object, in key order
    fn current_keys(&self) -> Vec<String> {
        let mut latest: BTreeMap<&str, &Entry> = BTreeMap::new();
        for entry in &self.entries {
            latest.insert(entry.key.as_str(), entry);
        }
        latest
            .into_iter()
            .filter(|(_, entry)| !entry.is_delete_marker)
            .map(|(key, _)| key.to_string())
            .collect()
    }

    /// Every version and delete marker, ordered by key then newest first
    fn versions(&self) -> Vec<StoredObject> {
        let mut by_key: BTreeMap<&str, Vec<&Entry>> = BTreeMap::new();
        for entry in &self.entries {
            by_key.entry(entry.key.as_str()).or_default().push(entry);
        }
        by_key
            .into_values()
            .flat_map(|entries| entries.into_iter().rev())
            .map(|entry| {
                if entry.is_delete_marker {
                    StoredObject::delete_marker(&entry.key, &entry.version_id)
                } else {
                    StoredObject::version(&entry.key, &entry.version_id)
                }
            })
            .collect()
    }
}

/// Provider state held in memory.
///
/// Listings are served in pages of `page_size` entries; continuation
/// tokens name the last entry served. Every delete call is recorded, and deletes mutate
/// the stored objects the way the real service does: a keyed delete on a
/// versioned bucket adds a delete marker, a versioned delete removes
/// exactly that version.
#[derive(Debug)]
pub struct MemoryCloud {
    account_id: String,
    page_size: usize,
    stacks: Vec<(StackSummary, Option<String>)>,
    buckets: Mutex<BTreeMap<String, MemoryBucket>>,
    deletes: Mutex<Vec<DeleteCall>>,
    failing_keys: BTreeSet<String>,
    list_calls: AtomicUsize,
}

impl Default for MemoryCloud {
    fn default() -> Self {
        Self::new("123456789012")
    }
}

impl MemoryCloud {
    #[must_use]
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            page_size: 1000,
            stacks: Vec::new(),
            buckets: Mutex::new(BTreeMap::new()),
            deletes: Mutex::new(Vec::new()),
            failing_keys: BTreeSet::new(),
            list_calls: AtomicUsize::new(0),
        }
    }

    /// Serve every listing in pages of at most `page_size` entries
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Add a stack with an optional template body
    #[must_use]
    pub fn with_stack(
        mut self,
        name: impl Into<String>,
        status: impl Into<StackStatus>,
        template: Option<&str>,
    ) -> Self {
        self.stacks.push((
            StackSummary::new(name, status),
            template.map(str::to_string),
        ));
        self
    }

    /// Create a bucket with the given versioning state
    #[must_use]
    pub fn with_bucket(self, bucket: impl Into<String>, versioning: VersioningStatus) -> Self {
        self.lock_buckets()
            .entry(bucket.into())
            .or_insert_with(|| MemoryBucket::new(versioning));
        self
    }

    /// Upload `key`, creating an unversioned bucket if needed
    #[must_use]
    pub fn with_object(self, bucket: &str, key: &str) -> Self {
        self.put_object(bucket, key);
        self
    }

    /// Make every delete of `key` fail
    #[must_use]
    pub fn with_failing_delete(mut self, key: impl Into<String>) -> Self {
        self.failing_keys.insert(key.into());
        self
    }

    pub fn put_object(&self, bucket: &str, key: &str) {
        self.lock_buckets()
            .entry(bucket.to_string())
            .or_insert_with(|| MemoryBucket::new(VersioningStatus::Unversioned))
            .put(key, false);
    }

    /// Delete calls received so far, in order
    #[must_use]
    pub fn deletes(&self) -> Vec<DeleteCall> {
        self.deletes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of listing calls (stacks and objects) served
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::Relaxed)
    }

    /// Keys currently visible in `bucket`
    #[must_use]
    pub fn current_keys(&self, bucket: &str) -> Vec<String> {
        self.lock_buckets()
            .get(bucket)
            .map(MemoryBucket::current_keys)
            .unwrap_or_default()
    }

    /// Every version and delete marker in `bucket`
    #[must_use]
    pub fn versions(&self, bucket: &str) -> Vec<StoredObject> {
        self.lock_buckets()
            .get(bucket)
            .map(MemoryBucket::versions)
            .unwrap_or_default()
    }

    fn lock_buckets(&self) -> MutexGuard<'_, BTreeMap<String, MemoryBucket>> {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cut one page from `remaining` and count the call
    fn page<T: Clone>(&self, remaining: &[T]) -> (Vec<T>, bool) {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        let end = self.page_size.min(remaining.len());
        (remaining[..end].to_vec(), end < remaining.len())
    }

    fn with_bucket_state<T>(
        &self,
        bucket: &str,
        f: impl FnOnce(&mut MemoryBucket) -> T,
    ) -> Result<T, Error> {
        let mut buckets = self.lock_buckets();
        let state = buckets
            .get_mut(bucket)
            .ok_or_else(|| CloudError::ListObjectsFailed {
                bucket: bucket.to_string(),
                message: "NoSuchBucket".to_string(),
            })?;
        Ok(f(state))
    }
}

/// Order of versions within one key, newest first
fn version_rank(version_id: Option<&str>) -> u64 {
    version_id
        .and_then(|id| id.strip_prefix('v'))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

#[async_trait::async_trait]
impl StackSource for MemoryCloud {
    async fn list_stacks(
        &self,
        statuses: &[StackStatus],
        token: Option<String>,
    ) -> Result<Page<StackSummary, String>, Error> {
        let matching: Vec<StackSummary> = self
            .stacks
            .iter()
            .filter(|(summary, _)| statuses.contains(&summary.status))
            .map(|(summary, _)| summary.clone())
            .collect();

        // Tokens name the last stack served
        let start = token.map_or(0, |last| {
            matching
                .iter()
                .position(|summary| summary.name == last)
                .map_or(matching.len(), |index| index + 1)
        });
        let (items, more) = self.page(&matching[start..]);
        let next = more
            .then(|| items.last().map(|summary| summary.name.clone()))
            .flatten();
        Ok(Page::new(items, next))
    }

    async fn get_template(&self, stack: &str) -> Result<Option<String>, Error> {
        self.stacks
            .iter()
            .find(|(summary, _)| summary.name == stack)
            .map(|(_, template)| template.clone())
            .ok_or_else(|| {
                CloudError::GetTemplateFailed {
                    stack: stack.to_string(),
                    message: "stack does not exist".to_string(),
                }
                .into()
            })
    }
}

#[async_trait::async_trait]
impl IdentityProvider for MemoryCloud {
    async fn account_id(&self) -> Result<String, Error> {
        Ok(self.account_id.clone())
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryCloud {
    async fn list_objects(
        &self,
        bucket: &str,
        token: Option<String>,
    ) -> Result<Page<StoredObject, String>, Error> {
        let keys = self.with_bucket_state(bucket, |state| state.current_keys())?;
        // Tokens name the last key served, so deletes between pages
        // never shift the listing
        let remaining: Vec<String> = keys
            .into_iter()
            .filter(|key| token.as_deref().is_none_or(|last| key.as_str() > last))
            .collect();
        let (page, more) = self.page(&remaining);
        let next = more.then(|| page.last().cloned()).flatten();
        Ok(Page::new(
            page.into_iter().map(StoredObject::current).collect(),
            next,
        ))
    }

    async fn list_object_versions(
        &self,
        bucket: &str,
        marker: Option<VersionMarker>,
    ) -> Result<Page<StoredObject, VersionMarker>, Error> {
        let versions = self.with_bucket_state(bucket, |state| state.versions())?;
        // Resume strictly after the (key, version) pair the marker names,
        // whether or not that version still exists
        let remaining: Vec<StoredObject> = match &marker {
            None => versions,
            Some(marker) => {
                let marker_rank = version_rank(marker.version_id_marker.as_deref());
                versions
                    .into_iter()
                    .filter(|object| {
                        object.key.as_str() > marker.key_marker.as_str()
                            || (object.key == marker.key_marker
                                && version_rank(object.version_id.as_deref()) < marker_rank)
                    })
                    .collect()
            }
        };
        let (page, more) = self.page(&remaining);
        let next = more
            .then(|| page.last())
            .flatten()
            .map(|last| VersionMarker {
                key_marker: last.key.clone(),
                version_id_marker: last.version_id.clone(),
            });
        Ok(Page::new(page, next))
    }

    async fn bucket_versioning(&self, bucket: &str) -> Result<VersioningStatus, Error> {
        self.lock_buckets()
            .get(bucket)
            .map(|state| state.versioning)
            .ok_or_else(|| {
                CloudError::BucketVersioningFailed {
                    bucket: bucket.to_string(),
                    message: "NoSuchBucket".to_string(),
                }
                .into()
            })
    }

    async fn delete_object(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> Result<(), Error> {
        self.deletes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(DeleteCall {
                bucket: bucket.to_string(),
                key: key.to_string(),
                version_id: version_id.map(str::to_string),
            });

        let failure = |message: &str| -> Error {
            CloudError::DeleteObjectFailed {
                bucket: bucket.to_string(),
                key: key.to_string(),
                version_id: version_id.map(str::to_string),
                message: message.to_string(),
            }
            .into()
        };

        if self.failing_keys.contains(key) {
            return Err(failure("AccessDenied"));
        }

        let mut buckets = self.lock_buckets();
        let state = buckets
            .get_mut(bucket)
            .ok_or_else(|| failure("NoSuchBucket"))?;

        match version_id {
            Some(version_id) => state
                .entries
                .retain(|entry| !(entry.key == key && entry.version_id == version_id)),
            None if state.versioning != VersioningStatus::Unversioned => state.put(key, true),
            None => state.entries.retain(|entry| entry.key != key),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list_bucket;
    use futures::TryStreamExt;
    use stackgc_types::ListingKind;

    #[tokio::test]
    async fn versioned_listing_pages_by_marker() {
        let cloud = MemoryCloud::default()
            .with_page_size(2)
            .with_bucket("assets", VersioningStatus::Enabled);
        for key in ["a.zip", "b.zip", "a.zip", "c.zip"] {
            cloud.put_object("assets", key);
        }

        let listed: Vec<StoredObject> = list_bucket(&cloud, "assets", ListingKind::AllVersions)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(listed, cloud.versions("assets"));
        assert_eq!(listed.len(), 4);
        assert_eq!(cloud.list_calls(), 2);
    }

    #[tokio::test]
    async fn keyed_delete_on_versioned_bucket_adds_marker() {
        let cloud = MemoryCloud::default()
            .with_bucket("assets", VersioningStatus::Enabled)
            .with_object("assets", "a.zip");

        cloud.delete_object("assets", "a.zip", None).await.unwrap();

        assert!(cloud.current_keys("assets").is_empty());
        let versions = cloud.versions("assets");
        assert_eq!(versions.len(), 2);
        assert!(versions[0].is_delete_marker);
    }

    #[tokio::test]
    async fn failing_delete_is_recorded_and_attributed() {
        let cloud = MemoryCloud::default()
            .with_object("assets", "a.zip")
            .with_failing_delete("a.zip");

        let err = cloud
            .delete_object("assets", "a.zip", Some("null"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("s3://assets/a.zip"));
        assert_eq!(cloud.deletes().len(), 1);
        assert_eq!(cloud.current_keys("assets"), vec!["a.zip".to_string()]);
    }
}
