//! Asset references and the in-use index

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One artifact a stack depends on
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetReference {
    /// Bucket name with placeholders already resolved
    pub bucket: String,
    /// Object key, taken verbatim from the template
    pub key: String,
}

impl AssetReference {
    #[must_use]
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

/// Accumulates references from every scanned stack.
///
/// The index it produces is read-only; reconciliation only ever sees a
/// finished [`InUseIndex`].
#[derive(Debug, Default)]
pub struct InUseIndexBuilder {
    buckets: BTreeMap<String, BTreeSet<String>>,
}

impl InUseIndexBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one reference
    pub fn insert(&mut self, reference: AssetReference) {
        self.buckets
            .entry(reference.bucket)
            .or_default()
            .insert(reference.key);
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> InUseIndex {
        InUseIndex {
            buckets: self.buckets,
        }
    }
}

impl Extend<AssetReference> for InUseIndexBuilder {
    fn extend<I: IntoIterator<Item = AssetReference>>(&mut self, iter: I) {
        for reference in iter {
            self.insert(reference);
        }
    }
}

/// Bucket name → keys still referenced by at least one stack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InUseIndex {
    buckets: BTreeMap<String, BTreeSet<String>>,
}

impl InUseIndex {
    /// Referenced buckets with their keys to keep
    pub fn buckets(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.buckets
            .iter()
            .map(|(bucket, keys)| (bucket.as_str(), keys))
    }

    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of distinct (bucket, key) pairs
    #[must_use]
    pub fn reference_count(&self) -> usize {
        self.buckets.values().map(BTreeSet::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl FromIterator<AssetReference> for InUseIndex {
    fn from_iter<I: IntoIterator<Item = AssetReference>>(iter: I) -> Self {
        let mut builder = InUseIndexBuilder::new();
        builder.extend(iter);
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_references_by_bucket() {
        let index: InUseIndex = [
            AssetReference::new("b1", "a.zip"),
            AssetReference::new("b1", "b.zip"),
            AssetReference::new("b2", "a.zip"),
            AssetReference::new("b1", "a.zip"),
        ]
        .into_iter()
        .collect();

        assert_eq!(index.bucket_count(), 2);
        assert_eq!(index.reference_count(), 3);
        let grouped: Vec<(&str, Vec<&str>)> = index
            .buckets()
            .map(|(bucket, keys)| (bucket, keys.iter().map(String::as_str).collect()))
            .collect();
        assert_eq!(
            grouped,
            vec![("b1", vec!["a.zip", "b.zip"]), ("b2", vec!["a.zip"])]
        );
    }

    #[test]
    fn empty_index_has_no_buckets() {
        let index = InUseIndexBuilder::new().build();
        assert!(index.is_empty());
        assert_eq!(index.buckets().count(), 0);
    }
}
