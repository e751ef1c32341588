#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Provider seams for stackgc
//!
//! The engine talks to the control plane and to object storage only through
//! the traits in this crate. [`aws::AwsCloud`] backs them with the AWS SDK;
//! [`memory::MemoryCloud`] keeps everything in process for development and
//! tests.

pub mod aws;
pub mod memory;
mod paginate;

pub use aws::{AwsCloud, CredentialSource};
pub use memory::MemoryCloud;
pub use paginate::{list_bucket, list_stacks, paginate, Page};

use stackgc_errors::Error;
use stackgc_types::{StackStatus, StackSummary, StoredObject, VersioningStatus};

/// Continuation state of an all-versions listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMarker {
    pub key_marker: String,
    pub version_id_marker: Option<String>,
}

/// Deployment control plane
#[async_trait::async_trait]
pub trait StackSource: Send + Sync {
    /// One page of stacks whose status is in `statuses`.
    async fn list_stacks(
        &self,
        statuses: &[StackStatus],
        token: Option<String>,
    ) -> Result<Page<StackSummary, String>, Error>;

    /// Materialized template body of a stack, `None` when it has none.
    async fn get_template(&self, stack: &str) -> Result<Option<String>, Error>;
}

/// Caller identity
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn account_id(&self) -> Result<String, Error>;
}

/// Object storage
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// One page of current objects.
    async fn list_objects(
        &self,
        bucket: &str,
        token: Option<String>,
    ) -> Result<Page<StoredObject, String>, Error>;

    /// One page of object versions and delete markers.
    async fn list_object_versions(
        &self,
        bucket: &str,
        marker: Option<VersionMarker>,
    ) -> Result<Page<StoredObject, VersionMarker>, Error>;

    async fn bucket_versioning(&self, bucket: &str) -> Result<VersioningStatus, Error>;

    /// Delete one object, or one version of it when `version_id` is set.
    async fn delete_object(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> Result<(), Error>;
}
