//! Cloud provider error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum CloudError {
    #[error("failed to list stacks: {message}")]
    ListStacksFailed { message: String },

    #[error("failed to fetch template for stack {stack}: {message}")]
    GetTemplateFailed { stack: String, message: String },

    #[error("caller identity lookup failed: {message}")]
    IdentityLookupFailed { message: String },

    #[error("failed to list objects in bucket {bucket}: {message}")]
    ListObjectsFailed { bucket: String, message: String },

    #[error("failed to read versioning status of bucket {bucket}: {message}")]
    BucketVersioningFailed { bucket: String, message: String },

    #[error("failed to delete s3://{bucket}/{key}{}: {message}", version_suffix(.version_id.as_deref()))]
    DeleteObjectFailed {
        bucket: String,
        key: String,
        version_id: Option<String>,
        message: String,
    },

    #[error("credentials unavailable from {source_name}: {message}")]
    CredentialsUnavailable {
        source_name: String,
        message: String,
    },
}

fn version_suffix(version_id: Option<&str>) -> String {
    version_id.map_or_else(String::new, |v| format!(" (version {v})"))
}

impl UserFacingError for CloudError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::IdentityLookupFailed { .. } | Self::CredentialsUnavailable { .. } => Some(
                "Check the selected profile or the AWS_* environment variables and retry.",
            ),
            Self::DeleteObjectFailed { .. } => {
                Some("Ensure the credentials allow s3:DeleteObject and s3:DeleteObjectVersion.")
            }
            Self::ListObjectsFailed { .. } | Self::BucketVersioningFailed { .. } => {
                Some("Ensure the credentials allow s3:ListBucket and s3:ListBucketVersions.")
            }
            Self::ListStacksFailed { .. } | Self::GetTemplateFailed { .. } => Some(
                "Ensure the credentials allow cloudformation:ListStacks and cloudformation:GetTemplate.",
            ),
        }
    }

    fn is_retryable(&self) -> bool {
        !matches!(self, Self::CredentialsUnavailable { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ListStacksFailed { .. } => "cloud.list_stacks_failed",
            Self::GetTemplateFailed { .. } => "cloud.get_template_failed",
            Self::IdentityLookupFailed { .. } => "cloud.identity_lookup_failed",
            Self::ListObjectsFailed { .. } => "cloud.list_objects_failed",
            Self::BucketVersioningFailed { .. } => "cloud.bucket_versioning_failed",
            Self::DeleteObjectFailed { .. } => "cloud.delete_object_failed",
            Self::CredentialsUnavailable { .. } => "cloud.credentials_unavailable",
        };
        Some(code)
    }
}
