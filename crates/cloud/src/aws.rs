//! AWS SDK backed provider

use crate::{IdentityProvider, ObjectStore, Page, StackSource, VersionMarker};
use aws_config::environment::credentials::EnvironmentVariableCredentialsProvider;
use aws_config::BehaviorVersion;
use aws_sdk_cloudformation::types::{StackStatus as CfnStackStatus, TemplateStage};
use aws_sdk_s3::config::Region;
use aws_sdk_s3::types::BucketVersioningStatus;
use stackgc_errors::{CloudError, Error};
use stackgc_types::{StackStatus, StackSummary, StoredObject, VersioningStatus};
use std::fmt;

/// Where credentials come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// A named profile from the shared config/credentials files
    Profile(String),
    /// `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` / `AWS_SESSION_TOKEN`
    Environment,
}

impl CredentialSource {
    #[must_use]
    pub fn from_profile(profile: Option<&str>) -> Self {
        profile.map_or(Self::Environment, |name| Self::Profile(name.to_string()))
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile(name) => write!(f, "profile '{name}'"),
            Self::Environment => f.write_str("environment"),
        }
    }
}

/// Control plane, storage and identity clients for one region
#[derive(Debug, Clone)]
pub struct AwsCloud {
    cloudformation: aws_sdk_cloudformation::Client,
    s3: aws_sdk_s3::Client,
    sts: aws_sdk_sts::Client,
}

impl AwsCloud {
    /// Build clients for `region` using the given credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if environment credentials were requested but the
    /// access key variables are not set.
    pub async fn connect(region: &str, credentials: &CredentialSource) -> Result<Self, Error> {
        let loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()));

        let loader = match credentials {
            CredentialSource::Profile(name) => loader.profile_name(name),
            CredentialSource::Environment => {
                for var in ["AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY"] {
                    if std::env::var_os(var).is_none() {
                        return Err(CloudError::CredentialsUnavailable {
                            source_name: credentials.to_string(),
                            message: format!("{var} is not set"),
                        }
                        .into());
                    }
                }
                loader.credentials_provider(EnvironmentVariableCredentialsProvider::new())
            }
        };

        let sdk_config = loader.load().await;
        tracing::debug!(region, credentials = %credentials, "aws clients configured");

        Ok(Self {
            cloudformation: aws_sdk_cloudformation::Client::new(&sdk_config),
            s3: aws_sdk_s3::Client::new(&sdk_config),
            sts: aws_sdk_sts::Client::new(&sdk_config),
        })
    }
}

#[async_trait::async_trait]
impl StackSource for AwsCloud {
    async fn list_stacks(
        &self,
        statuses: &[StackStatus],
        token: Option<String>,
    ) -> Result<Page<StackSummary, String>, Error> {
        let filter = statuses
            .iter()
            .map(|status| CfnStackStatus::from(status.as_str()))
            .collect();

        let output = self
            .cloudformation
            .list_stacks()
            .set_stack_status_filter(Some(filter))
            .set_next_token(token)
            .send()
            .await
            .map_err(|e| CloudError::ListStacksFailed {
                message: aws_sdk_cloudformation::error::DisplayErrorContext(&e).to_string(),
            })?;

        let stacks = output
            .stack_summaries()
            .iter()
            .filter_map(|summary| {
                let name = summary.stack_name()?;
                let status = summary.stack_status().map_or("", CfnStackStatus::as_str);
                Some(StackSummary::new(name, status))
            })
            .collect();

        Ok(Page::new(stacks, output.next_token().map(str::to_string)))
    }

    async fn get_template(&self, stack: &str) -> Result<Option<String>, Error> {
        let output = self
            .cloudformation
            .get_template()
            .stack_name(stack)
            .template_stage(TemplateStage::Processed)
            .send()
            .await
            .map_err(|e| CloudError::GetTemplateFailed {
                stack: stack.to_string(),
                message: aws_sdk_cloudformation::error::DisplayErrorContext(&e).to_string(),
            })?;

        Ok(output.template_body().map(str::to_string))
    }
}

#[async_trait::async_trait]
impl IdentityProvider for AwsCloud {
    async fn account_id(&self) -> Result<String, Error> {
        let output = self.sts.get_caller_identity().send().await.map_err(|e| {
            CloudError::IdentityLookupFailed {
                message: aws_sdk_sts::error::DisplayErrorContext(&e).to_string(),
            }
        })?;

        output.account().map(str::to_string).ok_or_else(|| {
            CloudError::IdentityLookupFailed {
                message: "response carried no account id".to_string(),
            }
            .into()
        })
    }
}

#[async_trait::async_trait]
impl ObjectStore for AwsCloud {
    async fn list_objects(
        &self,
        bucket: &str,
        token: Option<String>,
    ) -> Result<Page<StoredObject, String>, Error> {
        let output = self
            .s3
            .list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(token)
            .send()
            .await
            .map_err(|e| list_failed(bucket, &e))?;

        let objects = output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(StoredObject::current))
            .collect();

        Ok(Page::new(
            objects,
            output.next_continuation_token().map(str::to_string),
        ))
    }

    async fn list_object_versions(
        &self,
        bucket: &str,
        marker: Option<VersionMarker>,
    ) -> Result<Page<StoredObject, VersionMarker>, Error> {
        let (key_marker, version_id_marker) =
            marker.map_or((None, None), |m| (Some(m.key_marker), m.version_id_marker));

        let output = self
            .s3
            .list_object_versions()
            .bucket(bucket)
            .set_key_marker(key_marker)
            .set_version_id_marker(version_id_marker)
            .send()
            .await
            .map_err(|e| list_failed(bucket, &e))?;

        let versions = output.versions().iter().filter_map(|version| {
            Some(StoredObject::version(version.key()?, version.version_id()?))
        });
        let markers = output.delete_markers().iter().filter_map(|marker| {
            Some(StoredObject::delete_marker(
                marker.key()?,
                marker.version_id()?,
            ))
        });
        let objects = versions.chain(markers).collect();

        let next = if output.is_truncated().unwrap_or(false) {
            output.next_key_marker().map(|key| VersionMarker {
                key_marker: key.to_string(),
                version_id_marker: output.next_version_id_marker().map(str::to_string),
            })
        } else {
            None
        };

        Ok(Page::new(objects, next))
    }

    async fn bucket_versioning(&self, bucket: &str) -> Result<VersioningStatus, Error> {
        let output = self
            .s3
            .get_bucket_versioning()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| CloudError::BucketVersioningFailed {
                bucket: bucket.to_string(),
                message: aws_sdk_s3::error::DisplayErrorContext(&e).to_string(),
            })?;

        Ok(match output.status() {
            Some(BucketVersioningStatus::Enabled) => VersioningStatus::Enabled,
            Some(BucketVersioningStatus::Suspended) => VersioningStatus::Suspended,
            _ => VersioningStatus::Unversioned,
        })
    }

    async fn delete_object(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> Result<(), Error> {
        self.s3
            .delete_object()
            .bucket(bucket)
            .key(key)
            .set_version_id(version_id.map(str::to_string))
            .send()
            .await
            .map_err(|e| CloudError::DeleteObjectFailed {
                bucket: bucket.to_string(),
                key: key.to_string(),
                version_id: version_id.map(str::to_string),
                message: aws_sdk_s3::error::DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }
}

fn list_failed<E: std::error::Error>(bucket: &str, err: &E) -> CloudError {
    CloudError::ListObjectsFailed {
        bucket: bucket.to_string(),
        message: aws_sdk_s3::error::DisplayErrorContext(err).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_selects_credential_source() {
        assert_eq!(
            CredentialSource::from_profile(Some("ci")),
            CredentialSource::Profile("ci".to_string())
        );
        assert_eq!(
            CredentialSource::from_profile(None),
            CredentialSource::Environment
        );
        assert_eq!(CredentialSource::Environment.to_string(), "environment");
    }
}
