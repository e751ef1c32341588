//! Integration tests for error types

#[cfg(test)]
mod tests {
    use stackgc_errors::*;

    #[test]
    fn test_error_conversion() {
        let cloud_err = CloudError::ListStacksFailed {
            message: "throttled".into(),
        };
        let err: Error = cloud_err.into();
        assert!(matches!(err, Error::Cloud(_)));

        let err: Error = OpsError::MissingComponent {
            component: "object_store".into(),
        }
        .into();
        assert!(matches!(err, Error::Ops(_)));
    }

    #[test]
    fn test_error_display() {
        let err = CloudError::DeleteObjectFailed {
            bucket: "assets".into(),
            key: "a.zip".into(),
            version_id: None,
            message: "AccessDenied".into(),
        };
        assert_eq!(err.to_string(), "failed to delete s3://assets/a.zip: AccessDenied");

        let err = ConfigError::InvalidValue {
            field: "STACKGC_LISTING_MODE".into(),
            value: "everything".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for STACKGC_LISTING_MODE: everything"
        );
    }

    #[test]
    fn test_error_clone() {
        let err = CloudError::GetTemplateFailed {
            stack: "app".into(),
            message: "ValidationError".into(),
        };
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }

    #[test]
    fn test_credentials_failure_is_not_retryable() {
        let err: Error = CloudError::CredentialsUnavailable {
            source_name: "environment".into(),
            message: "AWS_ACCESS_KEY_ID is not set".into(),
        }
        .into();
        assert!(!err.is_retryable());
        assert_eq!(err.user_code(), Some("cloud.credentials_unavailable"));
        assert!(err.user_hint().is_some());
    }

    #[test]
    fn test_serde_json_errors_become_serialization_errors() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = parse_err.into();
        assert!(matches!(
            err,
            Error::Ops(OpsError::SerializationError { .. })
        ));
    }
}
