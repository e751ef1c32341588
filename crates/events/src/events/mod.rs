use serde::{Deserialize, Serialize};

use crate::EventSource;
use stackgc_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code, when the error carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod general;
pub mod reconcile;
pub mod scan;

pub use general::*;
pub use reconcile::*;
pub use scan::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// Stack scanning and reference extraction
    Scan(ScanEvent),

    /// Bucket listing and deletion
    Reconcile(ReconcileEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Scan(_) => EventSource::SCAN,
            Self::Reconcile(_) => EventSource::RECONCILE,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::OperationFailed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Scan(ScanEvent::StackSkipped {
                reason: StackSkipReason::UnreadableTemplate,
                ..
            }) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Scan(ScanEvent::ResourceSkipped { .. } | ScanEvent::StackSkipped { .. }) => {
                Level::DEBUG
            }

            _ => Level::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackgc_errors::CloudError;

    #[test]
    fn failure_context_from_error() {
        let err = CloudError::ListObjectsFailed {
            bucket: "assets".to_string(),
            message: "throttled".to_string(),
        };
        let failure = FailureContext::from_error(&err);
        assert_eq!(failure.code.as_deref(), Some("cloud.list_objects_failed"));
        assert!(failure.message.contains("assets"));
        assert!(failure.hint.is_some());
        assert!(failure.retryable);
    }

    #[test]
    fn skip_decisions_log_at_debug() {
        let event = AppEvent::Scan(ScanEvent::StackSkipped {
            stack: "unrelated".to_string(),
            reason: StackSkipReason::NoBootstrapMarker,
        });
        assert_eq!(event.log_level(), tracing::Level::DEBUG);
        assert_eq!(event.event_source(), EventSource::SCAN);
    }

    #[test]
    fn unreadable_templates_log_at_warn() {
        let event = AppEvent::Scan(ScanEvent::StackSkipped {
            stack: "broken".to_string(),
            reason: StackSkipReason::UnreadableTemplate,
        });
        assert_eq!(event.log_level(), tracing::Level::WARN);
    }
}
