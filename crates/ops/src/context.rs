//! Operations context for dependency injection

use stackgc_cloud::{IdentityProvider, ObjectStore, StackSource};
use stackgc_config::Config;
use stackgc_errors::{Error, OpsError};
use stackgc_events::{EventEmitter, EventSender};
use stackgc_types::{AssetPolicy, RunMode};
use std::sync::Arc;
use uuid::Uuid;

/// Operations context providing access to all run components
pub struct OpsCtx {
    /// Deployment control plane
    pub stacks: Arc<dyn StackSource>,
    /// Staging bucket storage
    pub store: Arc<dyn ObjectStore>,
    /// Caller identity lookup
    pub identity: Arc<dyn IdentityProvider>,
    /// Event sender for progress reporting
    pub tx: EventSender,
    /// Merged configuration
    pub config: Config,
    /// Dry run unless explicitly confirmed
    pub run_mode: RunMode,
    /// Target region, resolved from the configuration at build time
    pub region: String,
    run_id: String,
}

impl OpsCtx {
    // No public constructor - use OpsContextBuilder instead

    /// File-type filter in effect for this run
    #[must_use]
    pub fn asset_policy(&self) -> AssetPolicy {
        self.config.asset_policy()
    }

    /// Identifier stamped on every event of this run
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

impl EventEmitter for OpsCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }

    fn correlation_id(&self) -> Option<&str> {
        Some(&self.run_id)
    }
}

/// Builder for operations context
#[derive(Default)]
pub struct OpsContextBuilder {
    stacks: Option<Arc<dyn StackSource>>,
    store: Option<Arc<dyn ObjectStore>>,
    identity: Option<Arc<dyn IdentityProvider>>,
    tx: Option<EventSender>,
    config: Option<Config>,
    run_mode: RunMode,
}

impl OpsContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use one provider for the control plane, storage and identity
    #[must_use]
    pub fn with_cloud<C>(self, cloud: Arc<C>) -> Self
    where
        C: StackSource + ObjectStore + IdentityProvider + 'static,
    {
        self.with_stack_source(cloud.clone())
            .with_object_store(cloud.clone())
            .with_identity(cloud)
    }

    /// Set deployment control plane
    #[must_use]
    pub fn with_stack_source(mut self, stacks: Arc<dyn StackSource>) -> Self {
        self.stacks = Some(stacks);
        self
    }

    /// Set object storage
    #[must_use]
    pub fn with_object_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set identity provider
    #[must_use]
    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Set configuration
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Set run mode
    #[must_use]
    pub fn with_run_mode(mut self, run_mode: RunMode) -> Self {
        self.run_mode = run_mode;
        self
    }

    /// Build the context
    ///
    /// # Errors
    ///
    /// Returns an error if any required component is missing, the
    /// configuration names no region, or it fails validation.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let stacks = self.stacks.ok_or_else(|| missing("stack_source"))?;
        let store = self.store.ok_or_else(|| missing("object_store"))?;
        let identity = self.identity.ok_or_else(|| missing("identity"))?;
        let tx = self.tx.ok_or_else(|| missing("event_sender"))?;
        let config = self.config.ok_or_else(|| missing("config"))?;

        config.validate()?;
        let region = config.region()?.to_string();

        Ok(OpsCtx {
            stacks,
            store,
            identity,
            tx,
            config,
            run_mode: self.run_mode,
            region,
            run_id: Uuid::new_v4().to_string(),
        })
    }
}

fn missing(component: &str) -> OpsError {
    OpsError::MissingComponent {
        component: component.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackgc_cloud::MemoryCloud;

    fn config_with_region() -> Config {
        let mut config = Config::default();
        config.aws.region = Some("us-east-1".to_string());
        config
    }

    #[test]
    fn build_requires_every_component() {
        let (tx, _rx) = stackgc_events::channel();
        let result = OpsContextBuilder::new()
            .with_event_sender(tx)
            .with_config(config_with_region())
            .build();
        assert!(matches!(
            result,
            Err(Error::Ops(OpsError::MissingComponent { .. }))
        ));
    }

    #[test]
    fn build_requires_a_region() {
        let (tx, _rx) = stackgc_events::channel();
        let result = OpsContextBuilder::new()
            .with_cloud(Arc::new(MemoryCloud::default()))
            .with_event_sender(tx)
            .with_config(Config::default())
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn defaults_to_dry_run_and_stamps_run_id() {
        let (tx, mut rx) = stackgc_events::channel();
        let ctx = OpsContextBuilder::new()
            .with_cloud(Arc::new(MemoryCloud::default()))
            .with_event_sender(tx)
            .with_config(config_with_region())
            .build()
            .unwrap();

        assert_eq!(ctx.run_mode, RunMode::DryRun);
        assert_eq!(ctx.region, "us-east-1");

        ctx.emit_warning("hello");
        let message = rx.try_recv().unwrap();
        assert_eq!(message.meta.correlation_id.as_deref(), Some(ctx.run_id()));
    }
}
