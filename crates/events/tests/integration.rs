//! Integration tests for events

#[cfg(test)]
mod tests {
    use stackgc_events::*;
    use stackgc_types::{AssetKind, DeletionRecord, RunMode, StoredObject};

    #[tokio::test]
    async fn test_emitter_wraps_events_with_meta() {
        let (tx, mut rx) = channel();

        tx.emit_warning("test warning");
        tx.emit_debug("test debug");

        let first = rx.recv().await.unwrap();
        assert!(matches!(
            first.event,
            AppEvent::General(GeneralEvent::Warning { .. })
        ));
        assert_eq!(first.meta.level, EventLevel::Warn);
        assert_eq!(first.meta.source, EventSource::GENERAL);

        let second = rx.recv().await.unwrap();
        assert!(matches!(
            second.event,
            AppEvent::General(GeneralEvent::DebugLog { .. })
        ));
        assert_ne!(first.meta.event_id, second.meta.event_id);
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_warning("ignored");
    }

    struct RunScoped {
        tx: EventSender,
    }

    impl EventEmitter for RunScoped {
        fn event_sender(&self) -> Option<&EventSender> {
            Some(&self.tx)
        }

        fn correlation_id(&self) -> Option<&str> {
            Some("run-42")
        }
    }

    #[tokio::test]
    async fn test_correlation_id_is_stamped() {
        let (tx, mut rx) = channel();
        let emitter = RunScoped { tx };

        emitter.emit(AppEvent::Reconcile(ReconcileEvent::Started {
            buckets: 1,
            run_mode: RunMode::DryRun,
        }));

        let message = rx.recv().await.unwrap();
        assert_eq!(message.meta.correlation_id.as_deref(), Some("run-42"));
        assert_eq!(message.meta.source, EventSource::RECONCILE);
        assert_eq!(message.meta.level, EventLevel::Info);
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let record = DeletionRecord::new(
            "bucket",
            StoredObject::version("lambda2.zip", "v1"),
            AssetKind::Bundle,
        );
        let event = AppEvent::Reconcile(ReconcileEvent::ObjectDeleted { record });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["domain"], "reconcile");
        assert_eq!(json["event"]["type"], "ObjectDeleted");
        assert_eq!(json["event"]["record"]["key"], "lambda2.zip");
    }
}
