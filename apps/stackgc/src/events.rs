//! Event handling and progress display

use console::{Style, Term};
use stackgc_events::{
    AppEvent, EventMessage, GeneralEvent, ReconcileEvent, ScanEvent, StackSkipReason,
};
use stackgc_types::RunMode;

/// Event handler for progress display and user feedback
///
/// Status lines go to stderr so stdout only ever carries the final report.
pub struct EventHandler {
    term: Term,
    colors_enabled: bool,
    /// Show per-stack and per-bucket detail
    debug_enabled: bool,
    /// Log only, print nothing (JSON mode)
    quiet: bool,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, debug_enabled: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors_enabled,
            debug_enabled,
            quiet,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        crate::logging::log_event_with_tracing(&message);

        if self.quiet {
            return;
        }
        if let Some(line) = self.format_event(&message.event) {
            let _ = self.term.write_line(&line);
        }
    }

    /// Status line for an event, if it should be shown
    fn format_event(&self, event: &AppEvent) -> Option<String> {
        match event {
            AppEvent::Scan(scan) => self.format_scan(scan),
            AppEvent::Reconcile(reconcile) => self.format_reconcile(reconcile),
            AppEvent::General(general) => self.format_general(general),
        }
    }

    fn format_scan(&self, event: &ScanEvent) -> Option<String> {
        match event {
            ScanEvent::IdentityResolved { account_id, region } => {
                Some(format!("Account {account_id} in {region}"))
            }
            ScanEvent::Started { region, .. } => Some(format!("Scanning stacks in {region}")),
            ScanEvent::StackSkipped {
                stack,
                reason: reason @ StackSkipReason::UnreadableTemplate,
            } => Some(self.paint(
                &Style::new().yellow(),
                &format!("Warning: skipped {stack}: {reason}"),
            )),
            ScanEvent::StackSkipped { stack, reason } if self.debug_enabled => {
                Some(self.dim(&format!("  skipped {stack}: {reason}")))
            }
            ScanEvent::ResourceSkipped {
                stack, logical_id, ..
            } if self.debug_enabled => Some(self.dim(&format!(
                "  {stack}/{logical_id}: no usable code location"
            ))),
            ScanEvent::StackScanned { stack, assets } => {
                Some(format!("  {stack} has {assets} asset(s)"))
            }
            ScanEvent::Completed {
                stacks_scanned,
                bootstrap_stacks,
                buckets,
                references,
            } => Some(format!(
                "Scanned {stacks_scanned} stack(s), {bootstrap_stacks} bootstrapped: \
                 {references} referenced asset(s) in {buckets} bucket(s)"
            )),
            _ => None,
        }
    }

    fn format_reconcile(&self, event: &ReconcileEvent) -> Option<String> {
        match event {
            ReconcileEvent::BucketStarted { bucket, listing } => {
                Some(format!("Listing {bucket} ({listing})"))
            }
            ReconcileEvent::ObjectRemovable {
                record,
                run_mode: RunMode::DryRun,
            } => Some(self.paint(&Style::new().yellow(), &format!("  would delete {record}"))),
            ReconcileEvent::ObjectDeleted { record } => {
                Some(self.paint(&Style::new().red(), &format!("  deleted {record}")))
            }
            ReconcileEvent::BucketCompleted {
                bucket,
                listed,
                kept,
                ..
            } if self.debug_enabled => Some(self.dim(&format!(
                "  {bucket}: {listed} listed, {kept} kept"
            ))),
            _ => None,
        }
    }

    fn format_general(&self, event: &GeneralEvent) -> Option<String> {
        match event {
            GeneralEvent::Warning { message, context } => {
                let line = match context {
                    Some(context) => format!("Warning: {message} ({context})"),
                    None => format!("Warning: {message}"),
                };
                Some(self.paint(&Style::new().yellow(), &line))
            }
            GeneralEvent::OperationFailed { operation, failure } => Some(self.paint(
                &Style::new().red().bold(),
                &format!("{operation} failed: {}", failure.message),
            )),
            GeneralEvent::DebugLog { message, .. } if self.debug_enabled => {
                Some(self.dim(&format!("  {message}")))
            }
            _ => None,
        }
    }

    fn paint(&self, style: &Style, text: &str) -> String {
        if self.colors_enabled {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        self.paint(&Style::new().dim(), text)
    }
}
