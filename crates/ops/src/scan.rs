//! Deployment scanning and in-use index construction

use crate::extract::extract_references;
use crate::OpsCtx;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use stackgc_cloud::list_stacks;
use stackgc_errors::Error;
use stackgc_events::{AppEvent, EventEmitter, ScanEvent, StackSkipReason};
use stackgc_types::{
    AccountContext, InUseIndex, InUseIndexBuilder, StackStatus, StackSummary, Template,
};

/// A settled stack together with its parsed template
#[derive(Debug, Clone)]
pub struct ScannedStack {
    pub summary: StackSummary,
    /// `None` when the body was absent, empty or unparseable
    pub template: Option<Template>,
}

impl ScannedStack {
    /// The template, if this stack follows the asset-bootstrap convention
    ///
    /// # Errors
    ///
    /// Returns the reason the stack does not contribute references.
    pub fn bootstrap_template(&self, marker: &str) -> Result<&Template, StackSkipReason> {
        let template = self
            .template
            .as_ref()
            .ok_or(StackSkipReason::UnreadableTemplate)?;
        if template.has_parameter(marker) {
            Ok(template)
        } else {
            Err(StackSkipReason::NoBootstrapMarker)
        }
    }
}

/// Result of scanning every stack
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub index: InUseIndex,
    pub stacks_scanned: usize,
    pub bootstrap_stacks: usize,
}

/// Lazily list stacks in `statuses` and fetch their processed templates,
/// one stack at a time.
pub fn scan_stacks<'a>(
    ctx: &'a OpsCtx,
    statuses: &'a [StackStatus],
) -> BoxStream<'a, Result<ScannedStack, Error>> {
    list_stacks(ctx.stacks.as_ref(), statuses)
        .and_then(move |summary| async move {
            let body = ctx.stacks.get_template(&summary.name).await?;
            let template = body.as_deref().and_then(Template::parse);
            tracing::debug!(
                stack = %summary.name,
                status = %summary.status,
                body_bytes = body.as_ref().map_or(0, String::len),
                parsed = template.is_some(),
                "fetched template"
            );
            Ok(ScannedStack { summary, template })
        })
        .boxed()
}

/// Fold the references of every bootstrap stack into the in-use index.
///
/// The index is complete when this returns; nothing is listed or deleted
/// before that.
///
/// # Errors
///
/// Returns an error if a stack listing or template fetch fails.
pub async fn collect_references(
    ctx: &OpsCtx,
    account: &AccountContext,
) -> Result<ScanOutcome, Error> {
    let statuses = ctx.config.stack_statuses();
    let marker = ctx.config.gc.marker_parameter.as_str();

    ctx.emit(AppEvent::Scan(ScanEvent::Started {
        region: account.region.clone(),
        statuses: statuses.iter().map(ToString::to_string).collect(),
    }));

    let mut builder = InUseIndexBuilder::new();
    let mut stacks_scanned = 0;
    let mut bootstrap_stacks = 0;

    let mut stacks = scan_stacks(ctx, &statuses);
    while let Some(stack) = stacks.try_next().await? {
        stacks_scanned += 1;

        let template = match stack.bootstrap_template(marker) {
            Ok(template) => template,
            Err(reason) => {
                ctx.emit(AppEvent::Scan(ScanEvent::StackSkipped {
                    stack: stack.summary.name.clone(),
                    reason,
                }));
                continue;
            }
        };
        bootstrap_stacks += 1;

        let extraction = extract_references(template, account);
        for skipped in extraction.skipped {
            ctx.emit(AppEvent::Scan(ScanEvent::ResourceSkipped {
                stack: stack.summary.name.clone(),
                logical_id: skipped.logical_id,
                resource_type: skipped.resource_type,
            }));
        }

        ctx.emit(AppEvent::Scan(ScanEvent::StackScanned {
            stack: stack.summary.name.clone(),
            assets: extraction.references.len(),
        }));
        builder.extend(extraction.references);
    }

    let index = builder.build();
    ctx.emit(AppEvent::Scan(ScanEvent::Completed {
        stacks_scanned,
        bootstrap_stacks,
        buckets: index.bucket_count(),
        references: index.reference_count(),
    }));

    Ok(ScanOutcome {
        index,
        stacks_scanned,
        bootstrap_stacks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(template: Option<&str>) -> ScannedStack {
        ScannedStack {
            summary: StackSummary::new("s", StackStatus::CREATE_COMPLETE),
            template: template.and_then(Template::parse),
        }
    }

    #[test]
    fn marker_gates_the_template() {
        let with_marker = stack(Some(r#"{"Parameters":{"BootstrapVersion":{}}}"#));
        assert!(with_marker.bootstrap_template("BootstrapVersion").is_ok());
        assert_eq!(
            with_marker.bootstrap_template("Other").unwrap_err(),
            StackSkipReason::NoBootstrapMarker
        );
        assert_eq!(
            stack(Some("not a template"))
                .bootstrap_template("BootstrapVersion")
                .unwrap_err(),
            StackSkipReason::UnreadableTemplate
        );
        assert_eq!(
            stack(None).bootstrap_template("BootstrapVersion").unwrap_err(),
            StackSkipReason::UnreadableTemplate
        );
    }
}
