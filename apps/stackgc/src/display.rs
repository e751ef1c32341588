//! Output rendering and formatting

use comfy_table::presets::{ASCII_FULL, UTF8_FULL};
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use console::Term;
use stackgc_types::{ColorChoice, GcReport, OutputFormat, RunMode};
use std::io;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Report format
    format: OutputFormat,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(format: OutputFormat, color_choice: ColorChoice) -> Self {
        Self {
            format,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Render the gc report
    pub fn render_report(&self, report: &GcReport) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => self.render_json(report),
            OutputFormat::Plain | OutputFormat::Tty => {
                self.render_table(report);
                Ok(())
            }
        }
    }

    /// Render as JSON
    #[allow(clippy::unused_self)]
    fn render_json(&self, report: &GcReport) -> io::Result<()> {
        let json = stackgc_ops::report_to_json(report).map_err(io::Error::other)?;
        println!("{json}");
        Ok(())
    }

    /// Render per-bucket table followed by the removable objects
    fn render_table(&self, report: &GcReport) {
        println!(
            "Account {} in {}: {} stack(s) scanned, {} bootstrapped, {} referenced asset(s)",
            report.account_id,
            report.region,
            report.stacks_scanned,
            report.bootstrap_stacks,
            report.referenced_assets
        );
        println!();

        if report.buckets.is_empty() {
            println!("No staging buckets are referenced.");
        } else {
            println!("{}", self.bucket_table(report));
        }

        if report.removable_count() > 0 {
            println!();
            println!("{}", self.removable_table(report));
            let unsampled = report.unsampled_count();
            if unsampled > 0 {
                println!("... and {unsampled} more, listed in the progress output above.");
            }
        }

        println!();
        println!("{}", summary_line(report));
    }

    fn new_table(&self) -> Table {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        match self.format {
            OutputFormat::Plain => {
                table.load_preset(ASCII_FULL).force_no_tty();
            }
            OutputFormat::Tty | OutputFormat::Json => {
                table.load_preset(UTF8_FULL);
            }
        }
        table
    }

    fn bucket_table(&self, report: &GcReport) -> Table {
        let mut table = self.new_table();

        table.set_header(vec![
            Cell::new("Bucket").add_attribute(Attribute::Bold),
            Cell::new("Listing").add_attribute(Attribute::Bold),
            Cell::new("Listed").add_attribute(Attribute::Bold),
            Cell::new("Kept").add_attribute(Attribute::Bold),
            Cell::new("Removable").add_attribute(Attribute::Bold),
            Cell::new("Deleted").add_attribute(Attribute::Bold),
        ]);

        for bucket in &report.buckets {
            let removable = Cell::new(bucket.removable.to_string());
            let removable = if self.supports_color() && bucket.removable > 0 {
                removable.fg(Color::Yellow)
            } else {
                removable
            };

            table.add_row(vec![
                Cell::new(&bucket.bucket),
                Cell::new(bucket.listing.to_string()),
                Cell::new(bucket.objects_listed.to_string()),
                Cell::new(bucket.objects_kept.to_string()),
                removable,
                Cell::new(bucket.deleted.to_string()),
            ]);
        }

        table
    }

    fn removable_table(&self, report: &GcReport) -> Table {
        let mut table = self.new_table();

        table.set_header(vec![
            Cell::new("Bucket").add_attribute(Attribute::Bold),
            Cell::new("Key").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("Kind").add_attribute(Attribute::Bold),
        ]);

        for record in report.sample() {
            let kind = if record.is_delete_marker {
                format!("{} (delete marker)", record.kind)
            } else {
                record.kind.to_string()
            };
            let kind = Cell::new(kind);
            let kind = if self.supports_color() {
                kind.fg(match report.run_mode {
                    RunMode::DryRun => Color::Yellow,
                    RunMode::Confirmed => Color::Red,
                })
            } else {
                kind
            };

            table.add_row(vec![
                Cell::new(&record.bucket),
                Cell::new(&record.key),
                Cell::new(record.version_id.as_deref().unwrap_or("-")),
                kind,
            ]);
        }

        table
    }

    /// Check if color output is supported
    fn supports_color(&self) -> bool {
        if self.format == OutputFormat::Plain {
            return false;
        }
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}

/// Closing line stating whether anything was actually deleted
fn summary_line(report: &GcReport) -> String {
    let removable = report.removable_count();
    match report.run_mode {
        RunMode::DryRun if removable == 0 => "Dry run: nothing to delete.".to_string(),
        RunMode::DryRun => format!(
            "Dry run: {removable} object(s) would be deleted. Re-run with --yes to delete them."
        ),
        RunMode::Confirmed => format!(
            "Deleted {} of {removable} removable object(s) in {} ms.",
            report.deleted_count(),
            report.duration_ms
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackgc_types::{AssetKind, BucketReport, DeletionRecord, ListingKind, StoredObject};

    fn report(run_mode: RunMode, deleted: usize) -> GcReport {
        let mut bucket = BucketReport::new("assets", ListingKind::AllVersions);
        bucket.objects_listed = 3;
        bucket.objects_kept = 1;
        bucket.record_removable(DeletionRecord::new(
            "assets",
            StoredObject::version("a.zip", "v1"),
            AssetKind::Bundle,
        ));
        bucket.record_removable(DeletionRecord::new(
            "assets",
            StoredObject::delete_marker("a.zip", "v2"),
            AssetKind::Bundle,
        ));
        bucket.deleted = deleted;
        GcReport {
            run_mode,
            region: "us-east-1".to_string(),
            account_id: "123456789012".to_string(),
            stacks_scanned: 2,
            bootstrap_stacks: 1,
            referenced_assets: 1,
            buckets: vec![bucket],
            duration_ms: 12,
        }
    }

    #[test]
    fn dry_run_summary_points_at_yes() {
        let line = summary_line(&report(RunMode::DryRun, 0));
        assert!(line.contains("2 object(s) would be deleted"));
        assert!(line.contains("--yes"));
    }

    #[test]
    fn empty_dry_run_says_so() {
        let mut report = report(RunMode::DryRun, 0);
        report.buckets[0].removable = 0;
        report.buckets[0].sample.clear();
        assert_eq!(summary_line(&report), "Dry run: nothing to delete.");
    }

    #[test]
    fn confirmed_summary_counts_deletes() {
        let line = summary_line(&report(RunMode::Confirmed, 2));
        assert_eq!(line, "Deleted 2 of 2 removable object(s) in 12 ms.");
    }

    #[test]
    fn tables_list_every_removable_version() {
        let renderer = OutputRenderer::new(OutputFormat::Tty, ColorChoice::Never);
        let report = report(RunMode::DryRun, 0);

        let buckets = renderer.bucket_table(&report).to_string();
        assert!(buckets.contains("assets"));
        assert!(buckets.contains("all versions"));

        let removable = renderer.removable_table(&report).to_string();
        assert!(removable.contains("v1"));
        assert!(removable.contains("delete marker"));
    }

    #[test]
    fn plain_output_uses_ascii_borders_without_color() {
        let report = report(RunMode::DryRun, 0);

        let plain = OutputRenderer::new(OutputFormat::Plain, ColorChoice::Always);
        assert!(!plain.supports_color());
        let table = plain.bucket_table(&report).to_string();
        assert!(table.contains('+'));
        assert!(!table.contains('│'));
        assert!(!table.contains('\u{1b}'));

        let tty = OutputRenderer::new(OutputFormat::Tty, ColorChoice::Always);
        assert!(tty.supports_color());
        assert!(tty.bucket_table(&report).to_string().contains('│'));
    }
}
