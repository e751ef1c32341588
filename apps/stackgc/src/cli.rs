//! Command line interface definition

use clap::{Parser, Subcommand};
use stackgc_types::{ColorChoice, ListingMode};
use std::path::PathBuf;

/// stackgc - remove staging bucket assets no deployed stack references
#[derive(Parser)]
#[command(name = "stackgc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Remove staging bucket assets no deployed stack references")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Write structured debug logs to the log directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Find staging assets no settled stack references and delete them
    Gc {
        /// Region to scan
        #[arg(long, value_name = "REGION")]
        region: Option<String>,

        /// Named credentials profile (environment credentials otherwise)
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,

        /// Actually delete; without this flag the run only reports
        #[arg(short, long)]
        yes: bool,

        /// Also remove unreferenced template files
        #[arg(long)]
        templates: bool,

        /// Which entries to list in each bucket
        #[arg(long, value_enum, value_name = "MODE")]
        listing: Option<ListingMode>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gc_defaults_to_a_dry_run() {
        let cli = Cli::try_parse_from(["stackgc", "gc", "--region", "eu-west-1"]).unwrap();
        let Commands::Gc {
            region,
            profile,
            yes,
            templates,
            listing,
        } = cli.command;
        assert_eq!(region.as_deref(), Some("eu-west-1"));
        assert!(profile.is_none());
        assert!(!yes);
        assert!(!templates);
        assert!(listing.is_none());
        assert!(!cli.global.json);
    }

    #[test]
    fn parses_every_flag() {
        let cli = Cli::try_parse_from([
            "stackgc",
            "gc",
            "--profile",
            "ops",
            "-y",
            "--templates",
            "--listing",
            "current",
            "--json",
            "--color",
            "never",
        ])
        .unwrap();
        let Commands::Gc {
            profile,
            yes,
            templates,
            listing,
            ..
        } = cli.command;
        assert_eq!(profile.as_deref(), Some("ops"));
        assert!(yes);
        assert!(templates);
        assert_eq!(listing, Some(ListingMode::Current));
        assert!(cli.global.json);
        assert_eq!(cli.global.color, Some(ColorChoice::Never));
    }

    #[test]
    fn rejects_unknown_listing_mode() {
        assert!(Cli::try_parse_from(["stackgc", "gc", "--listing", "everything"]).is_err());
    }
}
