//! stackgc - garbage collector for CloudFormation staging bucket assets
//!
//! Scans settled stacks, builds the set of bundles they still reference and
//! removes the rest from the staging buckets. Runs are dry unless `--yes`
//! is given.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use stackgc_cloud::{AwsCloud, CredentialSource};
use stackgc_config::Config;
use stackgc_events::EventReceiver;
use stackgc_ops::{OpsContextBuilder, OpsCtx};
use stackgc_types::{ColorChoice, GcReport, OutputFormat, RunMode};
use std::process;
use std::sync::Arc;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting stackgc v{}", env!("CARGO_PKG_VERSION"));

    // defaults < config file < environment < flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global, &cli.command);

    let region = config.region()?.to_string();
    let credentials = CredentialSource::from_profile(config.aws.profile.as_deref());
    info!(region = %region, credentials = %credentials, "Connecting");
    let cloud = Arc::new(AwsCloud::connect(&region, &credentials).await?);

    let Commands::Gc { yes, .. } = &cli.command;
    let run_mode = RunMode::from_confirmation(*yes);

    let (event_sender, event_receiver) = stackgc_events::channel();
    let output = if cli.global.json {
        OutputFormat::Json
    } else {
        config.general.default_output
    };
    let json_output = output == OutputFormat::Json;
    let color_choice = match output {
        OutputFormat::Plain => ColorChoice::Never,
        OutputFormat::Tty | OutputFormat::Json => {
            cli.global.color.unwrap_or(config.general.color)
        }
    };

    let ops_ctx = OpsContextBuilder::new()
        .with_cloud(cloud)
        .with_event_sender(event_sender)
        .with_config(config)
        .with_run_mode(run_mode)
        .build()?;

    let renderer = OutputRenderer::new(output, color_choice);

    let colors_enabled = match color_choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };
    let mut event_handler = EventHandler::new(colors_enabled, cli.global.debug, json_output);

    let report =
        execute_command_with_events(cli.command, ops_ctx, event_receiver, &mut event_handler)
            .await?;

    renderer.render_report(&report)?;

    info!("Command completed successfully");
    Ok(())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    ops_ctx: OpsCtx,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<GcReport, CliError> {
    let mut command_future = Box::pin(execute_command(command, ops_ctx));

    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for command to finish */ }
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(command: Commands, ctx: OpsCtx) -> Result<GcReport, CliError> {
    match command {
        Commands::Gc { .. } => Ok(stackgc_ops::gc(&ctx).await?),
    }
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if json_mode {
        // JSON mode: keep stderr clean, log to file only when debugging
        if debug_enabled {
            let log_dir = Config::logs_dir();
            if std::fs::create_dir_all(&log_dir).is_ok() {
                if let Ok(file) = std::fs::File::create(log_file_path(&log_dir)) {
                    tracing_subscriber::fmt()
                        .json()
                        .with_writer(file)
                        .with_env_filter(debug_filter())
                        .init();
                    return;
                }
            }
        }
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else if debug_enabled {
        // Debug mode: structured JSON logs to file
        let log_dir = Config::logs_dir();
        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            eprintln!("Warning: Failed to create log directory: {e}");
        }

        let log_file = log_file_path(&log_dir);
        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(debug_filter())
                    .init();

                eprintln!("Debug logging enabled: {}", log_file.display());
            }
            Err(e) => {
                eprintln!("Warning: Failed to create log file: {e}");
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_env_filter(
                        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
                            |_| {
                                tracing_subscriber::EnvFilter::new(
                                    "info,stackgc=info,stackgc_ops=info",
                                )
                            },
                        ),
                    )
                    .init();
            }
        }
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("warn,stackgc=warn,stackgc_ops=warn")
                }),
            )
            .init();
    }
}

fn debug_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,stackgc=debug,stackgc_ops=debug,stackgc_cloud=debug",
        )
    })
}

fn log_file_path(log_dir: &std::path::Path) -> std::path::PathBuf {
    log_dir.join(format!(
        "stackgc-{}.log",
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    ))
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs, command: &Commands) {
    if let Some(color) = global.color {
        config.general.color = color;
    }

    let Commands::Gc {
        region,
        profile,
        templates,
        listing,
        ..
    } = command;
    if let Some(region) = region {
        config.aws.region = Some(region.clone());
    }
    if let Some(profile) = profile {
        config.aws.profile = Some(profile.clone());
    }
    // the flag can only switch template removal on
    if *templates {
        config.gc.remove_templates = true;
    }
    if let Some(listing) = listing {
        config.gc.listing_mode = *listing;
    }
}
