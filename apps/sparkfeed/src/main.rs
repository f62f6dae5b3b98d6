//! sparkfeed - Inspect appcast feeds and updater settings
//!
//! Loads a host bundle manifest and its user defaults, validates feeds
//! against the bundle's signing policy, and reads or writes the updater
//! settings the way an embedded updater would.

mod cli;
mod display;
mod error;

use crate::cli::{Cli, Commands, GlobalArgs, SettingsCommands};
use crate::display::{OutputRenderer, SettingsReport};
use crate::error::CliError;
use clap::Parser;
use sparkfeed_appcast::{load_feed, SigningPolicy};
use sparkfeed_config::{HostBundle, UpdaterSettings, UserDefaults, WritableSetting};
use std::path::Path;
use std::process;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if json_mode {
            println!("{}", e.to_json());
        } else {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting sparkfeed v{}", env!("CARGO_PKG_VERSION"));

    let renderer = OutputRenderer::new(cli.global.json);

    match cli.command {
        Commands::Feed {
            feed,
            signature,
            channels,
        } => {
            let policy = match &cli.global.bundle {
                Some(path) => {
                    let bundle = HostBundle::load(path).await?;
                    open_settings(&bundle, &cli.global)?.signing_policy()?
                }
                None => SigningPolicy::Unsigned,
            };

            let content = tokio::fs::read(&feed).await?;
            let signature = match signature {
                Some(path) => Some(tokio::fs::read_to_string(&path).await?),
                None => None,
            };

            let appcast = load_feed(&content, signature.as_deref(), &policy)?;
            let appcast = if channels.is_empty() {
                appcast
            } else {
                let channels: Vec<&str> = channels.iter().map(String::as_str).collect();
                appcast.filtered_by_channels(&channels)
            };
            renderer.render_appcast(&appcast)?;
        }

        Commands::Settings(command) => {
            let bundle = HostBundle::load(require_bundle(&cli.global)?).await?;
            let settings = open_settings(&bundle, &cli.global)?;

            match command {
                SettingsCommands::Show => {
                    let report = SettingsReport {
                        bundle_identifier: bundle.identifier().to_string(),
                        snapshot: settings.snapshot(),
                        cadence: settings.check_cadence().into(),
                    };
                    renderer.render_settings(&report)?;
                }
                SettingsCommands::Set { property, value } => {
                    let setting: WritableSetting = property.parse()?;
                    settings.set_from_str(setting, &value)?;
                    info!(key = setting.key(), %value, "setting updated");
                    renderer.render_success_message(&format!("Set {property} = {value}"))?;
                }
            }
        }
    }

    info!("Command completed successfully");
    Ok(())
}

fn require_bundle(global: &GlobalArgs) -> Result<&Path, CliError> {
    global.bundle.as_deref().ok_or_else(|| {
        CliError::InvalidArguments("--bundle is required for settings commands".to_string())
    })
}

/// Settings for the bundle, honoring an alternate user defaults file
fn open_settings(bundle: &HostBundle, global: &GlobalArgs) -> Result<UpdaterSettings, CliError> {
    let settings = match &global.defaults {
        Some(path) => UpdaterSettings::with_user_tier(bundle, UserDefaults::new(path)),
        None => UpdaterSettings::new(bundle)?,
    };
    Ok(settings)
}

/// Initialize tracing/logging.
///
/// Logs go to stderr so stdout stays clean for rendered output. JSON mode
/// emits JSON log lines and stays silent unless debug logging is requested.
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    let filter = if debug_enabled {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(
                "info,sparkfeed=debug,sparkfeed_appcast=debug,sparkfeed_config=debug,sparkfeed_signing=debug",
            )
        })
    } else if json_mode {
        tracing_subscriber::EnvFilter::new("off")
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    if json_mode {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .with_env_filter(filter)
            .init();
    }
}
