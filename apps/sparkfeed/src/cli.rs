//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// sparkfeed - Inspect appcast feeds and updater settings
#[derive(Parser)]
#[command(name = "sparkfeed")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect appcast feeds and updater settings")]
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

    /// Enable debug logging to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Bundle manifest declaring the host's identifier and updater defaults
    #[arg(long, global = true, value_name = "PATH", env = "SPARKFEED_BUNDLE")]
    pub bundle: Option<PathBuf>,

    /// Use alternate user defaults file
    #[arg(long, global = true, value_name = "PATH")]
    pub defaults: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Load a feed, validate its signature and list its items
    Feed {
        /// Path to the feed document (JSON)
        feed: PathBuf,

        /// Path to the detached minisign signature of the feed
        #[arg(short, long, value_name = "SIG")]
        signature: Option<PathBuf>,

        /// Only show items on these channels (items without a channel are always shown)
        #[arg(long = "channel", value_name = "NAME")]
        channels: Vec<String>,
    },

    /// Inspect or change updater settings
    #[command(subcommand)]
    Settings(SettingsCommands),
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show effective settings and where each value came from
    Show,

    /// Write a user setting
    Set {
        /// automatically-checks-for-updates, update-check-interval,
        /// automatically-downloads-updates or sends-system-profile
        property: String,

        /// New value (booleans accept true/false/yes/no, intervals are seconds)
        value: String,
    },
}
