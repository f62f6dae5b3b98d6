#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for sparkfeed
//!
//! This crate provides the small value types shared by the feed, signing
//! and settings crates.

pub mod status;

pub use status::SigningValidationStatus;

use serde::{Deserialize, Serialize};

/// How an update payload is installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstallationType {
    /// Bundle replacement
    Application,
    /// Installer package run without user interaction
    Package,
    /// Installer package requiring the installer UI
    InteractivePackage,
}

impl Default for InstallationType {
    fn default() -> Self {
        Self::Application
    }
}

impl std::fmt::Display for InstallationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Application => write!(f, "application"),
            Self::Package => write!(f, "package"),
            Self::InteractivePackage => write!(f, "interactive-package"),
        }
    }
}

/// Format of inline release notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseNotesFormat {
    Html,
    PlainText,
    Markdown,
}

impl Default for ReleaseNotesFormat {
    fn default() -> Self {
        Self::Html
    }
}
