#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Updater settings for sparkfeed
//!
//! Settings resolve through two tiers:
//! - User defaults (a per-bundle TOML file, writable)
//! - Bundle manifest (developer-declared, read-only)
//!
//! Anything neither tier holds falls back to a built-in default.

mod bundle;
pub mod keys;
mod store;
mod updater;
mod user_defaults;
mod value;

pub use bundle::{BundleManifest, HostBundle};
pub use store::{LayeredStore, MemoryDefaults, Resolved, SettingsBackend, SettingsTier};
pub use updater::{
    allows_automatic_updates, SettingSource, Sourced, ThreadAffinity, UpdateCadence,
    UpdaterSettings, UpdaterSettingsSnapshot, WritableSetting,
    DEFAULT_IMPATIENT_UPDATE_CHECK_INTERVAL, DEFAULT_UPDATE_CHECK_INTERVAL,
};
pub use user_defaults::{UserDefaults, DEFAULTS_PATH_ENV};
pub use value::SettingValue;
