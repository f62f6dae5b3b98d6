//! File-backed user preference tier

use crate::store::{SettingsBackend, SettingsTier};
use crate::value::SettingValue;
use sparkfeed_errors::{ConfigError, Error, SettingsError};
use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Environment variable overriding the user defaults file location
pub const DEFAULTS_PATH_ENV: &str = "SPARKFEED_DEFAULTS_PATH";

/// User preferences persisted as a flat TOML table.
///
/// The file is re-read whenever its modification stamp changes, so edits by
/// another process show up on the next lookup. Writes replace the file
/// atomically.
#[derive(Debug)]
pub struct UserDefaults {
    path: PathBuf,
    cache: RefCell<Cached>,
}

#[derive(Debug, Default)]
struct Cached {
    table: toml::Table,
    stamp: Option<(SystemTime, u64)>,
}

impl UserDefaults {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: RefCell::default(),
        }
    }

    /// Open the defaults file for a bundle at its standard location
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn for_bundle(bundle_identifier: &str) -> Result<Self, Error> {
        Ok(Self::new(Self::default_path(bundle_identifier)?))
    }

    /// `$SPARKFEED_DEFAULTS_PATH`, else `<config dir>/<bundle id>/updater.toml`
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path(bundle_identifier: &str) -> Result<PathBuf, Error> {
        if let Ok(path) = std::env::var(DEFAULTS_PATH_ENV) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join(bundle_identifier).join("updater.toml"))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, reason: impl std::fmt::Display) -> Error {
        SettingsError::StoreUnavailable {
            tier: SettingsTier::User.to_string(),
            reason: format!("{}: {reason}", self.path.display()),
        }
        .into()
    }

    /// Reload the table if the file changed since the last read
    fn refresh(&self) -> Result<(), Error> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let mut cache = self.cache.borrow_mut();
                cache.table.clear();
                cache.stamp = None;
                return Ok(());
            }
            Err(e) => return Err(self.unavailable(e)),
        };

        let stamp = metadata.modified().ok().map(|m| (m, metadata.len()));
        if stamp.is_some() && self.cache.borrow().stamp == stamp {
            return Ok(());
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| self.unavailable(e))?;
        let table: toml::Table = toml::from_str(&contents).map_err(|e| self.unavailable(e))?;

        debug!(path = %self.path.display(), keys = table.len(), "user defaults reloaded");
        let mut cache = self.cache.borrow_mut();
        cache.table = table;
        cache.stamp = stamp;
        Ok(())
    }

    fn write_failed(&self, key: &str, error: impl std::fmt::Display) -> Error {
        SettingsError::WriteFailed {
            key: key.to_string(),
            path: self.path.display().to_string(),
            error: error.to_string(),
        }
        .into()
    }

    fn persist(&self, key: &str, table: &toml::Table) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.write_failed(key, e))?;
        }

        let contents = toml::to_string(table).map_err(|e| self.write_failed(key, e))?;

        // Write to temporary file first
        let temp_path = self.path.with_extension("toml.tmp");
        fs::write(&temp_path, contents).map_err(|e| self.write_failed(key, e))?;

        // Atomic rename
        fs::rename(&temp_path, &self.path).map_err(|e| self.write_failed(key, e))?;
        Ok(())
    }
}

impl SettingsBackend for UserDefaults {
    fn tier(&self) -> SettingsTier {
        SettingsTier::User
    }

    fn lookup(&self, key: &str) -> Result<Option<SettingValue>, Error> {
        self.refresh()?;
        Ok(self
            .cache
            .borrow()
            .table
            .get(key)
            .and_then(SettingValue::from_toml))
    }

    fn store(&self, key: &str, value: SettingValue) -> Result<(), Error> {
        self.refresh()?;

        let mut table = self.cache.borrow().table.clone();
        table.insert(key.to_string(), value.to_toml());
        self.persist(key, &table)?;

        // Only a successful write updates what reads observe
        let stamp = fs::metadata(&self.path)
            .ok()
            .and_then(|m| m.modified().ok().map(|t| (t, m.len())));
        let mut cache = self.cache.borrow_mut();
        cache.table = table;
        cache.stamp = stamp;
        Ok(())
    }
}
