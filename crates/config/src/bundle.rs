//! Host bundle metadata and its read-only settings tier

use crate::keys;
use crate::store::{SettingsBackend, SettingsTier};
use crate::value::SettingValue;
use sparkfeed_errors::{ConfigError, Error};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Developer-declared settings shipped inside the application bundle
#[derive(Debug, Clone, Default)]
pub struct BundleManifest {
    table: toml::Table,
}

impl BundleManifest {
    /// Parse a manifest from TOML
    ///
    /// # Errors
    ///
    /// Returns an error if the contents are not a valid TOML table.
    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        let table: toml::Table = toml::from_str(contents)?;
        Ok(Self { table })
    }

    /// Load a manifest from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::from(ConfigError::NotFound {
                    path: path.display().to_string(),
                })
            } else {
                Error::io_with_path(&e, path)
            }
        })?;
        Self::from_toml_str(&contents)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<SettingValue> {
        self.table.get(key).and_then(SettingValue::from_toml)
    }
}

impl SettingsBackend for BundleManifest {
    fn tier(&self) -> SettingsTier {
        SettingsTier::Bundle
    }

    fn lookup(&self, key: &str) -> Result<Option<SettingValue>, Error> {
        Ok(self.get(key))
    }
}

/// The application whose updates are being managed
#[derive(Debug, Clone)]
pub struct HostBundle {
    identifier: String,
    manifest: BundleManifest,
}

impl HostBundle {
    /// Wrap a manifest, which must declare `CFBundleIdentifier`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingField` if the identifier is absent or empty.
    pub fn new(manifest: BundleManifest) -> Result<Self, Error> {
        let identifier = manifest
            .get(keys::BUNDLE_IDENTIFIER)
            .and_then(|v| v.as_str().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingField {
                field: keys::BUNDLE_IDENTIFIER.to_string(),
            })?;

        Ok(Self {
            identifier,
            manifest,
        })
    }

    /// Load the bundle manifest at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read or parsed, or lacks an
    /// identifier.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        Self::new(BundleManifest::load_from_file(path).await?)
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn manifest(&self) -> &BundleManifest {
        &self.manifest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_load_bundle_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
CFBundleIdentifier = "com.example.ctrlv"
SUFeedURL = "https://example.com/appcast.json"
SUEnableAutomaticChecks = true
SUScheduledCheckInterval = 43200
            "#
        )
        .unwrap();

        let bundle = HostBundle::load(temp_file.path()).await.unwrap();
        assert_eq!(bundle.identifier(), "com.example.ctrlv");
        assert_eq!(
            bundle.manifest().get("SUEnableAutomaticChecks"),
            Some(SettingValue::Bool(true))
        );
        assert_eq!(
            bundle.manifest().lookup("SUScheduledCheckInterval").unwrap(),
            Some(SettingValue::Integer(43200))
        );
    }

    #[tokio::test]
    async fn test_missing_manifest() {
        let err = BundleManifest::load_from_file(Path::new("/nonexistent/bundle.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_unreadable_manifest_keeps_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = BundleManifest::load_from_file(dir.path()).await.unwrap_err();
        match err {
            Error::Io { path, .. } => assert_eq!(path.as_deref(), Some(dir.path())),
            other => panic!("expected I/O error, got {other:?}"),
        }
    }

    #[test]
    fn test_identifier_required() {
        let manifest = BundleManifest::from_toml_str("SUFeedURL = \"https://x\"").unwrap();
        let err = HostBundle::new(manifest).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::MissingField { .. })));

        let manifest = BundleManifest::from_toml_str("CFBundleIdentifier = \"  \"").unwrap();
        assert!(HostBundle::new(manifest).is_err());
    }

    #[test]
    fn test_manifest_is_read_only() {
        let manifest = BundleManifest::default();
        assert!(manifest.store("SUFeedURL", "x".into()).is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let err = BundleManifest::from_toml_str("= nope").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ParseError { .. })));
    }
}
