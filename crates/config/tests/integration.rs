//! Integration tests for config

#[cfg(test)]
mod tests {
    use sparkfeed_config::*;
    use sparkfeed_errors::{ConfigError, Error, SettingsError};
    use sparkfeed_signing::SigningPolicy;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::{NamedTempFile, TempDir};

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    async fn host_bundle(manifest: &str) -> HostBundle {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{manifest}").unwrap();
        HostBundle::load(file.path()).await.unwrap()
    }

    #[tokio::test]
    async fn test_settings_persist_across_instances() {
        let bundle = host_bundle(
            r#"
CFBundleIdentifier = "com.example.app"
SUEnableAutomaticChecks = true
SUFeedURL = "https://example.com/appcast.json"
"#,
        )
        .await;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("updater.toml");

        let settings = UpdaterSettings::with_user_tier(&bundle, UserDefaults::new(&path));
        assert!(settings.automatically_checks_for_updates());
        settings
            .set_update_check_interval(Duration::from_secs(43_200))
            .unwrap();
        settings.set_automatically_downloads_updates(true).unwrap();
        drop(settings);

        let reopened = UpdaterSettings::with_user_tier(&bundle, UserDefaults::new(&path));
        assert_eq!(
            reopened.update_check_interval(),
            Duration::from_secs(43_200)
        );
        assert!(reopened.automatically_downloads_updates());
        assert!(reopened.allows_automatic_updates());
        assert_eq!(
            reopened.feed_url().unwrap().as_str(),
            "https://example.com/appcast.json"
        );
    }

    #[tokio::test]
    async fn test_external_edit_of_user_defaults() {
        let bundle = host_bundle("CFBundleIdentifier = \"com.example.app\"\n").await;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("updater.toml");

        let settings = UpdaterSettings::with_user_tier(&bundle, UserDefaults::new(&path));
        assert!(!settings.sends_system_profile());

        std::fs::write(&path, "SUSendProfileInfo = true\n").unwrap();
        assert!(settings.sends_system_profile());
    }

    #[tokio::test]
    async fn test_developer_opt_out() {
        let bundle = host_bundle(
            r#"
CFBundleIdentifier = "com.example.app"
SUEnableAutomaticChecks = true
SUAllowsAutomaticUpdates = false
"#,
        )
        .await;
        let settings = UpdaterSettings::with_user_tier(&bundle, MemoryDefaults::user());

        assert_eq!(settings.allows_automatic_updates_option(), Some(false));
        assert!(!settings.allows_automatic_updates());

        // Storing the raw preference still works; it is simply not allowed
        settings.set_automatically_downloads_updates(true).unwrap();
        assert!(settings.automatically_downloads_updates());
        assert!(!settings.allows_automatic_updates());
    }

    #[tokio::test]
    async fn test_cadence_reported_not_clamped() {
        let bundle = host_bundle(
            r#"
CFBundleIdentifier = "com.example.app"
SUScheduledCheckInterval = 700000
"#,
        )
        .await;
        let settings = UpdaterSettings::with_user_tier(&bundle, MemoryDefaults::user());

        match settings.check_cadence() {
            Err(Error::Settings(SettingsError::InvariantViolation {
                update_check_interval_secs,
                impatient_interval_secs,
            })) => {
                assert!((update_check_interval_secs - 700_000.0).abs() < f64::EPSILON);
                assert!((impatient_interval_secs - 604_800.0).abs() < f64::EPSILON);
            }
            other => panic!("expected invariant violation, got {other:?}"),
        }
        assert_eq!(settings.update_check_interval(), Duration::from_secs(700_000));
    }

    #[tokio::test]
    async fn test_signing_policy_from_manifest() {
        let unsigned = host_bundle("CFBundleIdentifier = \"com.example.app\"\n").await;
        let settings = UpdaterSettings::with_user_tier(&unsigned, MemoryDefaults::user());
        assert_eq!(settings.signing_policy().unwrap(), SigningPolicy::Unsigned);

        let missing_key = host_bundle(
            r#"
CFBundleIdentifier = "com.example.app"
SURequireSignedFeed = true
"#,
        )
        .await;
        let settings = UpdaterSettings::with_user_tier(&missing_key, MemoryDefaults::user());
        assert!(matches!(
            settings.signing_policy(),
            Err(Error::Config(ConfigError::MissingPublicKey))
        ));
    }

    #[tokio::test]
    async fn test_manifest_requires_identifier() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "SUEnableAutomaticChecks = true").unwrap();
        let result = HostBundle::load(file.path()).await;
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingField { .. }))
        ));
    }

    #[test]
    fn test_snapshot_serializes() {
        let bundle = MemoryDefaults::bundle();
        bundle.insert(keys::ALLOWS_AUTOMATIC_UPDATES, false);
        let user = MemoryDefaults::user();
        user.insert(keys::SEND_PROFILE_INFO, true);
        let settings = UpdaterSettings::with_store(LayeredStore::two_tier(user, bundle));

        let snapshot = settings.snapshot();
        assert_eq!(
            snapshot.update_check_interval.value,
            DEFAULT_UPDATE_CHECK_INTERVAL
        );

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["update_check_interval"]["source"], "default");
        assert_eq!(json["update_check_interval"]["value"]["secs"], 86_400);
        assert_eq!(json["sends_system_profile"]["value"], true);
        assert_eq!(json["sends_system_profile"]["source"], "user");
        assert_eq!(json["allows_automatic_updates_option"], false);
        assert_eq!(json["allows_automatic_updates"], false);
        assert!(json["feed_url"].is_null());
    }

    #[test]
    fn test_defaults_path_env_override() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::set_var(DEFAULTS_PATH_ENV, "/tmp/sparkfeed-test/custom.toml");
        let path = UserDefaults::default_path("com.example.app");
        std::env::remove_var(DEFAULTS_PATH_ENV);

        assert_eq!(
            path.unwrap(),
            PathBuf::from("/tmp/sparkfeed-test/custom.toml")
        );
    }

    #[test]
    fn test_defaults_path_blank_override_ignored() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::set_var(DEFAULTS_PATH_ENV, "   ");
        let path = UserDefaults::default_path("com.example.app");
        std::env::remove_var(DEFAULTS_PATH_ENV);

        match dirs::config_dir() {
            Some(config_dir) => {
                assert_eq!(
                    path.unwrap(),
                    config_dir.join("com.example.app").join("updater.toml")
                );
            }
            None => assert!(matches!(
                path,
                Err(Error::Config(ConfigError::NotFound { .. }))
            )),
        }
    }

    #[test]
    fn test_defaults_path_for_bundle() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        std::env::remove_var(DEFAULTS_PATH_ENV);

        if dirs::config_dir().is_none() {
            return;
        }
        let defaults = UserDefaults::for_bundle("com.example.app").unwrap();
        assert!(defaults
            .path()
            .ends_with(PathBuf::from("com.example.app").join("updater.toml")));
    }
}
