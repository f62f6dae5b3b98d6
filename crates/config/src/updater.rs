//! Effective updater settings
//!
//! Every accessor resolves through the [`LayeredStore`] when called; nothing
//! is cached. A value written by another handle on the same thread, or by
//! another process editing the user defaults file, is visible on the next
//! read.

use crate::bundle::HostBundle;
use crate::keys;
use crate::store::{LayeredStore, SettingsBackend, SettingsTier};
use crate::user_defaults::UserDefaults;
use crate::value::SettingValue;
use serde::Serialize;
use sparkfeed_errors::{ConfigError, Error, SettingsError};
use sparkfeed_signing::SigningPolicy;
use std::str::FromStr;
use std::thread::{self, ThreadId};
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Regular check interval when none is configured (one day)
pub const DEFAULT_UPDATE_CHECK_INTERVAL: Duration = Duration::from_secs(86_400);

/// Impatient check interval when none is configured (one week)
pub const DEFAULT_IMPATIENT_UPDATE_CHECK_INTERVAL: Duration = Duration::from_secs(604_800);

/// Whether the user may turn on automatic download and install.
///
/// Automatic checks must be on, and the developer must not have opted out.
#[must_use]
pub fn allows_automatic_updates(
    automatically_checks_for_updates: bool,
    allows_automatic_updates_option: Option<bool>,
) -> bool {
    automatically_checks_for_updates && allows_automatic_updates_option.unwrap_or(true)
}

/// The check intervals the scheduler runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateCadence {
    pub update_check_interval: Duration,
    pub impatient_update_check_interval: Duration,
}

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingSource {
    User,
    Bundle,
    Default,
}

impl From<SettingsTier> for SettingSource {
    fn from(tier: SettingsTier) -> Self {
        match tier {
            SettingsTier::User => Self::User,
            SettingsTier::Bundle => Self::Bundle,
        }
    }
}

impl std::fmt::Display for SettingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Bundle => write!(f, "bundle"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// A resolved value and its source
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sourced<T> {
    pub value: T,
    pub source: SettingSource,
}

/// Point-in-time view of every setting, for display and diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdaterSettingsSnapshot {
    pub automatically_checks_for_updates: Sourced<bool>,
    pub update_check_interval: Sourced<Duration>,
    pub automatically_downloads_updates: Sourced<bool>,
    pub allows_automatic_updates_option: Option<bool>,
    pub allows_automatic_updates: bool,
    pub impatient_update_check_interval: Sourced<Duration>,
    pub sends_system_profile: Sourced<bool>,
    pub feed_url: Option<Url>,
}

/// User-writable settings, by their command-line names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritableSetting {
    AutomaticallyChecksForUpdates,
    UpdateCheckInterval,
    AutomaticallyDownloadsUpdates,
    SendsSystemProfile,
}

impl WritableSetting {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::AutomaticallyChecksForUpdates => keys::ENABLE_AUTOMATIC_CHECKS,
            Self::UpdateCheckInterval => keys::SCHEDULED_CHECK_INTERVAL,
            Self::AutomaticallyDownloadsUpdates => keys::AUTOMATICALLY_UPDATE,
            Self::SendsSystemProfile => keys::SEND_PROFILE_INFO,
        }
    }
}

impl FromStr for WritableSetting {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "automatically-checks-for-updates" => Ok(Self::AutomaticallyChecksForUpdates),
            "update-check-interval" => Ok(Self::UpdateCheckInterval),
            "automatically-downloads-updates" => Ok(Self::AutomaticallyDownloadsUpdates),
            "sends-system-profile" => Ok(Self::SendsSystemProfile),
            _ => Err(ConfigError::InvalidValue {
                field: "setting".to_string(),
                value: s.to_string(),
            }
            .into()),
        }
    }
}

/// The thread a value is confined to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    owner: ThreadId,
}

impl ThreadAffinity {
    /// Confine to the calling thread
    #[must_use]
    pub fn current() -> Self {
        Self {
            owner: thread::current().id(),
        }
    }

    #[must_use]
    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    #[must_use]
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Panic unless called on the owning thread
    ///
    /// # Panics
    ///
    /// Panics when the calling thread is not the owner.
    #[track_caller]
    pub fn assert_current(&self, operation: &str) {
        let current = thread::current();
        assert!(
            current.id() == self.owner,
            "UpdaterSettings::{operation} called on thread {:?} ({}), but settings are confined to thread {:?}",
            current.id(),
            current.name().unwrap_or("unnamed"),
            self.owner(),
        );
    }
}

/// Reads and updates updater settings for one host bundle.
///
/// Values come from the user tier first and the bundle manifest second;
/// writes go to the user tier. The type is neither `Send` nor `Sync`, and
/// every public method also checks that it runs on the thread that created
/// the value, alongside whatever UI shares its backends.
pub struct UpdaterSettings {
    store: LayeredStore,
    affinity: ThreadAffinity,
}

impl UpdaterSettings {
    /// Settings backed by the bundle's user defaults file and its manifest
    ///
    /// # Errors
    ///
    /// Returns an error if the user defaults location cannot be determined.
    pub fn new(bundle: &HostBundle) -> Result<Self, Error> {
        let user = UserDefaults::for_bundle(bundle.identifier())?;
        Ok(Self::with_user_tier(bundle, user))
    }

    pub fn with_user_tier(bundle: &HostBundle, user: impl SettingsBackend + 'static) -> Self {
        Self::with_store(LayeredStore::two_tier(user, bundle.manifest().clone()))
    }

    #[must_use]
    pub fn with_store(store: LayeredStore) -> Self {
        Self {
            store,
            affinity: ThreadAffinity::current(),
        }
    }

    pub fn automatically_checks_for_updates(&self) -> bool {
        self.affinity.assert_current("automatically_checks_for_updates");
        self.bool_setting(keys::ENABLE_AUTOMATIC_CHECKS).value
    }

    /// # Errors
    ///
    /// Returns an error if the user tier cannot be written.
    pub fn set_automatically_checks_for_updates(&self, enabled: bool) -> Result<(), Error> {
        self.affinity.assert_current("set_automatically_checks_for_updates");
        self.store.store(keys::ENABLE_AUTOMATIC_CHECKS, enabled.into())
    }

    pub fn update_check_interval(&self) -> Duration {
        self.affinity.assert_current("update_check_interval");
        self.interval_setting(keys::SCHEDULED_CHECK_INTERVAL, DEFAULT_UPDATE_CHECK_INTERVAL)
            .value
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a zero interval, or an error if
    /// the user tier cannot be written.
    pub fn set_update_check_interval(&self, interval: Duration) -> Result<(), Error> {
        self.affinity.assert_current("set_update_check_interval");
        if interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: keys::SCHEDULED_CHECK_INTERVAL.to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        self.store
            .store(keys::SCHEDULED_CHECK_INTERVAL, interval.into())
    }

    /// Whether the user or developer turned on automatic downloads.
    ///
    /// This does not say whether automatic downloads are allowed; see
    /// [`allows_automatic_updates`](Self::allows_automatic_updates).
    pub fn automatically_downloads_updates(&self) -> bool {
        self.affinity.assert_current("automatically_downloads_updates");
        self.bool_setting(keys::AUTOMATICALLY_UPDATE).value
    }

    /// # Errors
    ///
    /// Returns an error if the user tier cannot be written.
    pub fn set_automatically_downloads_updates(&self, enabled: bool) -> Result<(), Error> {
        self.affinity.assert_current("set_automatically_downloads_updates");
        self.store.store(keys::AUTOMATICALLY_UPDATE, enabled.into())
    }

    /// The developer's choice, from the bundle only. `None` means unspecified.
    pub fn allows_automatic_updates_option(&self) -> Option<bool> {
        self.affinity.assert_current("allows_automatic_updates_option");
        self.store
            .lookup_in(SettingsTier::Bundle, keys::ALLOWS_AUTOMATIC_UPDATES)
            .and_then(|v| v.as_bool())
    }

    pub fn allows_automatic_updates(&self) -> bool {
        self.affinity.assert_current("allows_automatic_updates");
        allows_automatic_updates(
            self.automatically_checks_for_updates(),
            self.allows_automatic_updates_option(),
        )
    }

    /// Read-only; only the bundle may configure it
    pub fn impatient_update_check_interval(&self) -> Duration {
        self.affinity.assert_current("impatient_update_check_interval");
        self.impatient_interval_setting().value
    }

    pub fn sends_system_profile(&self) -> bool {
        self.affinity.assert_current("sends_system_profile");
        self.bool_setting(keys::SEND_PROFILE_INFO).value
    }

    /// # Errors
    ///
    /// Returns an error if the user tier cannot be written.
    pub fn set_sends_system_profile(&self, enabled: bool) -> Result<(), Error> {
        self.affinity.assert_current("set_sends_system_profile");
        self.store.store(keys::SEND_PROFILE_INFO, enabled.into())
    }

    /// The regular and impatient intervals, read together.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvariantViolation` if the impatient interval
    /// is not strictly greater than the regular one. Neither value is
    /// adjusted.
    pub fn check_cadence(&self) -> Result<UpdateCadence, Error> {
        self.affinity.assert_current("check_cadence");
        let update_check_interval = self.update_check_interval();
        let impatient_update_check_interval = self.impatient_update_check_interval();

        if impatient_update_check_interval <= update_check_interval {
            return Err(SettingsError::InvariantViolation {
                update_check_interval_secs: update_check_interval.as_secs_f64(),
                impatient_interval_secs: impatient_update_check_interval.as_secs_f64(),
            }
            .into());
        }

        Ok(UpdateCadence {
            update_check_interval,
            impatient_update_check_interval,
        })
    }

    /// The feed location, if one is configured and parses as a URL
    pub fn feed_url(&self) -> Option<Url> {
        self.affinity.assert_current("feed_url");
        let resolved = self.store.lookup(keys::FEED_URL)?;
        let raw = resolved.value.as_str()?.trim();
        if raw.is_empty() {
            return None;
        }
        match Url::parse(raw) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(tier = %resolved.tier, error = %e, "ignoring invalid feed URL");
                None
            }
        }
    }

    /// How fetched feeds must be validated, from the bundle's declarations.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if signed feeds are required but the
    /// public key is missing or malformed.
    pub fn signing_policy(&self) -> Result<SigningPolicy, Error> {
        self.affinity.assert_current("signing_policy");
        let required = self
            .store
            .lookup_in(SettingsTier::Bundle, keys::REQUIRE_SIGNED_FEED)
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let key = match self
            .store
            .lookup_in(SettingsTier::Bundle, keys::PUBLIC_ED_KEY)
        {
            None => None,
            Some(SettingValue::String(key)) => Some(key),
            Some(other) => {
                return Err(ConfigError::MalformedPublicKey {
                    reason: format!("expected a string, found {other}"),
                }
                .into())
            }
        };

        let keys: Vec<&str> = key.as_deref().into_iter().collect();
        SigningPolicy::from_bundle(required, &keys)
    }

    /// Set a writable setting from its textual form
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the value does not parse, or an
    /// error if the user tier cannot be written.
    pub fn set_from_str(&self, setting: WritableSetting, value: &str) -> Result<(), Error> {
        self.affinity.assert_current("set_from_str");
        let invalid = || ConfigError::InvalidValue {
            field: setting.key().to_string(),
            value: value.to_string(),
        };

        match setting {
            WritableSetting::UpdateCheckInterval => {
                let interval = SettingValue::from(value)
                    .as_duration()
                    .ok_or_else(invalid)?;
                self.set_update_check_interval(interval)
            }
            WritableSetting::AutomaticallyChecksForUpdates
            | WritableSetting::AutomaticallyDownloadsUpdates
            | WritableSetting::SendsSystemProfile => {
                let enabled = SettingValue::from(value).as_bool().ok_or_else(invalid)?;
                self.store.store(setting.key(), enabled.into())
            }
        }
    }

    /// Resolve every setting at once, recording where each value came from
    pub fn snapshot(&self) -> UpdaterSettingsSnapshot {
        self.affinity.assert_current("snapshot");
        let automatically_checks_for_updates = self.bool_setting(keys::ENABLE_AUTOMATIC_CHECKS);
        let allows_automatic_updates_option = self.allows_automatic_updates_option();

        UpdaterSettingsSnapshot {
            allows_automatic_updates: allows_automatic_updates(
                automatically_checks_for_updates.value,
                allows_automatic_updates_option,
            ),
            automatically_checks_for_updates,
            update_check_interval: self
                .interval_setting(keys::SCHEDULED_CHECK_INTERVAL, DEFAULT_UPDATE_CHECK_INTERVAL),
            automatically_downloads_updates: self.bool_setting(keys::AUTOMATICALLY_UPDATE),
            allows_automatic_updates_option,
            impatient_update_check_interval: self.impatient_interval_setting(),
            sends_system_profile: self.bool_setting(keys::SEND_PROFILE_INFO),
            feed_url: self.feed_url(),
        }
    }

    fn bool_setting(&self, key: &str) -> Sourced<bool> {
        if let Some(resolved) = self.store.lookup(key) {
            if let Some(value) = resolved.value.as_bool() {
                return Sourced {
                    value,
                    source: resolved.tier.into(),
                };
            }
            warn!(key, tier = %resolved.tier, value = %resolved.value, "ignoring non-boolean setting");
        }
        Sourced {
            value: false,
            source: SettingSource::Default,
        }
    }

    fn interval_setting(&self, key: &str, default: Duration) -> Sourced<Duration> {
        if let Some(resolved) = self.store.lookup(key) {
            if let Some(value) = resolved.value.as_duration() {
                return Sourced {
                    value,
                    source: resolved.tier.into(),
                };
            }
            warn!(key, tier = %resolved.tier, value = %resolved.value, "ignoring invalid interval");
        }
        Sourced {
            value: default,
            source: SettingSource::Default,
        }
    }

    fn impatient_interval_setting(&self) -> Sourced<Duration> {
        self.store
            .lookup_in(SettingsTier::Bundle, keys::SCHEDULED_IMPATIENT_CHECK_INTERVAL)
            .and_then(|v| v.as_duration())
            .map_or(
                Sourced {
                    value: DEFAULT_IMPATIENT_UPDATE_CHECK_INTERVAL,
                    source: SettingSource::Default,
                },
                |value| Sourced {
                    value,
                    source: SettingSource::Bundle,
                },
            )
    }
}
