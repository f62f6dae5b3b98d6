//! Layered settings lookup
//!
//! Settings resolve through an ordered chain of tiers. The first tier that
//! holds a value for a key answers; writes go to the user tier only.

use crate::value::SettingValue;
use serde::{Deserialize, Serialize};
use sparkfeed_errors::{Error, SettingsError};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, warn};

/// Where a settings backend sits in the precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsTier {
    /// Per-user preferences, read-write
    User,
    /// Developer-declared values shipped with the bundle, read-only
    Bundle,
}

impl std::fmt::Display for SettingsTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Bundle => write!(f, "bundle"),
        }
    }
}

/// A key-value capability backing one settings tier.
///
/// Backends are used from a single thread and may share state with other
/// handles on that thread, so methods take `&self`.
pub trait SettingsBackend {
    fn tier(&self) -> SettingsTier;

    /// Look up a key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn lookup(&self, key: &str) -> Result<Option<SettingValue>, Error>;

    /// Persist a value.
    ///
    /// # Errors
    ///
    /// Read-only tiers return `SettingsError::ReadOnlyTier`; writable tiers
    /// return an error if the value cannot be persisted.
    fn store(&self, key: &str, _value: SettingValue) -> Result<(), Error> {
        Err(SettingsError::ReadOnlyTier {
            tier: self.tier().to_string(),
            key: key.to_string(),
        }
        .into())
    }
}

/// A value together with the tier that supplied it
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub value: SettingValue,
    pub tier: SettingsTier,
}

/// Ordered chain of settings tiers
#[derive(Default)]
pub struct LayeredStore {
    tiers: Vec<Box<dyn SettingsBackend>>,
}

impl LayeredStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard chain: user preferences over the bundle manifest
    pub fn two_tier(
        user: impl SettingsBackend + 'static,
        bundle: impl SettingsBackend + 'static,
    ) -> Self {
        Self::new().with_tier(user).with_tier(bundle)
    }

    /// Append a tier with lower precedence than those already present
    #[must_use]
    pub fn with_tier(mut self, backend: impl SettingsBackend + 'static) -> Self {
        self.tiers.push(Box::new(backend));
        self
    }

    /// First value held for `key`, in precedence order.
    ///
    /// A tier that cannot be read is skipped with a warning, so reads degrade
    /// to lower tiers and finally to the caller's default.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<Resolved> {
        for backend in &self.tiers {
            match backend.lookup(key) {
                Ok(Some(value)) => {
                    debug!(key, tier = %backend.tier(), "setting resolved");
                    return Some(Resolved {
                        value,
                        tier: backend.tier(),
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(key, tier = %backend.tier(), error = %e, "settings tier unavailable; falling back");
                }
            }
        }
        None
    }

    /// Value held for `key` by the given tier only
    #[must_use]
    pub fn lookup_in(&self, tier: SettingsTier, key: &str) -> Option<SettingValue> {
        self.tiers
            .iter()
            .filter(|backend| backend.tier() == tier)
            .find_map(|backend| match backend.lookup(key) {
                Ok(value) => value,
                Err(e) => {
                    warn!(key, tier = %tier, error = %e, "settings tier unavailable");
                    None
                }
            })
    }

    /// Write `value` to the user tier.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::StoreUnavailable` if the chain has no user tier,
    /// or the backend's error if the write fails.
    pub fn store(&self, key: &str, value: SettingValue) -> Result<(), Error> {
        let backend = self
            .tiers
            .iter()
            .find(|backend| backend.tier() == SettingsTier::User)
            .ok_or_else(|| SettingsError::StoreUnavailable {
                tier: SettingsTier::User.to_string(),
                reason: "no user tier configured".to_string(),
            })?;

        debug!(key, value = %value, "storing user setting");
        backend.store(key, value)
    }
}

/// In-memory tier whose contents are shared by every clone.
///
/// Clones observe each other's writes, which lets another component on the
/// same thread (a preferences window, say) change values under the
/// resolver.
#[derive(Debug, Clone)]
pub struct MemoryDefaults {
    tier: SettingsTier,
    values: Rc<RefCell<BTreeMap<String, SettingValue>>>,
}

impl MemoryDefaults {
    #[must_use]
    pub fn new(tier: SettingsTier) -> Self {
        Self {
            tier,
            values: Rc::default(),
        }
    }

    #[must_use]
    pub fn user() -> Self {
        Self::new(SettingsTier::User)
    }

    #[must_use]
    pub fn bundle() -> Self {
        Self::new(SettingsTier::Bundle)
    }

    /// Set a value directly, regardless of tier
    pub fn insert(&self, key: impl Into<String>, value: impl Into<SettingValue>) {
        self.values.borrow_mut().insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.borrow().get(key).cloned()
    }
}

impl SettingsBackend for MemoryDefaults {
    fn tier(&self) -> SettingsTier {
        self.tier
    }

    fn lookup(&self, key: &str) -> Result<Option<SettingValue>, Error> {
        Ok(self.get(key))
    }

    fn store(&self, key: &str, value: SettingValue) -> Result<(), Error> {
        if self.tier != SettingsTier::User {
            return Err(SettingsError::ReadOnlyTier {
                tier: self.tier.to_string(),
                key: key.to_string(),
            }
            .into());
        }
        self.insert(key, value);
        Ok(())
    }
}
