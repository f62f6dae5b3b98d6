//! Updater settings error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SettingsError {
    #[error(
        "impatient update check interval ({impatient_interval_secs}s) must be greater than the \
         update check interval ({update_check_interval_secs}s)"
    )]
    InvariantViolation {
        update_check_interval_secs: f64,
        impatient_interval_secs: f64,
    },

    #[error("{tier} settings store unavailable: {reason}")]
    StoreUnavailable { tier: String, reason: String },

    #[error("failed to write setting {key} to {path}: {error}")]
    WriteFailed {
        key: String,
        path: String,
        error: String,
    },

    #[error("{tier} settings tier is read-only (key: {key})")]
    ReadOnlyTier { tier: String, key: String },
}

impl UserFacingError for SettingsError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvariantViolation { .. } => Some(
                "Lower SUScheduledCheckInterval or raise SUScheduledImpatientCheckInterval.",
            ),
            Self::StoreUnavailable { .. } | Self::WriteFailed { .. } => {
                Some("Ensure the user defaults file is readable and writable.")
            }
            Self::ReadOnlyTier { .. } => {
                Some("Bundle settings are set by the developer and cannot be changed.")
            }
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable { .. } | Self::WriteFailed { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvariantViolation { .. } => "settings.invariant_violation",
            Self::StoreUnavailable { .. } => "settings.store_unavailable",
            Self::WriteFailed { .. } => "settings.write_failed",
            Self::ReadOnlyTier { .. } => "settings.read_only_tier",
        };
        Some(code)
    }
}
