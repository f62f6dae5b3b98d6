//! Feed signing validation status

use serde::{Deserialize, Serialize};

/// Outcome of checking a feed's detached signature.
///
/// Computed once per feed parse by the feed entry point and carried by the
/// resulting appcast. When the outcome is [`Failed`](Self::Failed), items
/// operate in a safe fallback mode: they cannot be critical or
/// informational and carry no release notes or links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningValidationStatus {
    /// The bundle does not require a signed feed; nothing was validated
    Skipped,
    /// The feed signature verified against a trusted key
    Succeeded,
    /// Signing is required and the signature is missing or did not verify
    Failed,
}

impl SigningValidationStatus {
    /// Whether items from this feed must be degraded
    #[must_use]
    pub fn is_failed(self) -> bool {
        matches!(self, Self::Failed)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SigningValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
