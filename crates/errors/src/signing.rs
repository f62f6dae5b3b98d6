//! Signing error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SigningError {
    #[error("signature verification failed: {reason}")]
    VerificationFailed { reason: String },

    #[error("no trusted keys available for verification")]
    NoTrustedKeys,

    #[error("invalid signature format: {0}")]
    InvalidSignatureFormat(String),
}

impl UserFacingError for SigningError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::VerificationFailed { .. } => "signing.verification_failed",
            Self::NoTrustedKeys => "signing.no_trusted_keys",
            Self::InvalidSignatureFormat(_) => "signing.invalid_signature",
        };
        Some(code)
    }
}
