//! Configuration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ConfigError {
    #[error("bundle manifest not found: {path}")]
    NotFound { path: String },

    #[error("parse error: {message}")]
    ParseError { message: String },

    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("signed feeds are required but no public key is declared")]
    MissingPublicKey,

    #[error("malformed feed signing key: {reason}")]
    MalformedPublicKey { reason: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => Some("Pass the bundle manifest with --bundle."),
            Self::MissingField { .. } => {
                Some("Add the missing key noted in the error message to the bundle manifest.")
            }
            Self::MissingPublicKey => {
                Some("Declare SUPublicEDKey in the bundle manifest or disable SURequireSignedFeed.")
            }
            Self::MalformedPublicKey { .. } => {
                Some("SUPublicEDKey must be a base64 minisign public key.")
            }
            Self::InvalidValue { .. } | Self::ParseError { .. } => {
                Some("Fix the configuration value and retry.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "config.not_found",
            Self::ParseError { .. } => "config.parse_error",
            Self::MissingField { .. } => "config.missing_field",
            Self::InvalidValue { .. } => "config.invalid_value",
            Self::MissingPublicKey => "config.missing_public_key",
            Self::MalformedPublicKey { .. } => "config.malformed_public_key",
        };
        Some(code)
    }
}
