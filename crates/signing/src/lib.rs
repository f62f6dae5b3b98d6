#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Detached feed signature checking
//!
//! A host bundle that opts into signed feeds declares one or more minisign
//! public keys. The feed entry point hands the raw feed bytes and the
//! detached signature to [`SigningPolicy::validate`], which is the only
//! place a [`SigningValidationStatus`] is produced.

use base64::{engine::general_purpose, Engine as _};
use minisign_verify::{PublicKey, Signature};
use serde::{Deserialize, Serialize};
use sparkfeed_errors::{ConfigError, Error, SigningError};
use sparkfeed_types::SigningValidationStatus;
use tracing::{debug, warn};

/// A public key trusted to sign the feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrustedKey {
    /// Hex-encoded minisign key number
    pub id: String,
    /// Base64 minisign public key
    pub data: String,
}

impl TrustedKey {
    /// Parse a base64 minisign public key as declared in a bundle manifest.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MalformedPublicKey` if the key is not valid base64
    /// or is not a minisign Ed25519 public key.
    pub fn from_base64(data: &str) -> Result<Self, Error> {
        let data = data.trim();
        PublicKey::from_base64(data).map_err(|e| ConfigError::MalformedPublicKey {
            reason: e.to_string(),
        })?;

        let decoded = general_purpose::STANDARD
            .decode(data)
            .map_err(|e| ConfigError::MalformedPublicKey {
                reason: e.to_string(),
            })?;
        if decoded.len() < 10 {
            return Err(ConfigError::MalformedPublicKey {
                reason: "key too short".to_string(),
            }
            .into());
        }

        Ok(Self {
            id: hex::encode(&decoded[2..10]),
            data: data.to_string(),
        })
    }
}

/// Whether and how a feed must be signed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningPolicy {
    /// The bundle does not require signed feeds
    Unsigned,
    /// The feed must verify against one of these keys
    Required(Vec<TrustedKey>),
}

impl SigningPolicy {
    /// Build the policy from the bundle's declarations.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any declared key is malformed, even
    /// when signing is not required, or if signing is required but no key is
    /// declared.
    pub fn from_bundle(require_signed_feed: bool, public_keys: &[&str]) -> Result<Self, Error> {
        let keys = public_keys
            .iter()
            .filter(|k| !k.trim().is_empty())
            .map(|k| TrustedKey::from_base64(k))
            .collect::<Result<Vec<_>, _>>()?;

        if !require_signed_feed {
            return Ok(Self::Unsigned);
        }

        if keys.is_empty() {
            return Err(ConfigError::MissingPublicKey.into());
        }

        Ok(Self::Required(keys))
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required(_))
    }

    /// Check the feed bytes against the detached signature.
    #[must_use]
    pub fn validate(&self, content: &[u8], signature: Option<&str>) -> SigningValidationStatus {
        let Self::Required(keys) = self else {
            debug!("feed signing not required; skipping validation");
            return SigningValidationStatus::Skipped;
        };

        let Some(signature) = signature else {
            warn!("feed signing required but no signature was provided");
            return SigningValidationStatus::Failed;
        };

        match verify_minisign_bytes_with_keys(content, signature, keys) {
            Ok(key_id) => {
                debug!(key_id = %key_id, "feed signature verified");
                SigningValidationStatus::Succeeded
            }
            Err(e) => {
                warn!(error = %e, "feed signature validation failed");
                SigningValidationStatus::Failed
            }
        }
    }
}

/// Verify raw bytes against a minisign signature string using any of the provided trusted keys.
/// Returns the key id that successfully verified.
///
/// # Errors
/// Returns an error if the signature cannot be parsed or if no trusted key verifies the content.
pub fn verify_minisign_bytes_with_keys(
    content: &[u8],
    signature_str: &str,
    trusted_keys: &[TrustedKey],
) -> Result<String, Error> {
    if trusted_keys.is_empty() {
        return Err(SigningError::NoTrustedKeys.into());
    }

    // Full minisign string including comment lines
    let sig = Signature::decode(signature_str)
        .map_err(|e| SigningError::InvalidSignatureFormat(e.to_string()))?;

    let mut last_err = None;
    for key in trusted_keys {
        match PublicKey::from_base64(&key.data) {
            Ok(pk) => match pk.verify(content, &sig, false) {
                Ok(()) => return Ok(key.id.clone()),
                Err(e) => {
                    last_err = Some(format!("{e}"));
                }
            },
            Err(e) => {
                last_err = Some(format!("invalid trusted key format for {}: {e}", key.id));
            }
        }
    }

    Err(SigningError::VerificationFailed {
        reason: format!(
            "no match among {} trusted keys; last error: {}",
            trusted_keys.len(),
            last_err.unwrap_or_else(|| "unknown".to_string())
        ),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use minisign::KeyPair;
    use std::io::Cursor;

    const FEED: &[u8] = br#"{"items":[{"version":"2"}]}"#;

    fn keypair() -> (minisign::SecretKey, String) {
        let KeyPair { pk, sk } = KeyPair::generate_unencrypted_keypair().unwrap();
        (sk, pk.to_base64())
    }

    fn sign(sk: &minisign::SecretKey, content: &[u8]) -> String {
        minisign::sign(None, sk, Cursor::new(content), None, None)
            .unwrap()
            .into_string()
    }

    #[test]
    fn test_unsigned_policy_skips() {
        let policy = SigningPolicy::from_bundle(false, &[]).unwrap();
        assert_eq!(policy, SigningPolicy::Unsigned);
        assert!(!policy.is_required());
        assert_eq!(
            policy.validate(FEED, None),
            SigningValidationStatus::Skipped
        );

        let (_sk, pk) = keypair();
        let policy = SigningPolicy::from_bundle(false, &[pk.as_str()]).unwrap();
        assert_eq!(policy, SigningPolicy::Unsigned);
    }

    #[test]
    fn test_malformed_key_is_error_when_signing_optional() {
        let err = SigningPolicy::from_bundle(false, &["not even a key"]).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MalformedPublicKey { .. })
        ));
    }

    #[test]
    fn test_required_without_key_is_config_error() {
        let err = SigningPolicy::from_bundle(true, &[]).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::MissingPublicKey)));

        let err = SigningPolicy::from_bundle(true, &["   "]).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::MissingPublicKey)));
    }

    #[test]
    fn test_malformed_key_is_config_error() {
        let err = SigningPolicy::from_bundle(true, &["%%%not-base64%%%"]).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MalformedPublicKey { .. })
        ));
    }

    #[test]
    fn test_valid_signature_succeeds() {
        let (sk, pk) = keypair();
        let policy = SigningPolicy::from_bundle(true, &[&pk]).unwrap();
        let sig = sign(&sk, FEED);

        assert_eq!(
            policy.validate(FEED, Some(&sig)),
            SigningValidationStatus::Succeeded
        );
    }

    #[test]
    fn test_tampered_content_fails() {
        let (sk, pk) = keypair();
        let policy = SigningPolicy::from_bundle(true, &[&pk]).unwrap();
        let sig = sign(&sk, FEED);

        let tampered = br#"{"items":[{"version":"2","critical":true}]}"#;
        assert_eq!(
            policy.validate(tampered, Some(&sig)),
            SigningValidationStatus::Failed
        );
    }

    #[test]
    fn test_missing_or_garbage_signature_fails() {
        let (_sk, pk) = keypair();
        let policy = SigningPolicy::from_bundle(true, &[&pk]).unwrap();

        assert_eq!(policy.validate(FEED, None), SigningValidationStatus::Failed);
        assert_eq!(
            policy.validate(FEED, Some("garbage")),
            SigningValidationStatus::Failed
        );
    }

    #[test]
    fn test_any_trusted_key_may_verify() {
        let (_other_sk, other_pk) = keypair();
        let (sk, pk) = keypair();
        let sig = sign(&sk, FEED);

        let keys = vec![
            TrustedKey::from_base64(&other_pk).unwrap(),
            TrustedKey::from_base64(&pk).unwrap(),
        ];
        let id = verify_minisign_bytes_with_keys(FEED, &sig, &keys).unwrap();
        assert_eq!(id, keys[1].id);
    }

    #[test]
    fn test_untrusted_key_fails() {
        let (sk, _pk) = keypair();
        let (_other_sk, other_pk) = keypair();
        let sig = sign(&sk, FEED);

        let keys = vec![TrustedKey::from_base64(&other_pk).unwrap()];
        let err = verify_minisign_bytes_with_keys(FEED, &sig, &keys).unwrap_err();
        assert!(matches!(
            err,
            Error::Signing(SigningError::VerificationFailed { .. })
        ));
    }
}
