#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Update feed (appcast) handling for sparkfeed
//!
//! This crate turns a fetched feed into an [`Appcast`]: the feed bytes are
//! checked against the bundle's [`SigningPolicy`], parsed into ordered items,
//! and every item is sanitized according to the resulting
//! [`SigningValidationStatus`]. Fetching the feed is left to the caller.

mod appcast;
mod document;
mod models;
mod sanitize;

pub use appcast::Appcast;
pub use document::FeedDocument;
pub use models::{AppcastItem, Enclosure, ReleaseNotes};
pub use sanitize::sanitize;

pub use sparkfeed_signing::SigningPolicy;
pub use sparkfeed_types::SigningValidationStatus;

use sparkfeed_errors::{Error, FeedError};
use tracing::info;

/// Validate, parse and build an appcast from fetched feed bytes.
///
/// The signature is checked over the exact bytes before parsing. A
/// structurally invalid document fails regardless of the signing outcome.
///
/// # Errors
///
/// Returns a feed error if the bytes are not UTF-8 or the document is
/// malformed.
pub fn load_feed(
    content: &[u8],
    signature: Option<&str>,
    policy: &SigningPolicy,
) -> Result<Appcast, Error> {
    let status = policy.validate(content, signature);

    let text = std::str::from_utf8(content).map_err(|e| FeedError::Malformed {
        message: format!("feed is not valid UTF-8: {e}"),
    })?;
    let document = FeedDocument::from_json(text)?;

    let appcast = Appcast::from_document(document, status);
    info!(
        items = appcast.len(),
        signing_required = policy.is_required(),
        status = %appcast.signing_validation_status(),
        "feed loaded"
    );
    Ok(appcast)
}
