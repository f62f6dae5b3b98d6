//! The validated feed handed to consumers

use crate::document::FeedDocument;
use crate::models::AppcastItem;
use crate::sanitize::sanitize;
use serde::Serialize;
use sparkfeed_types::SigningValidationStatus;
use tracing::{debug, warn};

/// Ordered, sanitized update items plus the feed's signing status.
///
/// There are no mutators: every fetch produces a new `Appcast`. It is not
/// `Deserialize`; items enter only through [`Appcast::build`], which
/// sanitizes them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Appcast {
    items: Vec<AppcastItem>,
    signing_validation_status: SigningValidationStatus,
}

impl Appcast {
    /// Sanitize each item against `status`, keeping input order exactly.
    pub fn build<I>(items: I, status: SigningValidationStatus) -> Self
    where
        I: IntoIterator<Item = AppcastItem>,
    {
        let items: Vec<AppcastItem> = items
            .into_iter()
            .map(|item| sanitize(item, status))
            .collect();

        if status.is_failed() {
            warn!(
                items = items.len(),
                "feed signature validation failed; items restricted to safe mode"
            );
        } else {
            debug!(items = items.len(), status = %status, "appcast built");
        }

        Self {
            items,
            signing_validation_status: status,
        }
    }

    pub fn from_document(document: FeedDocument, status: SigningValidationStatus) -> Self {
        Self::build(document.items, status)
    }

    /// Items in feed order; not sorted by version
    #[must_use]
    pub fn items(&self) -> &[AppcastItem] {
        &self.items
    }

    #[must_use]
    pub fn signing_validation_status(&self) -> SigningValidationStatus {
        self.signing_validation_status
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AppcastItem> {
        self.items.iter()
    }

    /// New appcast holding the items that match `keep`, same status.
    #[must_use]
    pub fn filtered<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&AppcastItem) -> bool,
    {
        Self {
            items: self.items.iter().filter(|i| keep(i)).cloned().collect(),
            signing_validation_status: self.signing_validation_status,
        }
    }

    /// Keep default-channel items plus items on one of `channels`.
    #[must_use]
    pub fn filtered_by_channels(&self, channels: &[&str]) -> Self {
        self.filtered(|item| match item.channel.as_deref() {
            None => true,
            Some(channel) => channels.contains(&channel),
        })
    }
}

impl<'a> IntoIterator for &'a Appcast {
    type Item = &'a AppcastItem;
    type IntoIter = std::slice::Iter<'a, AppcastItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
