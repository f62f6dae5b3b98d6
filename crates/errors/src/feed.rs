//! Feed (appcast) error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeedError {
    #[error("malformed feed: {message}")]
    Malformed { message: String },

    #[error("malformed feed item at index {index}: {message}")]
    MalformedItem { index: usize, message: String },
}

impl UserFacingError for FeedError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        Some("The update feed could not be read. Check the feed publisher.")
    }

    // A refetch may return a complete document.
    fn is_retryable(&self) -> bool {
        true
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::Malformed { .. } => Some("feed.malformed"),
            Self::MalformedItem { .. } => Some("feed.malformed_item"),
        }
    }
}
