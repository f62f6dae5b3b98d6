//! Feed document parse layer

use crate::models::AppcastItem;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sparkfeed_errors::{Error, FeedError};
use url::Url;

/// A parsed feed: one record per `<item>`, in document order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Url>,
    pub items: Vec<AppcastItem>,
}

impl FeedDocument {
    /// Parse a feed document from JSON
    ///
    /// Structural problems fail the whole document; there is no partial
    /// result. Invalid values of optional item fields are dropped instead.
    ///
    /// # Errors
    ///
    /// Returns `FeedError::Malformed` if the text is not a JSON object with an
    /// `items` array, and `FeedError::MalformedItem` if an item is not an
    /// object or lacks a non-empty `version`.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let root: Value = serde_json::from_str(json).map_err(|e| FeedError::Malformed {
            message: format!("invalid feed JSON: {e}"),
        })?;

        let Value::Object(mut root) = root else {
            return Err(FeedError::Malformed {
                message: "feed document must be an object".to_string(),
            }
            .into());
        };

        let Some(Value::Array(raw_items)) = root.remove("items") else {
            return Err(FeedError::Malformed {
                message: "feed document has no items array".to_string(),
            }
            .into());
        };

        let items = raw_items
            .into_iter()
            .enumerate()
            .map(|(index, raw)| parse_item(index, raw))
            .collect::<Result<Vec<_>, _>>()?;

        let title = root
            .remove("title")
            .and_then(|v| serde_json::from_value::<String>(v).ok());
        let link = root
            .remove("link")
            .and_then(|v| serde_json::from_value::<Url>(v).ok());

        Ok(Self { title, link, items })
    }

    /// Serialize the document to JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::internal(format!("failed to serialize feed: {e}")))
    }
}

fn parse_item(index: usize, raw: Value) -> Result<AppcastItem, Error> {
    if !raw.is_object() {
        return Err(FeedError::MalformedItem {
            index,
            message: "item must be an object".to_string(),
        }
        .into());
    }

    let item: AppcastItem =
        serde_json::from_value(raw).map_err(|e| FeedError::MalformedItem {
            index,
            message: e.to_string(),
        })?;

    if item.version.is_empty() {
        return Err(FeedError::MalformedItem {
            index,
            message: "empty version".to_string(),
        }
        .into());
    }

    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_document_order() {
        let doc = FeedDocument::from_json(
            r#"{
                "title": "Example Changelog",
                "link": "https://example.com/",
                "items": [
                    {"version": "3"},
                    {"version": "10"},
                    {"version": "1"}
                ]
            }"#,
        )
        .unwrap();

        let versions: Vec<&str> = doc.items.iter().map(|i| i.version.as_str()).collect();
        assert_eq!(versions, vec!["3", "10", "1"]);
        assert_eq!(doc.title.as_deref(), Some("Example Changelog"));
    }

    #[test]
    fn test_structural_errors() {
        let cases = [
            "not json",
            "[]",
            r#"{"title": "no items"}"#,
            r#"{"items": {"version": "1"}}"#,
        ];
        for json in cases {
            let err = FeedDocument::from_json(json).unwrap_err();
            assert!(
                matches!(err, Error::Feed(FeedError::Malformed { .. })),
                "expected malformed feed for {json}"
            );
        }
    }

    #[test]
    fn test_item_errors_report_index() {
        let err = FeedDocument::from_json(r#"{"items": [{"version": "1"}, {"title": "x"}]}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Feed(FeedError::MalformedItem { index: 1, .. })
        ));

        let err = FeedDocument::from_json(r#"{"items": [{"version": "  "}]}"#).unwrap_err();
        assert!(matches!(
            err,
            Error::Feed(FeedError::MalformedItem { index: 0, .. })
        ));

        let err = FeedDocument::from_json(r#"{"items": ["1.0"]}"#).unwrap_err();
        assert!(matches!(
            err,
            Error::Feed(FeedError::MalformedItem { index: 0, .. })
        ));
    }

    #[test]
    fn test_empty_feed_is_valid() {
        let doc = FeedDocument::from_json(r#"{"items": []}"#).unwrap();
        assert!(doc.items.is_empty());
        assert!(doc.link.is_none());
    }

    #[test]
    fn test_json_roundtrip_keeps_items() {
        let doc = FeedDocument::from_json(
            r#"{"items": [{"version": "2", "critical": true, "release_notes": "notes"}]}"#,
        )
        .unwrap();
        let reparsed = FeedDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(doc, reparsed);
    }
}
