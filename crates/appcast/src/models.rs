//! Appcast item data models

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sparkfeed_types::{InstallationType, ReleaseNotesFormat};
use url::Url;

/// One update entry of a feed, in document order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppcastItem {
    /// Machine-comparable version
    #[serde(deserialize_with = "version_string")]
    pub version: String,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_version: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub pub_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_release_notes",
        skip_serializing_if = "Option::is_none"
    )]
    pub release_notes: Option<ReleaseNotes>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub release_notes_url: Option<Url>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub full_release_notes_url: Option<Url>,
    /// Product page for informational updates
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub info_url: Option<Url>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub critical: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub informational: bool,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub enclosure: Option<Enclosure>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub channel: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub minimum_system_version: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub maximum_system_version: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub minimum_autoupdate_version: Option<String>,
    /// Seconds between rollout groups
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub phased_rollout_interval: Option<u64>,
}

/// Inline release notes carried by the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseNotes {
    pub content: String,
    #[serde(default)]
    pub format: ReleaseNotesFormat,
}

/// The downloadable update payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enclosure {
    pub url: Url,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub length: Option<u64>,
    /// EdDSA signature of the archive, checked by the installer
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub ed_signature: Option<String>,
    #[serde(default, deserialize_with = "lenient_installation_type")]
    pub installation_type: InstallationType,
}

impl AppcastItem {
    /// Create an item with only a version set
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            display_version: None,
            title: None,
            pub_date: None,
            release_notes: None,
            release_notes_url: None,
            full_release_notes_url: None,
            info_url: None,
            critical: false,
            informational: false,
            enclosure: None,
            channel: None,
            minimum_system_version: None,
            maximum_system_version: None,
            minimum_autoupdate_version: None,
            phased_rollout_interval: None,
        }
    }

    /// Every reference that can send the user to external content.
    ///
    /// The enclosure URL is not included: it is the payload, not navigation.
    pub fn links(&self) -> impl Iterator<Item = &Url> {
        [
            self.release_notes_url.as_ref(),
            self.full_release_notes_url.as_ref(),
            self.info_url.as_ref(),
        ]
        .into_iter()
        .flatten()
    }

    #[must_use]
    pub fn has_links(&self) -> bool {
        self.links().next().is_some()
    }

    /// Whether the item already satisfies the failed-validation restrictions
    #[must_use]
    pub fn is_sanitized(&self) -> bool {
        !self.critical && !self.informational && self.release_notes.is_none() && !self.has_links()
    }

    /// Label shown to users, falling back to the machine version
    #[must_use]
    pub fn display_version_or_version(&self) -> &str {
        self.display_version.as_deref().unwrap_or(&self.version)
    }
}

// Invalid optional values become absent instead of failing the whole feed.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "1"
        ),
        _ => false,
    })
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::String(s) = value else {
        return Ok(None);
    };
    let s = s.trim();
    let parsed = DateTime::parse_from_rfc3339(s).or_else(|_| DateTime::parse_from_rfc2822(s));
    Ok(parsed.ok().map(|dt| dt.with_timezone(&Utc)))
}

fn lenient_release_notes<'de, D>(deserializer: D) -> Result<Option<ReleaseNotes>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(content) if !content.trim().is_empty() => Some(ReleaseNotes {
            content,
            format: ReleaseNotesFormat::default(),
        }),
        Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

fn lenient_installation_type<'de, D>(deserializer: D) -> Result<InstallationType, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn version_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "version must be a string, found {other}"
        ))),
    }
}
