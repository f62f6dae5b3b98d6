//! Loosely typed setting values

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A value as held by a settings tier.
///
/// Tiers store whatever the writer put there; typed accessors convert on
/// read and treat unconvertible values as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl SettingValue {
    /// Booleans, `0`/`1`, and `YES`/`NO`/`true`/`false` strings
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Integer(n) => Some(*n != 0),
            Self::Float(_) => None,
            Self::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "yes" | "true" | "1" => Some(true),
                "no" | "false" | "0" => Some(false),
                _ => None,
            },
        }
    }

    /// A non-negative, finite number of seconds
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_duration(&self) -> Option<Duration> {
        let secs = match self {
            Self::Integer(n) => *n as f64,
            Self::Float(f) => *f,
            Self::String(s) => s.trim().parse::<f64>().ok()?,
            Self::Bool(_) => return None,
        };
        Duration::try_from_secs_f64(secs).ok()
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert from a TOML value; arrays, tables and datetimes have no
    /// setting representation.
    #[must_use]
    pub fn from_toml(value: &toml::Value) -> Option<Self> {
        match value {
            toml::Value::Boolean(b) => Some(Self::Bool(*b)),
            toml::Value::Integer(n) => Some(Self::Integer(*n)),
            toml::Value::Float(f) => Some(Self::Float(*f)),
            toml::Value::String(s) => Some(Self::String(s.clone())),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_toml(&self) -> toml::Value {
        match self {
            Self::Bool(b) => toml::Value::Boolean(*b),
            Self::Integer(n) => toml::Value::Integer(*n),
            Self::Float(f) => toml::Value::Float(*f),
            Self::String(s) => toml::Value::String(s.clone()),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Duration> for SettingValue {
    fn from(value: Duration) -> Self {
        Self::Float(value.as_secs_f64())
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl std::fmt::Display for SettingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_coercion() {
        assert_eq!(SettingValue::from("YES").as_bool(), Some(true));
        assert_eq!(SettingValue::from(" no ").as_bool(), Some(false));
        assert_eq!(SettingValue::Integer(0).as_bool(), Some(false));
        assert_eq!(SettingValue::Integer(2).as_bool(), Some(true));
        assert_eq!(SettingValue::from("sometimes").as_bool(), None);
        assert_eq!(SettingValue::Float(1.0).as_bool(), None);
    }

    #[test]
    fn test_duration_coercion() {
        assert_eq!(
            SettingValue::Integer(3600).as_duration(),
            Some(Duration::from_secs(3600))
        );
        assert_eq!(
            SettingValue::from("86400").as_duration(),
            Some(Duration::from_secs(86400))
        );
        assert_eq!(
            SettingValue::Float(1.5).as_duration(),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(SettingValue::Integer(-1).as_duration(), None);
        assert_eq!(SettingValue::Float(f64::NAN).as_duration(), None);
        assert_eq!(SettingValue::Bool(true).as_duration(), None);
    }

    #[test]
    fn test_toml_conversion() {
        let value = SettingValue::from(Duration::from_secs(60));
        assert_eq!(SettingValue::from_toml(&value.to_toml()), Some(value));
        assert_eq!(
            SettingValue::from_toml(&toml::Value::Array(Vec::new())),
            None
        );
    }
}
