//! CLI error handling

use std::fmt;

use sparkfeed_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Error from the feed, settings or signing layers
    Core(sparkfeed_errors::Error),
    /// Invalid command arguments
    InvalidArguments(String),
    /// I/O error
    Io(std::io::Error),
}

impl CliError {
    /// Structured form for JSON output mode
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CliError::Core(e) => serde_json::json!({
                "error": e.user_message(),
                "code": e.user_code(),
                "hint": e.user_hint(),
                "detail": e,
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Core(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Core(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::InvalidArguments(_) => None,
        }
    }
}

impl From<sparkfeed_errors::Error> for CliError {
    fn from(e: sparkfeed_errors::Error) -> Self {
        CliError::Core(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparkfeed_errors::ConfigError;

    #[test]
    fn test_core_error_includes_hint_and_code() {
        let err = CliError::from(sparkfeed_errors::Error::from(ConfigError::MissingPublicKey));
        let rendered = err.to_string();
        assert!(rendered.contains("Code:"));
        assert!(rendered.contains("Hint:"));
    }

    #[test]
    fn test_core_error_json() {
        let err = CliError::from(sparkfeed_errors::Error::from(ConfigError::MissingPublicKey));
        let json = err.to_json();
        assert_eq!(json["code"], "config.missing_public_key");
        assert!(json["detail"].is_object());
    }

    #[test]
    fn test_invalid_arguments_message() {
        let err = CliError::InvalidArguments("--bundle is required".to_string());
        assert_eq!(err.to_string(), "Invalid arguments: --bundle is required");
    }
}
