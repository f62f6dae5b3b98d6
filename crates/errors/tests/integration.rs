//! Integration tests for error types

#[cfg(test)]
mod tests {
    use sparkfeed_errors::*;

    #[test]
    fn test_error_conversion() {
        let feed_err = FeedError::Malformed {
            message: "items is not an array".into(),
        };
        let err: Error = feed_err.into();
        assert!(matches!(err, Error::Feed(_)));
        assert_eq!(err.user_code(), Some("feed.malformed"));
    }

    #[test]
    fn test_invariant_violation_display() {
        let err = SettingsError::InvariantViolation {
            update_check_interval_secs: 700_000.0,
            impatient_interval_secs: 604_800.0,
        };
        assert_eq!(
            err.to_string(),
            "impatient update check interval (604800s) must be greater than the update check interval (700000s)"
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_store_unavailable_is_retryable() {
        let err: Error = SettingsError::StoreUnavailable {
            tier: "user".into(),
            reason: "permission denied".into(),
        }
        .into();
        assert!(err.is_retryable());
        assert!(err.user_hint().is_some());
    }

    #[test]
    fn test_error_clone() {
        let err = ConfigError::MalformedPublicKey {
            reason: "bad base64".into(),
        };
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::io_with_path(&io_err, "/Applications/Example.app/updater.toml");
        assert!(matches!(
            err,
            Error::Io {
                kind: std::io::ErrorKind::PermissionDenied,
                path: Some(_),
                ..
            }
        ));
        assert!(err.is_retryable());
        assert_eq!(err.user_code(), Some("error.io"));
    }

    #[test]
    fn test_toml_error_is_config_parse_error() {
        let toml_err = toml::from_str::<toml::Table>("key = ").unwrap_err();
        let err: Error = toml_err.into();
        assert!(matches!(err, Error::Config(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("serializer failed");
        assert_eq!(err.to_string(), "internal error: serializer failed");
        assert_eq!(err.user_code(), Some("error.internal"));
    }
}
