//! Integration tests for types

#[cfg(test)]
mod tests {
    use sparkfeed_types::*;

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&SigningValidationStatus::Succeeded).unwrap();
        assert_eq!(json, r#""succeeded""#);

        let status: SigningValidationStatus = serde_json::from_str(r#""failed""#).unwrap();
        assert_eq!(status, SigningValidationStatus::Failed);
        assert!(status.is_failed());
        assert!(!SigningValidationStatus::Skipped.is_failed());
    }

    #[test]
    fn test_installation_type_names() {
        let parsed: InstallationType = serde_json::from_str(r#""interactive-package""#).unwrap();
        assert_eq!(parsed, InstallationType::InteractivePackage);
        assert_eq!(parsed.to_string(), "interactive-package");
        assert_eq!(InstallationType::default(), InstallationType::Application);
    }

    #[test]
    fn test_release_notes_format_default() {
        assert_eq!(ReleaseNotesFormat::default(), ReleaseNotesFormat::Html);
        let parsed: ReleaseNotesFormat = serde_json::from_str(r#""plain-text""#).unwrap();
        assert_eq!(parsed, ReleaseNotesFormat::PlainText);
    }
}
