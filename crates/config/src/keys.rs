//! Persisted setting keys
//!
//! These names are stored in user defaults files and bundle manifests, so
//! they must never change.

pub const ENABLE_AUTOMATIC_CHECKS: &str = "SUEnableAutomaticChecks";
pub const SCHEDULED_CHECK_INTERVAL: &str = "SUScheduledCheckInterval";
pub const AUTOMATICALLY_UPDATE: &str = "SUAutomaticallyUpdate";
pub const ALLOWS_AUTOMATIC_UPDATES: &str = "SUAllowsAutomaticUpdates";
pub const SCHEDULED_IMPATIENT_CHECK_INTERVAL: &str = "SUScheduledImpatientCheckInterval";
pub const SEND_PROFILE_INFO: &str = "SUSendProfileInfo";
pub const FEED_URL: &str = "SUFeedURL";
pub const REQUIRE_SIGNED_FEED: &str = "SURequireSignedFeed";
pub const PUBLIC_ED_KEY: &str = "SUPublicEDKey";
pub const BUNDLE_IDENTIFIER: &str = "CFBundleIdentifier";
