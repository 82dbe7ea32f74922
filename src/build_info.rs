//! Build metadata
//!
//! Version from Cargo.toml plus the timestamp and profile set by `build.rs`.

use serde::Serialize;

/// Package version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// UTC time the crate was last compiled
pub const BUILD_TIMESTAMP: &str = match option_env!("FCM_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

/// Cargo profile ("debug" or "release")
pub const BUILD_PROFILE: &str = match option_env!("FCM_BUILD_PROFILE") {
    Some(s) => s,
    None => "unknown",
};

/// Build metadata as reported by `fcm_status`
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_timestamp: &'static str,
    pub build_profile: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: VERSION,
            build_timestamp: BUILD_TIMESTAMP,
            build_profile: BUILD_PROFILE,
        }
    }

    /// One-line description used in the startup banner
    pub fn summary(&self) -> String {
        format!(
            "Food Cost Manager (FCM) v{} [{}] built {}",
            self.version, self.build_profile, self.build_timestamp
        )
    }
}

/// Print the startup banner to stderr
pub fn print_startup_banner() {
    eprintln!("{}", BuildInfo::current().summary());
}
