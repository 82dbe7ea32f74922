//! Build script for FCM
//!
//! Embeds the build timestamp and cargo profile for `fcm_status` and the
//! startup banner. Writes nothing to the source tree.

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=build.rs");

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=FCM_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:rustc-env=FCM_BUILD_PROFILE={}", profile);
}
