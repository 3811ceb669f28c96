//! API versioning for the permflow SDK
//!
//! The SDK follows semantic versioning; compatibility is maintained within
//! the same MAJOR version.

/// Current API version of the SDK
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Oldest client API version this SDK remains compatible with
pub const MIN_SUPPORTED_VERSION: &str = "0.3.0";

/// Human-readable version string
pub fn version_string() -> String {
    format!("permflow-sdk {}", API_VERSION)
}
