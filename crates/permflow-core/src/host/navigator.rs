//! Settings navigation

use crate::error::PermResult;

/// Navigates to the host's settings surfaces
///
/// `open_general_settings` is the fallback target when a specific screen is
/// unavailable on the platform.
pub trait SettingsNavigator: Send + Sync {
    /// Open the application detail settings screen
    fn open_app_settings(&self) -> PermResult<()>;

    /// Open the settings screen for the elevated grant
    fn open_elevated_grant_settings(&self) -> PermResult<()>;

    /// Open a general settings screen
    fn open_general_settings(&self) -> PermResult<()>;
}
