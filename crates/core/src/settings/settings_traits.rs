//! Repository traits for settings.

use async_trait::async_trait;

use crate::errors::Result;
use crate::settings::{Settings, SettingsUpdate};

/// Repository trait for managing user preferences.
#[async_trait]
pub trait SettingsRepositoryTrait: Send + Sync {
    /// Get all settings, falling back to defaults for missing keys.
    fn get_settings(&self) -> Result<Settings>;

    /// Write every field present in `new_settings`.
    async fn update_settings(&self, new_settings: &SettingsUpdate) -> Result<()>;
}
