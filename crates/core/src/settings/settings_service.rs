use super::SettingsRepositoryTrait;
use crate::errors::{Error, Result};
use crate::settings::{Settings, SettingsUpdate, THEMES};
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;

// Define the trait for SettingsService
#[async_trait]
pub trait SettingsServiceTrait: Send + Sync {
    fn get_settings(&self) -> Result<Settings>;

    async fn update_settings(&self, new_settings: &SettingsUpdate) -> Result<Settings>;
}

pub struct SettingsService {
    settings_repository: Arc<dyn SettingsRepositoryTrait>,
}

impl SettingsService {
    pub fn new(settings_repository: Arc<dyn SettingsRepositoryTrait>) -> Self {
        SettingsService {
            settings_repository,
        }
    }

    /// Normalizes the update and rejects unsupported values.
    fn validate(update: &SettingsUpdate) -> Result<SettingsUpdate> {
        let theme = match update.theme.as_deref().map(str::trim) {
            Some(theme) if THEMES.contains(&theme) => Some(theme.to_string()),
            Some(theme) => {
                return Err(Error::invalid_input(format!(
                    "Unsupported theme '{}', expected one of {}",
                    theme,
                    THEMES.join(", ")
                )))
            }
            None => None,
        };

        let currency = match update.currency.as_deref().map(str::trim) {
            Some(code) if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) => {
                Some(code.to_ascii_uppercase())
            }
            Some(code) => {
                return Err(Error::invalid_input(format!(
                    "Currency must be a 3-letter code, got '{}'",
                    code
                )))
            }
            None => None,
        };

        let date_format = match update.date_format.as_deref().map(str::trim) {
            Some("") => return Err(Error::invalid_input("Date format cannot be empty")),
            other => other.map(str::to_string),
        };

        Ok(SettingsUpdate {
            theme,
            currency,
            date_format,
        })
    }
}

#[async_trait]
impl SettingsServiceTrait for SettingsService {
    fn get_settings(&self) -> Result<Settings> {
        self.settings_repository.get_settings()
    }

    async fn update_settings(&self, new_settings: &SettingsUpdate) -> Result<Settings> {
        let update = Self::validate(new_settings).inspect_err(|e| {
            warn!("Rejected settings update: {}", e);
        })?;
        self.settings_repository.update_settings(&update).await?;
        info!("Settings updated");
        self.settings_repository.get_settings()
    }
}
