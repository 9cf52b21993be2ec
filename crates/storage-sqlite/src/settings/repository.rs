use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use super::model::AppSettingDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::app_settings::dsl::*;
use fintrack_core::errors::Result;
use fintrack_core::settings::{Settings, SettingsRepositoryTrait, SettingsUpdate};

pub struct SettingsRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SettingsRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SettingsRepository { pool, writer }
    }
}

// Implement the trait for SettingsRepository
#[async_trait]
impl SettingsRepositoryTrait for SettingsRepository {
    fn get_settings(&self) -> Result<Settings> {
        let mut conn = get_connection(&self.pool)?;
        let all_settings: Vec<(String, String)> = app_settings
            .select((setting_key, setting_value))
            .load::<(String, String)>(&mut conn)
            .into_core()?;

        let mut settings = Settings::default();

        for (key, value) in all_settings {
            match key.as_str() {
                "theme" => settings.theme = value,
                "currency" => settings.currency = value,
                "date_format" => settings.date_format = value,
                _ => {} // Ignore unknown settings
            }
        }

        Ok(settings)
    }

    async fn update_settings(&self, new_settings: &SettingsUpdate) -> Result<()> {
        let rows: Vec<AppSettingDB> = [
            ("theme", &new_settings.theme),
            ("currency", &new_settings.currency),
            ("date_format", &new_settings.date_format),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value.as_ref().map(|v| AppSettingDB {
                setting_key: key.to_string(),
                setting_value: v.clone(),
            })
        })
        .collect();

        self.writer
            .exec(move |conn| {
                for row in &rows {
                    diesel::replace_into(app_settings)
                        .values(row)
                        .execute(conn)
                        .into_core()?;
                }
                Ok(())
            })
            .await
    }
}
