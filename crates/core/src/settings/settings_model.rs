use serde::{Deserialize, Serialize};

pub const THEMES: [&str; 3] = ["light", "dark", "system"];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub theme: String,
    pub currency: String,
    pub date_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            currency: "USD".to_string(),
            date_format: "YYYY-MM-DD".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub theme: Option<String>,
    pub currency: Option<String>,
    pub date_format: Option<String>,
}
