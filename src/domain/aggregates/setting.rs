//! Site settings singleton

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The one settings row. Created with defaults at startup, then only updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub site_name: String,
    pub logo: String,
    pub currency: String,
    pub theme: String,
    pub updated_at: DateTime<Utc>,
}

impl Default for Setting {
    fn default() -> Self {
        Self { site_name: "My Shop".into(), logo: String::new(), currency: "INR".into(), theme: "light".into(), updated_at: Utc::now() }
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub site_name: Option<String>,
    pub currency: Option<String>,
    pub theme: Option<String>,
    pub logo: Option<String>,
}

impl Setting {
    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(v) = update.site_name { self.site_name = v; }
        if let Some(v) = update.currency { self.currency = v; }
        if let Some(v) = update.theme { self.theme = v; }
        if let Some(v) = update.logo { self.logo = v; }
        self.updated_at = Utc::now();
    }
}
