//! Site settings handlers

use axum::{extract::State, Json};
use super::FormInput;
use crate::domain::aggregates::{Setting, SettingsUpdate};
use crate::{uploads, AppState, Result};

pub async fn get_settings(State(s): State<AppState>) -> Result<Json<Setting>> {
    Ok(Json(s.store.settings().await?))
}

/// Applies the supplied fields. A `logo` file part is stored and wins over a
/// `logo` path sent as text.
pub async fn update_settings(State(s): State<AppState>, mut form: FormInput) -> Result<Json<Setting>> {
    let text = |key: &str| form.text(key).map(str::to_string);
    let mut update = SettingsUpdate { site_name: text("siteName"), currency: text("currency"), theme: text("theme"), logo: text("logo") };
    let mut stored = None;
    if let Some(file) = form.take_file("logo") {
        let path = uploads::store(&s.config.upload_dir, &file).await?;
        update.logo = Some(path.clone());
        stored = Some(path);
    }
    match s.store.update_settings(update).await {
        Ok(settings) => {
            tracing::info!(site = %settings.site_name, "settings updated");
            Ok(Json(settings))
        }
        Err(e) => {
            if let Some(path) = stored { uploads::discard(&s.config.upload_dir, &path).await; }
            Err(e)
        }
    }
}
