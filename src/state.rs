//! Shared application state.

use std::sync::Arc;
use crate::config::Config;
use crate::events::EventPublisher;
use crate::store::{MemoryStore, PgStore, Store};
use crate::domain::aggregates::Setting;
use crate::Result;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
    pub events: EventPublisher,
}

impl AppState {
    /// Opens the configured store and makes sure the settings row exists.
    pub async fn new(config: Config) -> Result<Self> {
        let store: Arc<dyn Store> = match &config.database_url {
            Some(url) => Arc::new(PgStore::connect(url, config.database_max_connections).await?),
            None => {
                tracing::warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
                Arc::new(MemoryStore::new())
            }
        };
        let events = EventPublisher::connect(config.nats_url.as_deref()).await;
        Self::with_store(store, config, events).await
    }

    pub async fn with_store(store: Arc<dyn Store>, config: Config, events: EventPublisher) -> Result<Self> {
        let settings = store.init_settings(Setting::default()).await?;
        tracing::info!(site = %settings.site_name, "settings ready");
        Ok(Self { store, config: Arc::new(config), events })
    }
}
